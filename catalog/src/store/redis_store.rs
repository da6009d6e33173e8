use super::{sort_by_name, ProductStore};
use crate::error::{Error, ErrorKind};
use crate::model::{CompanyId, NewProduct, Product, ProductChanges, ProductId};
use chrono::Utc;
use redis::aio::Connection;
use redis::{AsyncCommands, Client, RedisResult};

/// A [ProductStore] keeping each product as a JSON value under
/// `<base_key>:<id>`.
#[derive(Debug, Clone)]
pub struct RedisStore {
    client: Client,
    base_key: String,
}

impl RedisStore {
    pub fn new<S: Into<String>>(client: Client, base_key: S) -> Self {
        Self {
            client,
            base_key: base_key.into(),
        }
    }

    /// Opens a client for `url` without connecting yet.
    pub fn open<S: Into<String>>(url: &str, base_key: S) -> crate::Result<Self> {
        let client = Client::open(url)?;
        Ok(Self::new(client, base_key))
    }

    fn key(&self, id: ProductId) -> String {
        format!("{}:{}", self.base_key, id)
    }

    async fn read(&self, con: &mut Connection, key: &str) -> crate::Result<Option<Product>> {
        let json: Option<String> = con.get(key).await?;
        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn write(&self, con: &mut Connection, product: &Product) -> crate::Result<()> {
        let json = serde_json::to_string(product)?;
        con.set::<_, _, ()>(self.key(product.id), json).await?;
        Ok(())
    }

    async fn scan(&self) -> crate::Result<Vec<Product>> {
        let pattern = format!("{}:*", self.base_key);
        let mut con = self.connection().await?;

        let mut keys = Vec::new();
        {
            let mut iter = con.scan_match::<_, String>(pattern).await?;
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
        }

        let mut products = Vec::with_capacity(keys.len());
        for key in keys {
            // A key may vanish between the scan and the read.
            if let Some(product) = self.read(&mut con, &key).await? {
                products.push(product);
            }
        }

        sort_by_name(&mut products);
        Ok(products)
    }

    // Get a connection to the Redis server
    async fn connection(&self) -> RedisResult<Connection> {
        self.client.get_async_connection().await
    }
}

#[async_trait::async_trait]
impl ProductStore for RedisStore {
    async fn list_active(&self) -> crate::Result<Vec<Product>> {
        let mut products = self.scan().await?;
        products.retain(|p| p.active);
        Ok(products)
    }

    async fn list_all(&self) -> crate::Result<Vec<Product>> {
        self.scan().await
    }

    async fn get_by_id(&self, id: ProductId) -> crate::Result<Option<Product>> {
        let mut con = self.connection().await?;
        self.read(&mut con, &self.key(id)).await
    }

    async fn create(&self, product: NewProduct, company_id: &CompanyId) -> crate::Result<Product> {
        let now = Utc::now();
        let created = Product {
            id: ProductId::new(),
            company_id: company_id.clone(),
            name: product.name,
            description: product.description,
            price: product.price,
            sku: product.sku,
            active: product.active,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_string(&created)?;
        let mut con = self.connection().await?;

        // SETNX so a colliding identifier is never overwritten.
        let inserted: bool = con.set_nx(self.key(created.id), json).await?;
        if !inserted {
            return Err(Error::store(format!("product id {} already taken", created.id)));
        }

        Ok(created)
    }

    async fn update(&self, id: ProductId, changes: ProductChanges) -> crate::Result<Product> {
        let mut con = self.connection().await?;
        let mut product = self
            .read(&mut con, &self.key(id))
            .await?
            .ok_or_else(|| Error::new(ErrorKind::NotFound, id.to_string()))?;

        let previous = product.updated_at;
        product.apply(changes);
        product.updated_at = Utc::now().max(previous + chrono::Duration::microseconds(1));

        self.write(&mut con, &product).await?;
        Ok(product)
    }

    async fn delete(&self, id: ProductId) -> crate::Result<Product> {
        let mut con = self.connection().await?;
        let key = self.key(id);
        let product = self
            .read(&mut con, &key)
            .await?
            .ok_or_else(|| Error::new(ErrorKind::NotFound, id.to_string()))?;

        con.del::<_, ()>(key).await?;
        Ok(product)
    }
}
