use super::ProductStore;
use crate::error::{Error, ErrorKind};
use crate::model::{CompanyId, NewProduct, Product, ProductChanges, ProductId};
use sqlx::{PgPool, Postgres, QueryBuilder};

const COLUMNS: &str =
    "id, company_id, name, description, price, sku, active, created_at, updated_at";

/// DDL for the `products` table.
pub const PRODUCTS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id          UUID PRIMARY KEY,
    company_id  TEXT NOT NULL,
    name        TEXT NOT NULL,
    description TEXT,
    price       NUMERIC(12, 2) NOT NULL CHECK (price >= 0),
    sku         TEXT,
    active      BOOLEAN NOT NULL DEFAULT TRUE,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
)
"#;

/// A [ProductStore] over the relational `products` table.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> crate::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Creates the `products` table when missing.
    pub async fn ensure_schema(&self) -> crate::Result<()> {
        sqlx::query(PRODUCTS_SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProductStore for PgStore {
    async fn list_active(&self) -> crate::Result<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE active = TRUE ORDER BY name COLLATE \"C\" ASC",
            COLUMNS
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    async fn list_all(&self) -> crate::Result<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products ORDER BY name COLLATE \"C\" ASC",
            COLUMNS
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    async fn get_by_id(&self, id: ProductId) -> crate::Result<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = $1", COLUMNS);
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    async fn create(&self, product: NewProduct, company_id: &CompanyId) -> crate::Result<Product> {
        let sql = format!(
            "INSERT INTO products (id, company_id, name, description, price, sku, active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            COLUMNS
        );

        let created = sqlx::query_as::<_, Product>(&sql)
            .bind(ProductId::new())
            .bind(company_id)
            .bind(product.name)
            .bind(product.description)
            .bind(product.price)
            .bind(product.sku)
            .bind(product.active)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn update(&self, id: ProductId, changes: ProductChanges) -> crate::Result<Product> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
            "UPDATE products SET updated_at = GREATEST(clock_timestamp(), updated_at + interval '1 microsecond')",
        );

        if let Some(name) = changes.name {
            query.push(", name = ").push_bind(name);
        }
        if let Some(description) = changes.description {
            query.push(", description = ").push_bind(description);
        }
        if let Some(price) = changes.price {
            query.push(", price = ").push_bind(price);
        }
        if let Some(sku) = changes.sku {
            query.push(", sku = ").push_bind(sku);
        }
        if let Some(active) = changes.active {
            query.push(", active = ").push_bind(active);
        }

        query.push(" WHERE id = ").push_bind(id);
        query.push(" RETURNING ").push(COLUMNS);

        query
            .build_query_as::<Product>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::new(ErrorKind::NotFound, id.to_string()))
    }

    async fn delete(&self, id: ProductId) -> crate::Result<Product> {
        let sql = format!("DELETE FROM products WHERE id = $1 RETURNING {}", COLUMNS);

        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::new(ErrorKind::NotFound, id.to_string()))
    }
}
