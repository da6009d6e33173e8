use super::{sort_by_name, ProductStore};
use crate::error::{Error, ErrorKind};
use crate::model::{CompanyId, NewProduct, Product, ProductChanges, ProductId};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A [ProductStore] kept in memory.
///
/// Every operation is counted, which lets callers check whether a code path
/// reached the store at all.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
    calls: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store operations performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.products.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    async fn list_where<F>(&self, predicate: F) -> Vec<Product>
    where
        F: Fn(&Product) -> bool,
    {
        let products = self.products.read().await;
        let mut result = products
            .values()
            .filter(|p| predicate(p))
            .cloned()
            .collect::<Vec<_>>();

        sort_by_name(&mut result);
        result
    }
}

#[async_trait::async_trait]
impl ProductStore for MemoryStore {
    async fn list_active(&self) -> crate::Result<Vec<Product>> {
        self.record_call();
        Ok(self.list_where(|p| p.active).await)
    }

    async fn list_all(&self) -> crate::Result<Vec<Product>> {
        self.record_call();
        Ok(self.list_where(|_| true).await)
    }

    async fn get_by_id(&self, id: ProductId) -> crate::Result<Option<Product>> {
        self.record_call();
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn create(&self, product: NewProduct, company_id: &CompanyId) -> crate::Result<Product> {
        self.record_call();

        let now = Utc::now();
        let mut products = self.products.write().await;

        let mut id = ProductId::new();
        while products.contains_key(&id) {
            id = ProductId::new();
        }

        let created = Product {
            id,
            company_id: company_id.clone(),
            name: product.name,
            description: product.description,
            price: product.price,
            sku: product.sku,
            active: product.active,
            created_at: now,
            updated_at: now,
        };

        products.insert(id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: ProductId, changes: ProductChanges) -> crate::Result<Product> {
        self.record_call();

        let mut products = self.products.write().await;
        let product = products
            .get_mut(&id)
            .ok_or_else(|| Error::new(ErrorKind::NotFound, id.to_string()))?;

        product.apply(changes);
        product.updated_at = next_timestamp(product.updated_at);
        Ok(product.clone())
    }

    async fn delete(&self, id: ProductId) -> crate::Result<Product> {
        self.record_call();

        self.products
            .write()
            .await
            .remove(&id)
            .ok_or_else(|| Error::new(ErrorKind::NotFound, id.to_string()))
    }
}

// The clock may not have advanced since the previous write.
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rust_decimal::Decimal;

    fn price(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn company() -> CompanyId {
        CompanyId::new("C1")
    }

    #[tokio::test]
    async fn create_and_list_test() {
        let store = MemoryStore::new();

        let created = store
            .create(NewProduct::new("Consultoria", price("150.00")), &company())
            .await
            .unwrap();
        store
            .create(NewProduct::new("Auditoria", price("90.00")).inactive(), &company())
            .await
            .unwrap();
        store
            .create(NewProduct::new("Treinamento", price("300.00")), &company())
            .await
            .unwrap();

        assert_eq!(created.company_id, company());
        assert!(created.active);
        assert_eq!(created.created_at, created.updated_at);

        let active = store.list_active().await.unwrap();
        let names = active.iter().map(|p| p.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Consultoria", "Treinamento"]);

        let all = store.list_all().await.unwrap();
        let names = all.iter().map(|p| p.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Auditoria", "Consultoria", "Treinamento"]);

        assert!(active.iter().all(|p| all.contains(p)));
        assert_eq!(store.calls(), 5);
    }

    #[tokio::test]
    async fn update_stamps_timestamp_test() {
        let store = MemoryStore::new();
        let created = store
            .create(NewProduct::new("Consultoria", price("150.00")), &company())
            .await
            .unwrap();

        let updated = store
            .update(created.id, ProductChanges::price(price("199.90")))
            .await
            .unwrap();

        assert_eq!(updated.price, price("199.90"));
        assert!(updated.updated_at > created.updated_at);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.name, "Consultoria");

        let fetched = store.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, updated);
    }

    #[tokio::test]
    async fn toggle_active_round_trip_test() {
        let store = MemoryStore::new();
        let created = store
            .create(NewProduct::new("Consultoria", price("150.00")), &company())
            .await
            .unwrap();

        store.toggle_active(created.id, true).await.unwrap();
        let toggled = store.toggle_active(created.id, false).await.unwrap();
        assert!(!toggled.active);

        store.toggle_active(created.id, true).await.unwrap();
        let back = store.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(back.active, created.active);
    }

    #[tokio::test]
    async fn missing_product_test() {
        let store = MemoryStore::new();
        let id = ProductId::new();

        assert_eq!(store.get_by_id(id).await.unwrap(), None);
        assert_eq!(
            store
                .update(id, ProductChanges::active(false))
                .await
                .unwrap_err()
                .kind(),
            ErrorKind::NotFound
        );
        assert_eq!(store.delete(id).await.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn delete_test() {
        let store = MemoryStore::new();
        let created = store
            .create(NewProduct::new("Consultoria", price("150.00")), &company())
            .await
            .unwrap();

        let removed = store.delete(created.id).await.unwrap();
        assert_eq!(removed.id, created.id);
        assert_eq!(store.get_by_id(created.id).await.unwrap(), None);
        assert!(store.is_empty().await);
    }
}
