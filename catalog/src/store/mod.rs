use crate::model::{CompanyId, NewProduct, Product, ProductChanges, ProductId};
use std::sync::Arc;

mod memory;
pub use memory::*;

#[cfg(feature = "redis")]
mod redis_store;
#[cfg(feature = "redis")]
pub use redis_store::*;

#[cfg(feature = "postgres")]
mod postgres;
#[cfg(feature = "postgres")]
pub use self::postgres::*;

/// Access to the `products` table. One method per table operation, every
/// failure returned as a value.
#[async_trait::async_trait]
pub trait ProductStore: Send + Sync {
    /// Active products ordered by name.
    async fn list_active(&self) -> crate::Result<Vec<Product>>;

    /// All products ordered by name.
    async fn list_all(&self) -> crate::Result<Vec<Product>>;

    async fn get_by_id(&self, id: ProductId) -> crate::Result<Option<Product>>;

    /// Inserts a product owned by `company_id` and returns the stored row.
    async fn create(&self, product: NewProduct, company_id: &CompanyId) -> crate::Result<Product>;

    /// Updates the supplied fields, refreshes `updated_at` and returns the
    /// stored row. Fails with [`ErrorKind::NotFound`](crate::ErrorKind::NotFound)
    /// for an unknown id.
    async fn update(&self, id: ProductId, changes: ProductChanges) -> crate::Result<Product>;

    /// Removes the product and returns the removed row. Fails with
    /// [`ErrorKind::NotFound`](crate::ErrorKind::NotFound) for an unknown id.
    async fn delete(&self, id: ProductId) -> crate::Result<Product>;

    async fn toggle_active(&self, id: ProductId, active: bool) -> crate::Result<Product> {
        self.update(id, ProductChanges::active(active)).await
    }
}

pub type SharedProductStore = Arc<dyn ProductStore>;

/// Orders products the way the listings do: by name, byte-wise.
pub(crate) fn sort_by_name(products: &mut [Product]) {
    products.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
}
