use crate::cache::{ProductsCache, ProductsKey};
use crate::model::Product;
use crate::{Event, EventHandler};

/// A product was inserted.
#[derive(Debug, Clone)]
pub struct ProductCreated(pub Product);
impl Event for ProductCreated {}

/// A product was changed, including its active flag.
#[derive(Debug, Clone)]
pub struct ProductUpdated(pub Product);
impl Event for ProductUpdated {}

/// A product was removed.
#[derive(Debug, Clone)]
pub struct ProductDeleted(pub Product);
impl Event for ProductDeleted {}

/// Drops the cached queries a committed mutation made stale.
#[derive(Debug, Clone)]
pub struct InvalidateProductQueries(pub ProductsCache);

#[async_trait::async_trait]
impl EventHandler<ProductCreated> for InvalidateProductQueries {
    async fn handle(&self, _: ProductCreated) {
        // The new product's detail is fetched lazily.
        self.0.invalidate_lists();
    }
}

#[async_trait::async_trait]
impl EventHandler<ProductUpdated> for InvalidateProductQueries {
    async fn handle(&self, event: ProductUpdated) {
        self.0.invalidate_lists();
        self.0.invalidate(ProductsKey::Detail(event.0.id));
    }
}

#[async_trait::async_trait]
impl EventHandler<ProductDeleted> for InvalidateProductQueries {
    async fn handle(&self, event: ProductDeleted) {
        self.0.invalidate_lists();
        self.0.invalidate(ProductsKey::Detail(event.0.id));
    }
}
