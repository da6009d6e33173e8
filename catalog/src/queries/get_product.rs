use crate::cache::ProductsCache;
use crate::model::{Product, ProductId};
use crate::store::SharedProductStore;
use crate::{Request, RequestHandler};

#[derive(Debug, Clone, Copy)]
pub struct GetProduct(pub ProductId);
impl Request<Option<Product>> for GetProduct {}

pub struct GetProductHandler(pub SharedProductStore, pub ProductsCache);

#[async_trait::async_trait]
impl RequestHandler<GetProduct, Option<Product>> for GetProductHandler {
    async fn handle(&self, req: GetProduct) -> crate::Result<Option<Product>> {
        let store = self.0.clone();
        self.1
            .detail(req.0, || async move { store.get_by_id(req.0).await })
            .await
    }
}
