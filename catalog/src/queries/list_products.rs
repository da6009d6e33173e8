use crate::cache::{ListScope, ProductsCache};
use crate::model::Product;
use crate::store::SharedProductStore;
use crate::{Request, RequestHandler};

#[derive(Debug, Clone, Copy)]
pub struct ListProducts {
    pub scope: ListScope,
}

impl ListProducts {
    pub fn active_only() -> Self {
        ListProducts {
            scope: ListScope::ActiveOnly,
        }
    }

    pub fn all() -> Self {
        ListProducts {
            scope: ListScope::All,
        }
    }
}

impl Request<Vec<Product>> for ListProducts {}

pub struct ListProductsHandler(pub SharedProductStore, pub ProductsCache);

#[async_trait::async_trait]
impl RequestHandler<ListProducts, Vec<Product>> for ListProductsHandler {
    async fn handle(&self, req: ListProducts) -> crate::Result<Vec<Product>> {
        let store = self.0.clone();
        let products = self
            .1
            .list(req.scope, || async move {
                match req.scope {
                    ListScope::ActiveOnly => store.list_active().await,
                    ListScope::All => store.list_all().await,
                }
            })
            .await?;

        Ok(products.as_ref().clone())
    }
}
