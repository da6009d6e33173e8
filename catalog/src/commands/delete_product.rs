use crate::events::ProductDeleted;
use crate::model::{Product, ProductId};
use crate::store::SharedProductStore;
use crate::{Mediator, Request, RequestHandler};

#[derive(Debug, Clone, Copy)]
pub struct DeleteProductCommand(pub ProductId);
impl Request<Product> for DeleteProductCommand {}

pub struct DeleteProductHandler(pub SharedProductStore, pub Mediator);

#[async_trait::async_trait]
impl RequestHandler<DeleteProductCommand, Product> for DeleteProductHandler {
    async fn handle(&self, command: DeleteProductCommand) -> crate::Result<Product> {
        let deleted = self.0.delete(command.0).await?;
        self.1.publish(ProductDeleted(deleted.clone())).await?;

        Ok(deleted)
    }
}
