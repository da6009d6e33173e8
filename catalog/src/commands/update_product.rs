use crate::events::ProductUpdated;
use crate::model::{Product, ProductChanges, ProductId};
use crate::store::SharedProductStore;
use crate::{Mediator, Request, RequestHandler};

#[derive(Debug, Clone)]
pub struct UpdateProductCommand {
    pub id: ProductId,
    pub changes: ProductChanges,
}

impl Request<Product> for UpdateProductCommand {}

pub struct UpdateProductHandler(pub SharedProductStore, pub Mediator);

#[async_trait::async_trait]
impl RequestHandler<UpdateProductCommand, Product> for UpdateProductHandler {
    async fn handle(&self, command: UpdateProductCommand) -> crate::Result<Product> {
        let changes = command.changes.validate()?;

        let updated = self.0.update(command.id, changes).await?;
        self.1.publish(ProductUpdated(updated.clone())).await?;

        Ok(updated)
    }
}
