use crate::events::ProductUpdated;
use crate::model::{Product, ProductId};
use crate::store::SharedProductStore;
use crate::{Mediator, Request, RequestHandler};

/// Sets the active flag of a product to `active`.
#[derive(Debug, Clone, Copy)]
pub struct ToggleProductActiveCommand {
    pub id: ProductId,
    pub active: bool,
}

impl Request<Product> for ToggleProductActiveCommand {}

pub struct ToggleProductActiveHandler(pub SharedProductStore, pub Mediator);

#[async_trait::async_trait]
impl RequestHandler<ToggleProductActiveCommand, Product> for ToggleProductActiveHandler {
    async fn handle(&self, command: ToggleProductActiveCommand) -> crate::Result<Product> {
        let updated = self.0.toggle_active(command.id, command.active).await?;
        self.1.publish(ProductUpdated(updated.clone())).await?;

        Ok(updated)
    }
}
