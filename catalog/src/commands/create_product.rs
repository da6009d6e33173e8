use crate::error::Error;
use crate::events::ProductCreated;
use crate::model::{CompanyId, NewProduct, Product};
use crate::store::SharedProductStore;
use crate::{Mediator, Request, RequestHandler};

/// Inserts a product for the company of the current session.
#[derive(Debug, Clone)]
pub struct CreateProductCommand {
    pub product: NewProduct,
    pub company_id: Option<CompanyId>,
}

impl Request<Product> for CreateProductCommand {}

pub struct CreateProductHandler(pub SharedProductStore, pub Mediator);

#[async_trait::async_trait]
impl RequestHandler<CreateProductCommand, Product> for CreateProductHandler {
    async fn handle(&self, command: CreateProductCommand) -> crate::Result<Product> {
        let company_id = command
            .company_id
            .ok_or_else(|| Error::precondition("user has no associated company"))?;
        let product = command.product.validate()?;

        let created = self.0.create(product, &company_id).await?;
        self.1.publish(ProductCreated(created.clone())).await?;

        Ok(created)
    }
}
