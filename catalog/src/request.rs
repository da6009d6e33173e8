/// Represents a request to the mediator, answered with a `Res`.
pub trait Request<Res> {}

/// Handles a request to the mediator.
///
/// Handlers are shared between concurrent dispatches, so they take `&self`.
#[async_trait::async_trait]
pub trait RequestHandler<Req, Res>: Send + Sync
where
    Req: Request<Res> + Send,
{
    /// Handle a request and returns the response.
    async fn handle(&self, req: Req) -> crate::Result<Res>;
}
