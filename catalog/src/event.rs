/// Represents an application event.
pub trait Event: Clone + Send + Sync + 'static {}

/// A handler for application events.
#[async_trait::async_trait]
pub trait EventHandler<E: Event>: Send + Sync {
    /// Handles an event.
    async fn handle(&self, event: E);
}
