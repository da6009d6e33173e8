use crate::cache::ProductsCache;
use crate::commands::*;
use crate::events::*;
use crate::queries::*;
use crate::store::SharedProductStore;
use crate::Mediator;

/// Builds the mediator serving every products query and command.
///
/// Committed mutations are logged and invalidate the affected entries of
/// `cache`; failed ones publish nothing.
pub fn catalog_mediator(store: SharedProductStore, cache: ProductsCache) -> Mediator {
    let invalidate = InvalidateProductQueries(cache.clone());

    Mediator::builder()
        // Queries
        .add_handler(ListProductsHandler(store.clone(), cache.clone()))
        .add_handler(GetProductHandler(store.clone(), cache))
        // Commands
        .add_handler_deferred(|m| CreateProductHandler(store.clone(), m))
        .add_handler_deferred(|m| UpdateProductHandler(store.clone(), m))
        .add_handler_deferred(|m| ToggleProductActiveHandler(store.clone(), m))
        .add_handler_deferred(|m| DeleteProductHandler(store.clone(), m))
        // Events
        .subscribe::<ProductCreated, _>(invalidate.clone())
        .subscribe::<ProductUpdated, _>(invalidate.clone())
        .subscribe::<ProductDeleted, _>(invalidate)
        .subscribe_fn(|event: ProductCreated| async move {
            log::info!("Added: {} - {}", event.0.name, event.0.id);
        })
        .subscribe_fn(|event: ProductUpdated| async move {
            log::info!("Updated: {} - {}", event.0.name, event.0.id);
        })
        .subscribe_fn(|event: ProductDeleted| async move {
            log::info!("Deleted: {} - {}", event.0.name, event.0.id);
        })
        .build()
}
