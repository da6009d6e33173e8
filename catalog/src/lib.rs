//! # catalog
//! Product catalog management built on the Mediator pattern.
//!
//! Reads go through cached queries, writes through commands that publish an
//! event once the store commits. Subscribers to those events invalidate the
//! cached queries made stale by the change.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use catalog::app::catalog_mediator;
//! use catalog::cache::ProductsCache;
//! use catalog::commands::CreateProductCommand;
//! use catalog::model::{CompanyId, NewProduct, Product};
//! use catalog::queries::ListProducts;
//! use catalog::store::MemoryStore;
//!
//! # #[tokio::main]
//! # async fn main() -> catalog::Result<()> {
//! let mediator = catalog_mediator(Arc::new(MemoryStore::new()), ProductsCache::new());
//!
//! let created: Product = mediator
//!     .send(CreateProductCommand {
//!         product: NewProduct::new("Consultoria", "150.00".parse().unwrap()),
//!         company_id: Some(CompanyId::new("C1")),
//!     })
//!     .await?;
//!
//! let active: Vec<Product> = mediator.send(ListProducts::active_only()).await?;
//! assert_eq!(active, vec![created]);
//! # Ok(())
//! # }
//! ```

/// A convenient result type.
pub type Result<T> = std::result::Result<T, error::Error>;

/// Module for the mediator request-response.
mod request;
pub use request::*;

/// Module for the mediator events.
mod event;
pub use event::*;

/// Module for the errors.
mod error;
pub use error::*;

/// Module for the mediator.
mod mediator;
pub use crate::mediator::*;

pub mod model;
pub mod store;
pub mod cache;
pub mod events;
pub mod queries;
pub mod commands;
pub mod app;
pub mod filter;
pub mod controller;
pub mod view;
