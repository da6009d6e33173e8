mod command;
mod config;
mod console;
mod input;
mod notify;

use crate::config::{ConsoleConfig, StoreKind};
use crate::console::Console;
use crate::input::StdinInput;
use crate::notify::{ConsoleNotifier, StdinConfirm};
use anyhow::bail;
use catalog::app::catalog_mediator;
use catalog::cache::ProductsCache;
use catalog::controller::ProductsController;
use catalog::model::{CompanyId, NewProduct};
use catalog::store::{MemoryStore, SharedProductStore};
use rust_decimal::Decimal;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConsoleConfig::from_env()?;
    env_logger::Builder::new()
        .parse_filters(&config.log_filter)
        .init();

    let store = open_store(&config).await?;
    log::info!("Using the {} store", config.store);

    if config.seed {
        seed(&store, &config).await?;
    }

    let mediator = catalog_mediator(store, ProductsCache::new());
    let input = StdinInput::stdin();
    let controller = ProductsController::new(
        mediator,
        config.session(),
        ConsoleNotifier,
        StdinConfirm(input.clone()),
    );

    Console::new(controller, input).run().await
}

async fn open_store(config: &ConsoleConfig) -> anyhow::Result<SharedProductStore> {
    match config.store {
        StoreKind::Memory => Ok(Arc::new(MemoryStore::new())),
        #[cfg(feature = "redis")]
        StoreKind::Redis => {
            let store = catalog::store::RedisStore::open(&config.redis_url, &config.redis_prefix)?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "postgres")]
        StoreKind::Postgres => {
            use anyhow::Context;

            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres store")?;
            let store = catalog::store::PgStore::connect(url).await?;
            store.ensure_schema().await?;
            Ok(Arc::new(store))
        }
        #[allow(unreachable_patterns)]
        other => bail!("The {} store requires the '{}' feature", other, other),
    }
}

/// Inserts a few demo products when the store is empty.
async fn seed(store: &SharedProductStore, config: &ConsoleConfig) -> anyhow::Result<()> {
    if !store.list_all().await?.is_empty() {
        return Ok(());
    }

    let company_id = CompanyId::new(config.company_id.as_deref().unwrap_or("demo"));
    let products = [
        NewProduct::new("Consultoria", Decimal::new(15000, 2))
            .with_sku("CONS-001")
            .with_description("Consultoria de marketing digital"),
        NewProduct::new("Auditoria", Decimal::new(9000, 2)).with_sku("AUD-001"),
        NewProduct::new("Treinamento", Decimal::new(123456, 2))
            .with_description("Workshop presencial de 8 horas")
            .inactive(),
    ];

    for product in products {
        let created = store.create(product, &company_id).await?;
        log::debug!("Seeded {} - {}", created.name, created.id);
    }

    Ok(())
}
