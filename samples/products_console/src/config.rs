use anyhow::{bail, Context};
use catalog::model::{CompanyId, Session};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Redis,
    Postgres,
}

impl FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(StoreKind::Memory),
            "redis" => Ok(StoreKind::Redis),
            "postgres" | "postgresql" => Ok(StoreKind::Postgres),
            other => bail!("Invalid CATALOG_STORE '{}', expected memory, redis or postgres", other),
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreKind::Memory => "memory",
            StoreKind::Redis => "redis",
            StoreKind::Postgres => "postgres",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub store: StoreKind,
    pub redis_url: String,
    pub redis_prefix: String,
    pub database_url: Option<String>,
    pub company_id: Option<String>,
    pub user: Option<String>,
    pub seed: bool,
    pub log_filter: String,
}

impl ConsoleConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset.
        let get = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        let store = match get("CATALOG_STORE") {
            Some(s) => s.parse()?,
            None => StoreKind::Memory,
        };

        let database_url = get("DATABASE_URL");
        if store == StoreKind::Postgres && database_url.is_none() {
            bail!("Missing environment variable 'DATABASE_URL' for the postgres store");
        }

        let seed = match get("CATALOG_SEED") {
            Some(s) => s
                .trim()
                .parse::<bool>()
                .with_context(|| format!("Invalid CATALOG_SEED value '{}'", s))?,
            None => store == StoreKind::Memory,
        };

        Ok(ConsoleConfig {
            store,
            redis_url: get("REDIS_URL").unwrap_or_else(|| "redis://127.0.0.1/".to_owned()),
            redis_prefix: get("CATALOG_REDIS_PREFIX").unwrap_or_else(|| "products".to_owned()),
            database_url,
            company_id: get("CATALOG_COMPANY_ID"),
            user: get("CATALOG_USER"),
            seed,
            log_filter: get("CATALOG_LOG").unwrap_or_else(|| "info".to_owned()),
        })
    }

    pub fn session(&self) -> Session {
        Session {
            user: self.user.clone(),
            company_id: self.company_id.as_deref().map(CompanyId::new),
        }
    }
}
