//! Catalog handle and connection setup.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::assets::AssetsRepo;
use crate::error::{CatalogError, CatalogResult};
use crate::jobs::JobsRepo;
use crate::outputs::OutputsRepo;
use crate::templates::TemplatesRepo;

const SCHEMA: &str = include_str!("../schema.sql");

/// Catalog configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Postgres connection URL
    pub database_url: String,
    /// Max pooled connections
    pub max_connections: u32,
}

impl CatalogConfig {
    /// Create config from environment variables.
    pub fn from_env() -> CatalogResult<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| CatalogError::ConnectionFailed("DATABASE_URL not set".into()))?,
            max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        })
    }
}

/// Handle to the relational catalog shared by the API and workers.
#[derive(Clone)]
pub struct Catalog {
    pool: PgPool,
}

impl Catalog {
    /// Connect to the catalog.
    pub async fn connect(config: CatalogConfig) -> CatalogResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .map_err(|e| CatalogError::ConnectionFailed(e.to_string()))?;
        Ok(Self { pool })
    }

    /// Connect using environment variables.
    pub async fn from_env() -> CatalogResult<Self> {
        Self::connect(CatalogConfig::from_env()?).await
    }

    /// Apply the schema. Idempotent; safe to run at every startup.
    pub async fn init_schema(&self) -> CatalogResult<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        info!("Catalog schema initialized");
        Ok(())
    }

    /// Cheap liveness probe.
    pub async fn ping(&self) -> CatalogResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn jobs(&self) -> JobsRepo {
        JobsRepo::new(self.pool.clone())
    }

    pub fn assets(&self) -> AssetsRepo {
        AssetsRepo::new(self.pool.clone())
    }

    pub fn outputs(&self) -> OutputsRepo {
        OutputsRepo::new(self.pool.clone())
    }

    pub fn templates(&self) -> TemplatesRepo {
        TemplatesRepo::new(self.pool.clone())
    }
}
