//! Application state.

use std::sync::Arc;

use reel_catalog::Catalog;
use reel_queue::JobQueue;
use reel_storage::StorageProvider;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub catalog: Catalog,
    pub storage: Arc<dyn StorageProvider>,
    pub queue: Arc<JobQueue>,
}

impl AppState {
    /// Create new application state from the environment.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let catalog = Catalog::from_env().await?;
        catalog.init_schema().await?;

        let storage = reel_storage::provider_from_env()?;
        let queue = JobQueue::from_env()?;

        Ok(Self {
            config,
            catalog,
            storage,
            queue: Arc::new(queue),
        })
    }
}
