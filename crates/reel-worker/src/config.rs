//! Worker configuration.

use std::time::Duration;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Shared staging root; for the local provider this is also the store
    pub storage_root: String,
    /// Delete local staging copies after upload (remote providers only)
    pub cleanup_local: bool,
    /// Base URL of the external renderer
    pub renderer_base_url: String,
    /// Bound on each blocking queue pop, so shutdown is observed promptly
    pub pop_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            storage_root: "/data".to_string(),
            cleanup_local: false,
            renderer_base_url: "http://localhost:9000".to_string(),
            pop_timeout: Duration::from_secs(30),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            storage_root: std::env::var("STORAGE_LOCAL_ROOT")
                .unwrap_or_else(|_| "/data".to_string()),
            cleanup_local: std::env::var("CLEANUP_LOCAL")
                .map(|v| {
                    let v = v.trim().to_lowercase();
                    v == "1" || v == "true"
                })
                .unwrap_or(false),
            renderer_base_url: std::env::var("RENDERER_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:9000".to_string()),
            pop_timeout: Duration::from_secs(
                std::env::var("WORKER_POP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }
}
