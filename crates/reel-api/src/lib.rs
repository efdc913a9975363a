//! HTTP surface for jobs, assets and templates.
//!
//! Thin routing and JSON coding over the catalog, queue and storage
//! provider; the pipeline itself lives in `reel-worker`.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
