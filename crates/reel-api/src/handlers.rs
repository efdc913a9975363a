//! Request handlers.

pub mod assets;
pub mod jobs;
pub mod templates;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::state::AppState;

/// Liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Readiness probe: catalog reachable, queue answerable.
pub async fn ready(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state.catalog.ping().await?;
    let queue_depth = state.queue.len().await?;

    Ok(Json(json!({
        "status": "ready",
        "queue_depth": queue_depth,
    })))
}
