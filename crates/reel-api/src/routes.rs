//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::handlers::assets::{delete_asset, get_asset, get_asset_url, stream_asset, upload_asset};
use crate::handlers::jobs::{create_job, get_job, list_jobs};
use crate::handlers::templates::{
    create_template, delete_template, get_template, list_templates, update_template,
};
use crate::handlers::{health, ready};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/jobs", post(create_job).get(list_jobs))
        .route("/jobs/:job_id", get(get_job))
        .route("/assets", post(upload_asset))
        .route("/assets/:asset_id", get(get_asset).delete(delete_asset))
        .route("/assets/:asset_id/url", get(get_asset_url))
        .route("/assets/:asset_id/content", get(stream_asset))
        .route("/templates", post(create_template).get(list_templates))
        .route(
            "/templates/:template_id",
            get(get_template)
                .patch(update_template)
                .delete(delete_template),
        );

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let max_body = state.config.max_body_size;

    Router::new()
        .merge(api_routes)
        .merge(health_routes)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Recovery boundary: a panicking handler becomes a 500 envelope instead
/// of a dropped connection.
fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    };

    error!(panic = %detail, "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": {
                "code": "INTERNAL_ERROR",
                "message": "An internal error occurred"
            }
        })),
    )
        .into_response()
}
