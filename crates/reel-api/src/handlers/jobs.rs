//! Job submission and inspection.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use reel_models::{Job, JobStatus, NewJob};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub name: Option<String>,
    pub params: Option<Value>,
}

/// Submit a job: catalog row first, queue push second, so the queue
/// never references a row that is not durable yet.
pub async fn create_job(
    State(state): State<AppState>,
    Json(req): Json<CreateJobRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let params = req.params.unwrap_or_else(|| json!({}));
    let obj = params
        .as_object()
        .ok_or_else(|| ApiError::validation_field("params must be an object", "params"))?;

    // The legacy shape must carry text up front. Enveloped submissions
    // defer to the post-merge check, since template defaults may supply
    // it.
    let enveloped = obj
        .get("template_id")
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty());
    if !enveloped {
        let has_text = obj
            .get("text")
            .and_then(Value::as_str)
            .is_some_and(|t| !t.trim().is_empty());
        if !has_text {
            return Err(ApiError::validation_field(
                "params.text is required",
                "params.text",
            ));
        }
    }

    let job = state
        .catalog
        .jobs()
        .create(NewJob::new(req.name, params))
        .await?;

    state
        .queue
        .push(&job.id)
        .await
        .map_err(|e| ApiError::internal(format!("queue push failed: {e}")))?;

    info!(job_id = %job.id, "Job submitted");

    Ok((StatusCode::CREATED, Json(json!({ "job": job }))))
}

#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListJobsQuery>,
) -> ApiResult<Json<Value>> {
    let status = match query.status.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => Some(
            JobStatus::try_from(s)
                .map_err(|e| ApiError::validation_field(e, "status"))?,
        ),
        _ => None,
    };
    let limit = query.limit.unwrap_or(50).clamp(1, 200);

    let jobs = state.catalog.jobs().list(status, limit).await?;
    Ok(Json(json!({ "jobs": jobs })))
}

#[derive(Debug, Serialize)]
struct JobOutputView {
    variant: i32,
    video_asset_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    thumbnail_asset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    captions_asset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    video_object_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thumb_object_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    captions_object_key: Option<String>,
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let job = state
        .catalog
        .jobs()
        .get(&job_id)
        .await?
        .ok_or_else(|| ApiError::JobNotFound(job_id.clone()))?;

    let outputs = state.catalog.outputs().list_for_job(&job_id).await?;

    let mut views = Vec::with_capacity(outputs.len());
    for output in outputs {
        views.push(JobOutputView {
            variant: output.variant,
            video_object_key: lookup_object_key(&state, Some(&output.video_asset_id)).await?,
            thumb_object_key: lookup_object_key(&state, output.thumbnail_asset_id.as_deref())
                .await?,
            captions_object_key: lookup_object_key(&state, output.captions_asset_id.as_deref())
                .await?,
            video_asset_id: output.video_asset_id,
            thumbnail_asset_id: output.thumbnail_asset_id,
            captions_asset_id: output.captions_asset_id,
        });
    }

    Ok(Json(json!({ "job": job_with_outputs(job, views) })))
}

async fn lookup_object_key(state: &AppState, asset_id: Option<&str>) -> ApiResult<Option<String>> {
    match asset_id {
        Some(id) => Ok(state
            .catalog
            .assets()
            .get(id)
            .await?
            .map(|a| a.object_key)),
        None => Ok(None),
    }
}

fn job_with_outputs(job: Job, outputs: Vec<JobOutputView>) -> Value {
    let mut body = serde_json::to_value(&job).unwrap_or_else(|_| json!({}));
    if let Some(map) = body.as_object_mut() {
        map.insert(
            "outputs".to_string(),
            serde_json::to_value(outputs).unwrap_or_else(|_| json!([])),
        );
    }
    body
}
