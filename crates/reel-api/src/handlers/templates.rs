//! Template CRUD. Deletion is a tombstone; live names are unique.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use reel_catalog::CatalogError;
use reel_models::{NewTemplate, TemplateFormat, TemplatePatch};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    #[serde(rename = "type")]
    pub template_type: String,
    pub name: String,
    pub duration_ms: Option<i64>,
    pub format: Option<TemplateFormat>,
    pub params_schema: Option<Value>,
    pub defaults: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTemplateRequest {
    #[serde(rename = "type")]
    pub template_type: Option<String>,
    pub name: Option<String>,
    pub duration_ms: Option<i64>,
    pub format: Option<TemplateFormat>,
    pub params_schema: Option<Value>,
    pub defaults: Option<Value>,
}

pub async fn create_template(
    State(state): State<AppState>,
    Json(req): Json<CreateTemplateRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let template_type = req.template_type.trim().to_string();
    let name = req.name.trim().to_string();

    if template_type.is_empty() {
        return Err(ApiError::validation_field("type is required", "type"));
    }
    if name.is_empty() {
        return Err(ApiError::validation_field("name is required", "name"));
    }

    let mut new = NewTemplate::new(template_type, name);
    new.duration_ms = req.duration_ms;
    new.format = req.format;
    new.params_schema = req.params_schema;
    new.defaults = req.defaults;

    let template = state
        .catalog
        .templates()
        .create(new)
        .await
        .map_err(map_name_conflict)?;

    Ok((StatusCode::CREATED, Json(json!({ "template": template }))))
}

pub async fn list_templates(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let templates = state.catalog.templates().list().await?;
    Ok(Json(json!({ "templates": templates })))
}

pub async fn get_template(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let template = state
        .catalog
        .templates()
        .get(&template_id)
        .await?
        .ok_or_else(|| ApiError::TemplateNotFound(template_id.clone()))?;

    Ok(Json(json!({ "template": template })))
}

pub async fn update_template(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
    Json(req): Json<UpdateTemplateRequest>,
) -> ApiResult<Json<Value>> {
    let template_type = match req.template_type {
        Some(t) => {
            let t = t.trim().to_string();
            if t.is_empty() {
                return Err(ApiError::validation_field("type cannot be empty", "type"));
            }
            Some(t)
        }
        None => None,
    };
    let name = match req.name {
        Some(n) => {
            let n = n.trim().to_string();
            if n.is_empty() {
                return Err(ApiError::validation_field("name cannot be empty", "name"));
            }
            Some(n)
        }
        None => None,
    };

    let patch = TemplatePatch {
        template_type,
        name,
        duration_ms: req.duration_ms,
        format: req.format,
        params_schema: req.params_schema,
        defaults: req.defaults,
    };

    let template = state
        .catalog
        .templates()
        .update(&template_id, patch)
        .await
        .map_err(|e| match e {
            CatalogError::NotFound(_) => ApiError::TemplateNotFound(template_id.clone()),
            other => map_name_conflict(other),
        })?;

    Ok(Json(json!({ "template": template })))
}

pub async fn delete_template(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
) -> ApiResult<StatusCode> {
    let deleted = state.catalog.templates().soft_delete(&template_id).await?;
    if !deleted {
        return Err(ApiError::TemplateNotFound(template_id));
    }
    Ok(StatusCode::NO_CONTENT)
}

fn map_name_conflict(e: CatalogError) -> ApiError {
    if e.is_unique_violation() {
        ApiError::TemplateNameExists
    } else {
        ApiError::Catalog(e)
    }
}
