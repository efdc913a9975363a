//! API error types and the response envelope.
//!
//! Every error surfaces to clients as
//! `{ "error": { "code", "message", "details"? } }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("job not found")]
    JobNotFound(String),

    #[error("asset not found")]
    AssetNotFound(String),

    #[error("asset file missing")]
    AssetFileMissing { asset_id: String, object_key: String },

    #[error("asset is referenced by job outputs")]
    AssetInUse(String),

    #[error("template not found")]
    TemplateNotFound(String),

    #[error("template name already exists")]
    TemplateNameExists,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Storage(#[from] reel_storage::StorageError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] reel_catalog::CatalogError),

    #[error("Queue error: {0}")]
    Queue(#[from] reel_queue::QueueError),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::JobNotFound(_)
            | ApiError::AssetNotFound(_)
            | ApiError::AssetFileMissing { .. }
            | ApiError::TemplateNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::AssetInUse(_) | ApiError::TemplateNameExists => StatusCode::CONFLICT,
            ApiError::Internal(_)
            | ApiError::Storage(_)
            | ApiError::Catalog(_)
            | ApiError::Queue(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::JobNotFound(_) => "JOB_NOT_FOUND",
            ApiError::AssetNotFound(_) => "ASSET_NOT_FOUND",
            ApiError::AssetFileMissing { .. } => "ASSET_FILE_MISSING",
            ApiError::AssetInUse(_) => "ASSET_IN_USE",
            ApiError::TemplateNotFound(_) => "TEMPLATE_NOT_FOUND",
            ApiError::TemplateNameExists => "TEMPLATE_NAME_EXISTS",
            ApiError::Internal(_)
            | ApiError::Storage(_)
            | ApiError::Catalog(_)
            | ApiError::Queue(_) => "INTERNAL_ERROR",
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            ApiError::Validation { field: Some(f), .. } => Some(json!({ "field": f })),
            ApiError::JobNotFound(id) => Some(json!({ "job_id": id })),
            ApiError::AssetNotFound(id) | ApiError::AssetInUse(id) => {
                Some(json!({ "asset_id": id }))
            }
            ApiError::AssetFileMissing { object_key, .. } => {
                Some(json!({ "object_key": object_key }))
            }
            ApiError::TemplateNotFound(id) => Some(json!({ "template_id": id })),
            ApiError::TemplateNameExists => Some(json!({ "field": "name" })),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't expose internal error details in production
        let message = match &self {
            ApiError::Internal(_)
            | ApiError::Storage(_)
            | ApiError::Catalog(_)
            | ApiError::Queue(_) => {
                if std::env::var("ENVIRONMENT").unwrap_or_default() == "production" {
                    "An internal error occurred".to_string()
                } else {
                    self.to_string()
                }
            }
            _ => self.to_string(),
        };

        let body = ErrorEnvelope {
            error: ErrorBody {
                code: self.code(),
                message,
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}
