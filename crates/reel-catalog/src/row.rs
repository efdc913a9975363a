//! Row -> entity decoding shared by the repositories.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::Row;

use reel_models::{Asset, Job, JobOutput, JobStatus, Template, TemplateFormat};

use crate::error::{CatalogError, CatalogResult};

pub(crate) fn job_from_row(row: &PgRow) -> CatalogResult<Job> {
    let status: String = row.try_get("status").map_err(CatalogError::from)?;
    let status = JobStatus::try_from(status.as_str()).map_err(CatalogError::decode)?;

    Ok(Job {
        id: row.try_get("id").map_err(CatalogError::from)?,
        name: row.try_get("name").map_err(CatalogError::from)?,
        status,
        params: row.try_get("params_json").map_err(CatalogError::from)?,
        created_at: row.try_get("created_at").map_err(CatalogError::from)?,
        started_at: row.try_get("started_at").map_err(CatalogError::from)?,
        finished_at: row.try_get("finished_at").map_err(CatalogError::from)?,
        error_text: row.try_get("error_text").map_err(CatalogError::from)?,
    })
}

pub(crate) fn asset_from_row(row: &PgRow) -> CatalogResult<Asset> {
    Ok(Asset {
        id: row.try_get("id").map_err(CatalogError::from)?,
        kind: row.try_get("kind").map_err(CatalogError::from)?,
        provider: row.try_get("provider").map_err(CatalogError::from)?,
        object_key: row.try_get("object_key").map_err(CatalogError::from)?,
        mime: row.try_get("mime").map_err(CatalogError::from)?,
        size_bytes: row.try_get("size_bytes").map_err(CatalogError::from)?,
        label: row.try_get("label").map_err(CatalogError::from)?,
        created_at: row.try_get("created_at").map_err(CatalogError::from)?,
    })
}

pub(crate) fn output_from_row(row: &PgRow) -> CatalogResult<JobOutput> {
    Ok(JobOutput {
        id: row.try_get("id").map_err(CatalogError::from)?,
        job_id: row.try_get("job_id").map_err(CatalogError::from)?,
        variant: row.try_get("variant").map_err(CatalogError::from)?,
        video_asset_id: row.try_get("video_asset_id").map_err(CatalogError::from)?,
        thumbnail_asset_id: row
            .try_get("thumbnail_asset_id")
            .map_err(CatalogError::from)?,
        captions_asset_id: row
            .try_get("captions_asset_id")
            .map_err(CatalogError::from)?,
        created_at: row.try_get("created_at").map_err(CatalogError::from)?,
    })
}

pub(crate) fn template_from_row(row: &PgRow) -> CatalogResult<Template> {
    let format: Option<Value> = row.try_get("format").map_err(CatalogError::from)?;
    let format: Option<TemplateFormat> = match format {
        Some(v) => Some(serde_json::from_value(v)?),
        None => None,
    };

    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(CatalogError::from)?;

    Ok(Template {
        id: row.try_get("id").map_err(CatalogError::from)?,
        template_type: row.try_get("type").map_err(CatalogError::from)?,
        name: row.try_get("name").map_err(CatalogError::from)?,
        duration_ms: row.try_get("duration_ms").map_err(CatalogError::from)?,
        format,
        params_schema: row.try_get("params_schema").map_err(CatalogError::from)?,
        defaults: row.try_get("defaults").map_err(CatalogError::from)?,
        created_at,
        deleted_at: row.try_get("deleted_at").map_err(CatalogError::from)?,
    })
}
