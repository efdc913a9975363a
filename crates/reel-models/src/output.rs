//! Job outputs: the binding between a finished job and its assets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::new_id;

/// The row binding a DONE job to the assets it produced.
///
/// Outputs reference assets by id without owning them; the referential
/// check on asset deletion keeps I3 intact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobOutput {
    /// Opaque id with `out_` prefix
    pub id: String,

    pub job_id: String,

    /// 1-based; always 1 today, reserved for batch outputs
    pub variant: i32,

    pub video_asset_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_asset_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub captions_asset_id: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Fields needed to insert a job-output row.
#[derive(Debug, Clone)]
pub struct NewJobOutput {
    pub id: String,
    pub job_id: String,
    pub variant: i32,
    pub video_asset_id: String,
    pub thumbnail_asset_id: Option<String>,
    pub captions_asset_id: Option<String>,
}

impl NewJobOutput {
    pub fn new(job_id: impl Into<String>, video_asset_id: impl Into<String>) -> Self {
        Self {
            id: new_id("out"),
            job_id: job_id.into(),
            variant: 1,
            video_asset_id: video_asset_id.into(),
            thumbnail_asset_id: None,
            captions_asset_id: None,
        }
    }

    pub fn with_thumbnail(mut self, asset_id: impl Into<String>) -> Self {
        self.thumbnail_asset_id = Some(asset_id.into());
        self
    }

    pub fn with_captions(mut self, asset_id: Option<String>) -> Self {
        self.captions_asset_id = asset_id;
        self
    }
}
