//! Durable references to binary blobs held by a storage provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::new_id;

/// Asset kinds written by the worker.
pub mod kind {
    pub const RENDER_OUTPUT: &str = "render_output";
    pub const THUMBNAIL: &str = "thumbnail";
    pub const CAPTIONS: &str = "captions";
}

/// A durable reference to a stored blob.
///
/// `object_key` is whatever the provider's put returned: a path for the
/// local backend, an opaque file id for remote backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    /// Opaque id with `ast_` prefix
    pub id: String,

    /// What the blob is (`render_output`, `thumbnail`, `captions`,
    /// or a caller-supplied kind for uploads)
    pub kind: String,

    /// Stable label of the storage backend that holds the blob
    pub provider: String,

    /// Provider-effective object key
    pub object_key: String,

    pub mime: String,

    pub size_bytes: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Fields needed to insert an asset row.
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub id: String,
    pub kind: String,
    pub provider: String,
    pub object_key: String,
    pub mime: String,
    pub size_bytes: i64,
    pub label: Option<String>,
}

impl NewAsset {
    pub fn new(
        kind: impl Into<String>,
        provider: impl Into<String>,
        object_key: impl Into<String>,
        mime: impl Into<String>,
        size_bytes: i64,
    ) -> Self {
        Self {
            id: new_id("ast"),
            kind: kind.into(),
            provider: provider.into(),
            object_key: object_key.into(),
            mime: mime.into(),
            size_bytes,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        if !label.trim().is_empty() {
            self.label = Some(label);
        }
        self
    }
}
