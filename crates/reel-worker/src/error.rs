//! Worker error types and their taxonomy codes.

use thiserror::Error;

use reel_renderer::RendererError;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("job not found: {0}")]
    JobNotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("input asset not found input={input} asset_id={asset_id}")]
    AssetNotFound { input: String, asset_id: String },

    #[error("download input failed input={input} asset_id={asset_id}: {source}")]
    InputDownload {
        input: String,
        asset_id: String,
        #[source]
        source: reel_storage::StorageError,
    },

    #[error("render output missing: {0}")]
    OutputMissing(String),

    #[error("Renderer error: {0}")]
    Renderer(#[from] RendererError),

    #[error("Storage error: {0}")]
    Storage(#[from] reel_storage::StorageError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] reel_catalog::CatalogError),

    #[error("Queue error: {0}")]
    Queue(#[from] reel_queue::QueueError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Taxonomy code recorded alongside failures.
    pub fn code(&self) -> &'static str {
        match self {
            WorkerError::Validation(_) => "VALIDATION_ERROR",
            WorkerError::JobNotFound(_) | WorkerError::AssetNotFound { .. } => "NOT_FOUND",
            WorkerError::Renderer(RendererError::Timeout) => "TIMEOUT",
            WorkerError::Renderer(_) | WorkerError::Queue(_) => "UNAVAILABLE",
            WorkerError::InputDownload { .. }
            | WorkerError::OutputMissing(_)
            | WorkerError::Storage(_)
            | WorkerError::Catalog(_)
            | WorkerError::Io(_) => "INTERNAL_ERROR",
        }
    }
}
