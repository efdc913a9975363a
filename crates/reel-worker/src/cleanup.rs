//! Best-effort staging cleanup. Never fails a job.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs;
use tracing::debug;

use reel_storage::{StorageProvider, LOCALFS_LABEL};

/// Removes a job's render staging directory after its output row is
/// committed.
pub struct Cleanup {
    storage_root: PathBuf,
    cleanup_local: bool,
    storage: Arc<dyn StorageProvider>,
}

impl Cleanup {
    pub fn new(
        storage_root: impl Into<PathBuf>,
        cleanup_local: bool,
        storage: Arc<dyn StorageProvider>,
    ) -> Self {
        Self {
            storage_root: storage_root.into(),
            cleanup_local,
            storage,
        }
    }

    fn should_cleanup(&self) -> bool {
        // Under the local provider the staging tree is the store itself.
        self.cleanup_local && self.storage.provider_label() != LOCALFS_LABEL
    }

    /// Remove `<root>/renders/<job_id>/`. Not-found and not-empty are
    /// normal outcomes; everything else is logged and swallowed.
    pub async fn cleanup_job(&self, job_id: &str) {
        if !self.should_cleanup() {
            return;
        }

        let job_dir = self.storage_root.join("renders").join(job_id);
        if let Err(e) = fs::remove_dir(&job_dir).await {
            debug!(job_id = %job_id, error = %e, "Render dir cleanup skipped");
        }
    }
}
