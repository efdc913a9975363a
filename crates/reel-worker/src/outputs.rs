//! Output key planning, upload and asset registration.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs;
use tracing::{debug, warn};

use reel_catalog::AssetsRepo;
use reel_models::{asset::kind, NewAsset};
use reel_storage::{StorageProvider, LOCALFS_LABEL};

use crate::error::{WorkerError, WorkerResult};

/// Deterministic object keys for a job's outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputKeys {
    pub video: String,
    pub thumb: String,
    /// Set only when captions are requested
    pub captions: Option<String>,
}

impl OutputKeys {
    pub fn for_job(job_id: &str, captions_enabled: bool) -> Self {
        Self {
            video: format!("renders/{job_id}/hello.mp4"),
            thumb: format!("renders/{job_id}/hello.jpg"),
            captions: captions_enabled.then(|| format!("renders/{job_id}/captions.vtt")),
        }
    }
}

/// Asset ids collected from a successful registration pass.
#[derive(Debug, Clone)]
pub struct OutputSet {
    pub video_asset_id: String,
    pub thumbnail_asset_id: String,
    pub captions_asset_id: Option<String>,
}

/// Uploads render outputs from the staging root and records them as
/// assets.
pub struct OutputHandler {
    assets: AssetsRepo,
    storage: Arc<dyn StorageProvider>,
    storage_root: PathBuf,
    cleanup_local: bool,
}

impl OutputHandler {
    pub fn new(
        assets: AssetsRepo,
        storage: Arc<dyn StorageProvider>,
        storage_root: impl Into<PathBuf>,
        cleanup_local: bool,
    ) -> Self {
        Self {
            assets,
            storage,
            storage_root: storage_root.into(),
            cleanup_local,
        }
    }

    /// Upload and register video, thumbnail, and (when enabled and
    /// present on disk) captions. A missing captions file is tolerated;
    /// a missing video or thumbnail is fatal.
    pub async fn register_outputs(
        &self,
        job_id: &str,
        keys: &OutputKeys,
        used_v1: bool,
        captions_enabled: bool,
    ) -> WorkerResult<OutputSet> {
        let video_asset_id = self
            .register_asset(kind::RENDER_OUTPUT, "video/mp4", &keys.video)
            .await?;
        let thumbnail_asset_id = self
            .register_asset(kind::THUMBNAIL, "image/jpeg", &keys.thumb)
            .await?;

        let mut captions_asset_id = None;
        if used_v1 && captions_enabled {
            if let Some(captions_key) = &keys.captions {
                if self.staging_file_exists(captions_key).await {
                    captions_asset_id = Some(
                        self.register_asset(kind::CAPTIONS, "text/vtt", captions_key)
                            .await?,
                    );
                } else {
                    warn!(
                        job_id = %job_id,
                        key = %captions_key,
                        "Captions requested but renderer produced none"
                    );
                }
            }
        }

        Ok(OutputSet {
            video_asset_id,
            thumbnail_asset_id,
            captions_asset_id,
        })
    }

    async fn staging_file_exists(&self, key: &str) -> bool {
        fs::metadata(self.storage_root.join(key)).await.is_ok()
    }

    /// Upload one staging file and insert its asset row. The row stores
    /// the effective key returned by the provider, which for remote
    /// backends differs from the staging key.
    async fn register_asset(&self, kind: &str, mime: &str, key: &str) -> WorkerResult<String> {
        let local_path = self.storage_root.join(key);

        let size = match fs::metadata(&local_path).await {
            Ok(meta) => meta.len() as i64,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(WorkerError::OutputMissing(key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let file = fs::File::open(&local_path).await?;
        let put = self
            .storage
            .put(key, mime, Box::new(file), size)
            .await?;

        let asset = self
            .assets
            .insert(NewAsset::new(
                kind,
                self.storage.provider_label(),
                put.object_key,
                mime,
                put.size,
            ))
            .await?;

        debug!(asset_id = %asset.id, key = %key, "Registered output asset");

        self.maybe_cleanup_file(key).await;
        Ok(asset.id)
    }

    /// Remove the staging copy after a successful upload and insert.
    /// Only when cleanup is on and the provider is remote; under the
    /// local provider the staging file is the stored object.
    async fn maybe_cleanup_file(&self, key: &str) {
        if !self.cleanup_local || self.storage.provider_label() == LOCALFS_LABEL {
            return;
        }
        if let Err(e) = fs::remove_file(self.storage_root.join(key)).await {
            debug!(key = %key, error = %e, "Staging file cleanup skipped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_keys_without_captions() {
        let keys = OutputKeys::for_job("job_7", false);
        assert_eq!(keys.video, "renders/job_7/hello.mp4");
        assert_eq!(keys.thumb, "renders/job_7/hello.jpg");
        assert!(keys.captions.is_none());
    }

    #[test]
    fn test_output_keys_with_captions() {
        let keys = OutputKeys::for_job("job_7", true);
        assert_eq!(keys.captions.as_deref(), Some("renders/job_7/captions.vtt"));
    }
}
