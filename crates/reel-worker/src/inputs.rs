//! Input materialization for enveloped jobs.
//!
//! The renderer consumes local paths, so every referenced input asset is
//! downloaded into a job-scoped directory first. Failures leave partial
//! files behind; the cleanup policy handles the staging tree.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs;
use tracing::debug;

use reel_catalog::AssetsRepo;
use reel_storage::StorageProvider;

use crate::error::{WorkerError, WorkerResult};
use crate::util::{ext_from_mime, sanitize_filename};

/// Downloads referenced input assets to local files.
pub struct InputHandler {
    assets: AssetsRepo,
    storage: Arc<dyn StorageProvider>,
    storage_root: PathBuf,
}

impl InputHandler {
    pub fn new(
        assets: AssetsRepo,
        storage: Arc<dyn StorageProvider>,
        storage_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            assets,
            storage,
            storage_root: storage_root.into(),
        }
    }

    /// Materialize every input under `<root>/jobs/<job_id>/inputs/` and
    /// return the name -> absolute path map.
    pub async fn materialize(
        &self,
        job_id: &str,
        inputs: &BTreeMap<String, String>,
    ) -> WorkerResult<BTreeMap<String, String>> {
        let base_dir = self.storage_root.join("jobs").join(job_id).join("inputs");
        fs::create_dir_all(&base_dir).await?;

        let mut paths = BTreeMap::new();

        for (name, asset_id) in inputs {
            let asset_id = asset_id.trim();
            if asset_id.is_empty() {
                continue;
            }

            let asset = self.assets.get(asset_id).await?.ok_or_else(|| {
                WorkerError::AssetNotFound {
                    input: name.clone(),
                    asset_id: asset_id.to_string(),
                }
            })?;

            let mut stream = self.storage.get(&asset.object_key).await.map_err(|e| {
                WorkerError::InputDownload {
                    input: name.clone(),
                    asset_id: asset_id.to_string(),
                    source: e,
                }
            })?;

            let filename = format!("{}{}", sanitize_filename(name), ext_from_mime(&asset.mime));
            let local_path = base_dir.join(filename);

            let mut file = fs::File::create(&local_path).await?;
            tokio::io::copy(&mut stream.reader, &mut file).await?;

            debug!(
                job_id = %job_id,
                input = %name,
                path = %local_path.display(),
                "Materialized input"
            );

            paths.insert(name.clone(), local_path.to_string_lossy().into_owned());
        }

        Ok(paths)
    }
}
