//! The storage capability set and the backend factory.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use crate::error::{StorageError, StorageResult};
use crate::gdrive::{GdriveConfig, GdriveProvider};
use crate::localfs::LocalFsProvider;

/// Label of the local backend. The staging root IS the store for it, so
/// cleanup policies key off this value.
pub const LOCALFS_LABEL: &str = "localfs";

/// Byte source handed to `put`.
pub type ObjectReader = Box<dyn AsyncRead + Send + Unpin>;

/// Result of a `put`.
///
/// `object_key` is the effective key: remote backends substitute the
/// logical key with a provider-assigned identifier. Callers must persist
/// this value, never the key they passed in.
#[derive(Debug, Clone)]
pub struct PutResult {
    pub object_key: String,
    pub size: i64,
}

/// An open object returned by `get`. The caller drives the reader to
/// completion (or drops it to abort).
pub struct ObjectStream {
    pub reader: ObjectReader,
    pub content_type: String,
    pub size: i64,
}

impl std::fmt::Debug for ObjectStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStream")
            .field("content_type", &self.content_type)
            .field("size", &self.size)
            .finish()
    }
}

/// The capability set every backend implements.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Stable tag recorded on every asset row.
    fn provider_label(&self) -> &'static str;

    /// Store an object. May substitute the key.
    async fn put(
        &self,
        key: &str,
        content_type: &str,
        reader: ObjectReader,
        size: i64,
    ) -> StorageResult<PutResult>;

    /// Open an object for reading. Fails `NotFound` when absent.
    async fn get(&self, key: &str) -> StorageResult<ObjectStream>;

    /// Remove an object. Absence is success.
    async fn delete(&self, key: &str) -> StorageResult<()>;
}

/// Build the provider selected by `STORAGE_PROVIDER` (`localfs` default,
/// or `gdrive`).
pub fn provider_from_env() -> StorageResult<Arc<dyn StorageProvider>> {
    let label = std::env::var("STORAGE_PROVIDER").unwrap_or_else(|_| LOCALFS_LABEL.to_string());

    match label.as_str() {
        LOCALFS_LABEL => {
            let root = std::env::var("STORAGE_LOCAL_ROOT")
                .map_err(|_| StorageError::config_error("STORAGE_LOCAL_ROOT not set"))?;
            Ok(Arc::new(LocalFsProvider::new(root)))
        }
        GdriveProvider::LABEL => Ok(Arc::new(GdriveProvider::new(GdriveConfig::from_env()?))),
        other => Err(StorageError::config_error(format!(
            "unknown storage provider: {other}"
        ))),
    }
}
