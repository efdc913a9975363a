//! Path-rooted local filesystem backend.
//!
//! Keys are relative paths under the root; `put` returns the key
//! unchanged. In local deployments the staging root is the store itself.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::provider::{ObjectReader, ObjectStream, PutResult, StorageProvider, LOCALFS_LABEL};

/// Local filesystem storage provider.
pub struct LocalFsProvider {
    root: PathBuf,
}

impl LocalFsProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn abs(&self, key: &str) -> PathBuf {
        self.root.join(key.trim_start_matches('/'))
    }
}

#[async_trait]
impl StorageProvider for LocalFsProvider {
    fn provider_label(&self) -> &'static str {
        LOCALFS_LABEL
    }

    async fn put(
        &self,
        key: &str,
        _content_type: &str,
        mut reader: ObjectReader,
        _size: i64,
    ) -> StorageResult<PutResult> {
        let path = self.abs(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&path).await?;
        let written = tokio::io::copy(&mut reader, &mut file).await?;

        debug!(key = %key, bytes = written, "Stored object on local fs");

        Ok(PutResult {
            object_key: key.to_string(),
            size: written as i64,
        })
    }

    async fn get(&self, key: &str) -> StorageResult<ObjectStream> {
        let path = self.abs(key);

        let file = match fs::File::open(&path).await {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::not_found(key));
            }
            Err(e) => return Err(e.into()),
        };

        let size = file.metadata().await?.len() as i64;

        Ok(ObjectStream {
            reader: Box::new(file),
            content_type: guess_content_type(&path),
            size,
        })
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        match fs::remove_file(self.abs(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::delete_failed(e.to_string())),
        }
    }
}

fn guess_content_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    fn provider() -> (tempfile::TempDir, LocalFsProvider) {
        let dir = tempfile::tempdir().unwrap();
        let provider = LocalFsProvider::new(dir.path());
        (dir, provider)
    }

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let (_dir, provider) = provider();

        let body = b"fake mp4 bytes".to_vec();
        let put = provider
            .put(
                "renders/job_1/hello.mp4",
                "video/mp4",
                Box::new(std::io::Cursor::new(body.clone())),
                body.len() as i64,
            )
            .await
            .unwrap();

        // The local backend never substitutes the key.
        assert_eq!(put.object_key, "renders/job_1/hello.mp4");
        assert_eq!(put.size, body.len() as i64);

        let mut stream = provider.get(&put.object_key).await.unwrap();
        let mut read_back = Vec::new();
        stream.reader.read_to_end(&mut read_back).await.unwrap();

        assert_eq!(read_back, body);
        assert_eq!(stream.size, body.len() as i64);
        assert_eq!(stream.content_type, "video/mp4");
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (_dir, provider) = provider();

        let err = provider.get("renders/nope.mp4").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_dir, provider) = provider();

        let body = b"x".to_vec();
        provider
            .put("assets/a/original.bin", "application/octet-stream", Box::new(std::io::Cursor::new(body)), 1)
            .await
            .unwrap();

        provider.delete("assets/a/original.bin").await.unwrap();
        // Second delete of an absent object also succeeds.
        provider.delete("assets/a/original.bin").await.unwrap();
    }

    #[test]
    fn test_provider_label() {
        let dir = tempfile::tempdir().unwrap();
        let provider = LocalFsProvider::new(dir.path());
        assert_eq!(provider.provider_label(), "localfs");
    }
}
