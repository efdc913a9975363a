//! Google Drive backend.
//!
//! Put uses the resumable upload protocol and returns the Drive file id
//! as the effective object key, so every later get/delete addresses the
//! object by that id. Access tokens come from the OAuth2 refresh-token
//! flow and are cached in-process until shortly before expiry.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::header;
use serde::Deserialize;
use tokio::sync::RwLock;
use tokio_util::io::{ReaderStream, StreamReader};
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::provider::{ObjectReader, ObjectStream, PutResult, StorageProvider};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";

/// Refresh window before a cached token is considered stale.
const TOKEN_SLACK: Duration = Duration::from_secs(60);

/// Drive provider configuration.
#[derive(Debug, Clone)]
pub struct GdriveConfig {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    /// Optional parent folder for uploads
    pub folder_id: Option<String>,
}

impl GdriveConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            client_id: require_env("GDRIVE_CLIENT_ID")?,
            client_secret: require_env("GDRIVE_CLIENT_SECRET")?,
            refresh_token: require_env("GDRIVE_REFRESH_TOKEN")?,
            folder_id: std::env::var("GDRIVE_FOLDER_ID")
                .ok()
                .filter(|s| !s.trim().is_empty()),
        })
    }
}

fn require_env(key: &str) -> StorageResult<String> {
    std::env::var(key).map_err(|_| StorageError::config_error(format!("{key} not set")))
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Google Drive storage provider.
pub struct GdriveProvider {
    http: reqwest::Client,
    config: GdriveConfig,
    token: RwLock<Option<CachedToken>>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize)]
struct FileResource {
    id: String,
}

impl GdriveProvider {
    pub const LABEL: &'static str = "gdrive";

    pub fn new(config: GdriveConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            token: RwLock::new(None),
        }
    }

    /// Current access token, refreshed through the OAuth2 token endpoint
    /// when the cached one is missing or about to expire.
    async fn access_token(&self) -> StorageResult<String> {
        if let Some(cached) = self.token.read().await.as_ref() {
            if cached.expires_at > Instant::now() + TOKEN_SLACK {
                return Ok(cached.access_token.clone());
            }
        }

        let resp = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("refresh_token", self.config.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| StorageError::AuthFailed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(StorageError::AuthFailed(format!(
                "token endpoint returned {}",
                resp.status()
            )));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| StorageError::AuthFailed(e.to_string()))?;

        let access_token = token.access_token.clone();
        *self.token.write().await = Some(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });

        debug!("Refreshed Drive access token");
        Ok(access_token)
    }
}

#[async_trait]
impl StorageProvider for GdriveProvider {
    fn provider_label(&self) -> &'static str {
        Self::LABEL
    }

    async fn put(
        &self,
        key: &str,
        content_type: &str,
        reader: ObjectReader,
        size: i64,
    ) -> StorageResult<PutResult> {
        if key.is_empty() {
            return Err(StorageError::upload_failed("object key is required"));
        }

        let token = self.access_token().await?;

        // Session start carries the metadata; the logical key becomes the
        // Drive file name.
        let mut metadata = serde_json::json!({ "name": key });
        if let Some(folder) = &self.config.folder_id {
            metadata["parents"] = serde_json::json!([folder]);
        }

        let session = self
            .http
            .post(format!("{UPLOAD_URL}?uploadType=resumable"))
            .bearer_auth(&token)
            .header("X-Upload-Content-Type", content_type)
            .json(&metadata)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        if !session.status().is_success() {
            return Err(StorageError::upload_failed(format!(
                "upload session returned {}",
                session.status()
            )));
        }

        let location = session
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| StorageError::upload_failed("upload session missing location"))?
            .to_string();

        let body = reqwest::Body::wrap_stream(ReaderStream::new(reader));

        let resp = self
            .http
            .put(&location)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CONTENT_LENGTH, size)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(StorageError::upload_failed(format!(
                "upload returned {}",
                resp.status()
            )));
        }

        let file: FileResource = resp
            .json()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        debug!(key = %key, file_id = %file.id, "Uploaded object to Drive");

        // The file id is the effective key; later reads address it directly.
        Ok(PutResult {
            object_key: file.id,
            size,
        })
    }

    async fn get(&self, key: &str) -> StorageResult<ObjectStream> {
        let token = self.access_token().await?;

        let resp = self
            .http
            .get(format!("{FILES_URL}/{key}?alt=media&supportsAllDrives=true"))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| StorageError::download_failed(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StorageError::not_found(key));
        }
        if !resp.status().is_success() {
            return Err(StorageError::download_failed(format!(
                "download returned {}",
                resp.status()
            )));
        }

        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let size = resp.content_length().unwrap_or(0) as i64;

        let stream = resp
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));

        Ok(ObjectStream {
            reader: Box::new(StreamReader::new(stream)),
            content_type,
            size,
        })
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let token = self.access_token().await?;

        let resp = self
            .http
            .delete(format!("{FILES_URL}/{key}?supportsAllDrives=true"))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| StorageError::delete_failed(e.to_string()))?;

        // Absence is success; delete is idempotent.
        if resp.status() == reqwest::StatusCode::NOT_FOUND || resp.status().is_success() {
            return Ok(());
        }

        Err(StorageError::delete_failed(format!(
            "delete returned {}",
            resp.status()
        )))
    }
}
