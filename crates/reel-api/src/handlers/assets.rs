//! Asset upload, inspection, streaming and deletion.

use std::path::Path as FsPath;

use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Json;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tokio_util::io::ReaderStream;
use tracing::info;

use reel_models::{new_id, NewAsset};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Upload an asset as multipart form data: `kind` (required), `label`
/// (optional), `file` (required).
pub async fn upload_asset(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut kind = String::new();
    let mut label = String::new();
    let mut file: Option<(Option<String>, Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::validation("invalid multipart form"))?
    {
        match field.name() {
            Some("kind") => {
                kind = field
                    .text()
                    .await
                    .map_err(|_| ApiError::validation_field("kind must be text", "kind"))?
                    .trim()
                    .to_string();
            }
            Some("label") => {
                label = field
                    .text()
                    .await
                    .map_err(|_| ApiError::validation_field("label must be text", "label"))?
                    .trim()
                    .to_string();
            }
            Some("file") => {
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::validation_field("file read failed", "file"))?;
                file = Some((filename, content_type, data.to_vec()));
            }
            _ => {}
        }
    }

    if kind.is_empty() {
        return Err(ApiError::validation_field("kind is required", "kind"));
    }
    let (filename, content_type, data) =
        file.ok_or_else(|| ApiError::validation_field("file is required", "file"))?;

    let ext = extension_for(filename.as_deref(), content_type.as_deref());
    let content_type = content_type
        .filter(|ct| !ct.is_empty())
        .or_else(|| {
            mime_guess::from_ext(ext.trim_start_matches('.'))
                .first_raw()
                .map(str::to_string)
        })
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let asset_id = new_id("ast");
    let object_key = format!("assets/{asset_id}/original{ext}");
    let size = data.len() as i64;

    let put = state
        .storage
        .put(
            &object_key,
            &content_type,
            Box::new(std::io::Cursor::new(data)),
            size,
        )
        .await?;

    let asset = state
        .catalog
        .assets()
        .insert(NewAsset {
            id: asset_id,
            kind,
            provider: state.storage.provider_label().to_string(),
            // The provider may substitute the key; store what it returned.
            object_key: put.object_key,
            mime: content_type,
            size_bytes: put.size,
            label: (!label.is_empty()).then_some(label),
        })
        .await?;

    info!(asset_id = %asset.id, kind = %asset.kind, "Asset uploaded");

    Ok((StatusCode::CREATED, Json(json!({ "asset": asset }))))
}

/// Extension from the uploaded filename, else from the content type,
/// else `.bin`.
fn extension_for(filename: Option<&str>, content_type: Option<&str>) -> String {
    if let Some(ext) = filename
        .and_then(|f| FsPath::new(f).extension())
        .and_then(|e| e.to_str())
    {
        return format!(".{ext}");
    }

    if let Some(ct) = content_type {
        if let Some(exts) = mime_guess::get_mime_extensions_str(ct) {
            if let Some(ext) = exts.first() {
                return format!(".{ext}");
            }
        }
    }

    ".bin".to_string()
}

pub async fn get_asset(
    State(state): State<AppState>,
    Path(asset_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let asset = state
        .catalog
        .assets()
        .get(&asset_id)
        .await?
        .ok_or_else(|| ApiError::AssetNotFound(asset_id.clone()))?;

    Ok(Json(json!({ "asset": asset })))
}

/// Plain content URL with an advisory expiry; no signing in this
/// deployment.
pub async fn get_asset_url(
    State(state): State<AppState>,
    Path(asset_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let expires_at = Utc::now() + Duration::minutes(30);

    Ok(Json(json!({
        "asset_id": asset_id,
        "url": format!(
            "http://localhost:{}/assets/{}/content",
            state.config.port, asset_id
        ),
        "expires_at": expires_at,
    })))
}

/// Stream the provider's bytes back to the client.
pub async fn stream_asset(
    State(state): State<AppState>,
    Path(asset_id): Path<String>,
) -> ApiResult<Response> {
    let asset = state
        .catalog
        .assets()
        .get(&asset_id)
        .await?
        .ok_or_else(|| ApiError::AssetNotFound(asset_id.clone()))?;

    let stream = state
        .storage
        .get(&asset.object_key)
        .await
        .map_err(|_| ApiError::AssetFileMissing {
            asset_id: asset_id.clone(),
            object_key: asset.object_key.clone(),
        })?;

    let content_type = if stream.content_type.is_empty() {
        asset.mime.clone()
    } else {
        stream.content_type.clone()
    };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type);
    if stream.size > 0 {
        builder = builder.header(header::CONTENT_LENGTH, stream.size);
    }

    builder
        .body(Body::from_stream(ReaderStream::new(stream.reader)))
        .map_err(|e| ApiError::internal(e.to_string()))
}

/// Delete an asset unless a job output references it.
pub async fn delete_asset(
    State(state): State<AppState>,
    Path(asset_id): Path<String>,
) -> ApiResult<StatusCode> {
    let assets = state.catalog.assets();

    let asset = assets
        .get(&asset_id)
        .await?
        .ok_or_else(|| ApiError::AssetNotFound(asset_id.clone()))?;

    if assets.is_referenced(&asset_id).await? {
        return Err(ApiError::AssetInUse(asset_id));
    }

    // Provider delete is idempotent; only transport errors surface.
    state.storage.delete(&asset.object_key).await?;
    assets.delete(&asset_id).await?;

    info!(asset_id = %asset_id, "Asset deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_prefers_filename() {
        assert_eq!(
            extension_for(Some("avatar.png"), Some("image/jpeg")),
            ".png"
        );
    }

    #[test]
    fn test_extension_falls_back_to_content_type() {
        let ext = extension_for(Some("noext"), Some("image/png"));
        assert_eq!(ext, ".png");
    }

    #[test]
    fn test_extension_defaults_to_bin() {
        assert_eq!(extension_for(None, None), ".bin");
        assert_eq!(extension_for(Some("blob"), Some("application/x-unknown-thing")), ".bin");
    }
}
