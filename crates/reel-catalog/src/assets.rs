//! Asset rows.

use sqlx::PgPool;
use sqlx::Row;

use reel_models::{Asset, NewAsset};

use crate::error::CatalogResult;
use crate::row::asset_from_row;

/// Repository over the `assets` table.
#[derive(Clone)]
pub struct AssetsRepo {
    pool: PgPool,
}

impl AssetsRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an asset row and return the stored entity.
    ///
    /// `object_key` must already be the provider-effective key returned
    /// by the storage put, never the logical path handed in.
    pub async fn insert(&self, new: NewAsset) -> CatalogResult<Asset> {
        let row = sqlx::query(
            r#"INSERT INTO assets (id, kind, provider, object_key, mime, size_bytes, label)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING id, kind, provider, object_key, mime, size_bytes, label, created_at"#,
        )
        .bind(&new.id)
        .bind(&new.kind)
        .bind(&new.provider)
        .bind(&new.object_key)
        .bind(&new.mime)
        .bind(new.size_bytes)
        .bind(&new.label)
        .fetch_one(&self.pool)
        .await?;

        asset_from_row(&row)
    }

    pub async fn get(&self, id: &str) -> CatalogResult<Option<Asset>> {
        let row = sqlx::query(
            r#"SELECT id, kind, provider, object_key, mime, size_bytes, label, created_at
               FROM assets WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(asset_from_row).transpose()
    }

    /// Whether any job output references the asset. Referenced assets
    /// must not be deleted (I3).
    pub async fn is_referenced(&self, id: &str) -> CatalogResult<bool> {
        let row = sqlx::query(
            r#"SELECT COUNT(1) AS cnt FROM job_outputs
               WHERE video_asset_id = $1
                  OR thumbnail_asset_id = $1
                  OR captions_asset_id = $1"#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        let cnt: i64 = row.try_get("cnt")?;
        Ok(cnt > 0)
    }

    pub async fn delete(&self, id: &str) -> CatalogResult<()> {
        sqlx::query(r#"DELETE FROM assets WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
