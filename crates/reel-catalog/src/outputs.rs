//! Job-output rows.

use sqlx::PgPool;

use reel_models::{JobOutput, NewJobOutput};

use crate::error::CatalogResult;
use crate::row::output_from_row;

/// Repository over the `job_outputs` table.
#[derive(Clone)]
pub struct OutputsRepo {
    pool: PgPool,
}

impl OutputsRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the output row binding a job to its produced assets.
    pub async fn insert(&self, new: NewJobOutput) -> CatalogResult<JobOutput> {
        let row = sqlx::query(
            r#"INSERT INTO job_outputs
               (id, job_id, variant, video_asset_id, thumbnail_asset_id, captions_asset_id)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id, job_id, variant, video_asset_id,
                         thumbnail_asset_id, captions_asset_id, created_at"#,
        )
        .bind(&new.id)
        .bind(&new.job_id)
        .bind(new.variant)
        .bind(&new.video_asset_id)
        .bind(&new.thumbnail_asset_id)
        .bind(&new.captions_asset_id)
        .fetch_one(&self.pool)
        .await?;

        output_from_row(&row)
    }

    pub async fn list_for_job(&self, job_id: &str) -> CatalogResult<Vec<JobOutput>> {
        let rows = sqlx::query(
            r#"SELECT id, job_id, variant, video_asset_id,
                      thumbnail_asset_id, captions_asset_id, created_at
               FROM job_outputs WHERE job_id = $1 ORDER BY variant ASC"#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(output_from_row).collect()
    }
}
