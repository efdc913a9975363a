//! Job rows and the lease transition.

use sqlx::PgPool;
use tracing::debug;

use reel_models::{Job, JobStatus, NewJob};

use crate::error::CatalogResult;
use crate::row::job_from_row;

/// Repository over the `jobs` table.
#[derive(Clone)]
pub struct JobsRepo {
    pool: PgPool,
}

impl JobsRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a job in QUEUED state and return the stored row.
    pub async fn create(&self, new: NewJob) -> CatalogResult<Job> {
        let row = sqlx::query(
            r#"INSERT INTO jobs (id, name, status, params_json)
               VALUES ($1, $2, 'QUEUED', $3)
               RETURNING id, name, status, params_json, created_at,
                         started_at, finished_at, error_text"#,
        )
        .bind(&new.id)
        .bind(&new.name)
        .bind(&new.params)
        .fetch_one(&self.pool)
        .await?;

        job_from_row(&row)
    }

    pub async fn get(&self, id: &str) -> CatalogResult<Option<Job>> {
        let row = sqlx::query(
            r#"SELECT id, name, status, params_json, created_at,
                      started_at, finished_at, error_text
               FROM jobs WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(job_from_row).transpose()
    }

    /// List jobs, newest first, optionally filtered by status.
    pub async fn list(&self, status: Option<JobStatus>, limit: i64) -> CatalogResult<Vec<Job>> {
        let rows = match status {
            Some(s) => {
                sqlx::query(
                    r#"SELECT id, name, status, params_json, created_at,
                              started_at, finished_at, error_text
                       FROM jobs WHERE status = $1
                       ORDER BY created_at DESC LIMIT $2"#,
                )
                .bind(s.as_str())
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"SELECT id, name, status, params_json, created_at,
                              started_at, finished_at, error_text
                       FROM jobs ORDER BY created_at DESC LIMIT $1"#,
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(job_from_row).collect()
    }

    /// The single transition out of QUEUED.
    ///
    /// Guarded on the current status so a duplicate queue delivery that
    /// arrives after the lease (or after completion) affects no row and
    /// can be dropped by the caller.
    pub async fn try_start(&self, id: &str) -> CatalogResult<bool> {
        let res = sqlx::query(
            r#"UPDATE jobs
               SET status = 'RUNNING', started_at = now(),
                   finished_at = NULL, error_text = NULL
               WHERE id = $1 AND status = 'QUEUED'"#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        let leased = res.rows_affected() == 1;
        if !leased {
            debug!(job_id = %id, "lease skipped, job already left QUEUED");
        }
        Ok(leased)
    }

    pub async fn mark_done(&self, id: &str) -> CatalogResult<()> {
        sqlx::query(r#"UPDATE jobs SET status = 'DONE', finished_at = now() WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn mark_failed(&self, id: &str, error_text: &str) -> CatalogResult<()> {
        sqlx::query(
            r#"UPDATE jobs SET status = 'FAILED', finished_at = now(), error_text = $2
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(error_text)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
