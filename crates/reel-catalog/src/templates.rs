//! Template rows. Deletion is a tombstone; name uniqueness holds among
//! live rows only.

use serde_json::Value;
use sqlx::PgPool;

use reel_models::{NewTemplate, Template, TemplatePatch};

use crate::error::{CatalogError, CatalogResult};
use crate::row::template_from_row;

const TEMPLATE_COLUMNS: &str =
    "id, type, name, duration_ms, format, params_schema, defaults, created_at, deleted_at";

/// Repository over the `templates` table.
#[derive(Clone)]
pub struct TemplatesRepo {
    pool: PgPool,
}

impl TemplatesRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a template. A live-name collision surfaces as
    /// `CatalogError::UniqueViolation`.
    pub async fn create(&self, new: NewTemplate) -> CatalogResult<Template> {
        let format_json: Option<Value> = match &new.format {
            Some(f) => Some(serde_json::to_value(f)?),
            None => None,
        };

        let row = sqlx::query(&format!(
            r#"INSERT INTO templates (id, type, name, duration_ms, format, params_schema, defaults)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {TEMPLATE_COLUMNS}"#
        ))
        .bind(&new.id)
        .bind(&new.template_type)
        .bind(&new.name)
        .bind(new.duration_ms)
        .bind(&format_json)
        .bind(&new.params_schema)
        .bind(&new.defaults)
        .fetch_one(&self.pool)
        .await?;

        template_from_row(&row)
    }

    /// List live templates, newest first.
    pub async fn list(&self) -> CatalogResult<Vec<Template>> {
        let rows = sqlx::query(&format!(
            r#"SELECT {TEMPLATE_COLUMNS} FROM templates
               WHERE deleted_at IS NULL ORDER BY created_at DESC"#
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(template_from_row).collect()
    }

    /// Fetch a live template by id.
    pub async fn get(&self, id: &str) -> CatalogResult<Option<Template>> {
        let row = sqlx::query(&format!(
            r#"SELECT {TEMPLATE_COLUMNS} FROM templates
               WHERE id = $1 AND deleted_at IS NULL"#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(template_from_row).transpose()
    }

    /// Defaults of a live template, with missing defaults coalesced to `{}`.
    /// `None` means the template does not exist or is deleted.
    pub async fn defaults(&self, id: &str) -> CatalogResult<Option<Value>> {
        let row = sqlx::query(
            r#"SELECT COALESCE(defaults, '{}'::jsonb) AS defaults FROM templates
               WHERE id = $1 AND deleted_at IS NULL"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                use sqlx::Row;
                let defaults: Value = row.try_get("defaults").map_err(CatalogError::from)?;
                Ok(Some(defaults))
            }
            None => Ok(None),
        }
    }

    /// Apply a partial update to a live template; unset patch fields keep
    /// their stored value. Returns the fresh row.
    pub async fn update(&self, id: &str, patch: TemplatePatch) -> CatalogResult<Template> {
        let current = self
            .get(id)
            .await?
            .ok_or_else(|| CatalogError::not_found(format!("template not found: {id}")))?;

        let template_type = patch.template_type.unwrap_or(current.template_type);
        let name = patch.name.unwrap_or(current.name);
        let duration_ms = patch.duration_ms.or(current.duration_ms);
        let format = patch.format.or(current.format);
        let params_schema = patch.params_schema.or(current.params_schema);
        let defaults = patch.defaults.or(current.defaults);

        let format_json: Option<Value> = match &format {
            Some(f) => Some(serde_json::to_value(f)?),
            None => None,
        };

        let row = sqlx::query(&format!(
            r#"UPDATE templates
               SET type = $2, name = $3, duration_ms = $4,
                   format = $5, params_schema = $6, defaults = $7
               WHERE id = $1 AND deleted_at IS NULL
               RETURNING {TEMPLATE_COLUMNS}"#
        ))
        .bind(id)
        .bind(&template_type)
        .bind(&name)
        .bind(duration_ms)
        .bind(&format_json)
        .bind(&params_schema)
        .bind(&defaults)
        .fetch_one(&self.pool)
        .await?;

        template_from_row(&row)
    }

    /// Tombstone a live template. Returns false when there was nothing
    /// live to delete.
    pub async fn soft_delete(&self, id: &str) -> CatalogResult<bool> {
        let res = sqlx::query(
            r#"UPDATE templates SET deleted_at = now()
               WHERE id = $1 AND deleted_at IS NULL"#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() == 1)
    }
}
