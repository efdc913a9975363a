//! Catalog error types.

use thiserror::Error;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Row decode failed: {0}")]
    Decode(String),

    #[error("Database error: {0}")]
    Sqlx(sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CatalogError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// True when the error is a unique-constraint conflict (e.g. a live
    /// template name collision).
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, CatalogError::UniqueViolation(_))
    }
}

impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db) = err {
            // 23505 = unique_violation
            if db.code().as_deref() == Some("23505") {
                return CatalogError::UniqueViolation(db.message().to_string());
            }
        }
        CatalogError::Sqlx(err)
    }
}
