//! Relational catalog over Postgres.
//!
//! This crate provides:
//! - Connection pool setup and idempotent schema init
//! - Repositories for jobs, assets, job outputs and templates
//! - The guarded QUEUED -> RUNNING lease transition

pub mod assets;
pub mod catalog;
pub mod error;
pub mod jobs;
pub mod outputs;
pub mod templates;

mod row;

pub use assets::AssetsRepo;
pub use catalog::{Catalog, CatalogConfig};
pub use error::{CatalogError, CatalogResult};
pub use jobs::JobsRepo;
pub use outputs::OutputsRepo;
pub use templates::TemplatesRepo;
