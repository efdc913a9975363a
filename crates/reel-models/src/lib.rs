//! Shared domain types for the reel render platform.
//!
//! This crate provides:
//! - Prefixed opaque identifiers (`job_`, `ast_`, `out_`, `tpl_`)
//! - Job, asset, job-output and template entities
//! - The job status state machine

pub mod asset;
pub mod ids;
pub mod job;
pub mod output;
pub mod template;

pub use asset::{Asset, NewAsset};
pub use ids::new_id;
pub use job::{Job, JobStatus, NewJob};
pub use output::{JobOutput, NewJobOutput};
pub use template::{NewTemplate, Template, TemplateFormat, TemplatePatch};
