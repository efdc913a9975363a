//! Render templates: named bundles of default params.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::new_id;

/// Output format carried by a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateFormat {
    pub width: i32,
    pub height: i32,
    pub fps: i32,
}

/// A template of render defaults.
///
/// Defaults are snapshotted into a job's merged params at parse time, so
/// editing a template never reshapes a job that already exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    /// Opaque id with `tpl_` prefix
    pub id: String,

    #[serde(rename = "type")]
    pub template_type: String,

    /// Unique among non-deleted templates
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<TemplateFormat>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub params_schema: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Value>,

    pub created_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Fields needed to create a template row.
#[derive(Debug, Clone)]
pub struct NewTemplate {
    pub id: String,
    pub template_type: String,
    pub name: String,
    pub duration_ms: Option<i64>,
    pub format: Option<TemplateFormat>,
    pub params_schema: Option<Value>,
    pub defaults: Option<Value>,
}

impl NewTemplate {
    pub fn new(template_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: new_id("tpl"),
            template_type: template_type.into(),
            name: name.into(),
            duration_ms: None,
            format: None,
            params_schema: None,
            defaults: None,
        }
    }
}

/// Partial update for a template; `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct TemplatePatch {
    pub template_type: Option<String>,
    pub name: Option<String>,
    pub duration_ms: Option<i64>,
    pub format: Option<TemplateFormat>,
    pub params_schema: Option<Value>,
    pub defaults: Option<Value>,
}
