//! Job params parsing and template resolution.
//!
//! Two payload shapes are recognized. A flat object is the legacy (v0)
//! shape and becomes the merged params as-is. An object carrying a
//! non-empty `template_id` is the enveloped (v1) shape: template defaults
//! are fetched, overlaid with the job's own params (job wins), and the
//! result is snapshotted for the life of the job.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use reel_catalog::TemplatesRepo;

use crate::error::{WorkerError, WorkerResult};
use crate::util::is_truthy;

/// The required input of every enveloped job.
const AVATAR_INPUT: &str = "avatar_image_asset_id";

/// Canonical form of a job's params after parsing and template merge.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedJob {
    pub template_id: Option<String>,
    /// Input name -> asset id (enveloped jobs only)
    pub inputs: BTreeMap<String, String>,
    /// The job's own params (enveloped jobs only)
    pub params: Map<String, Value>,
    /// defaults overlaid by params; what the renderer sees
    pub merged_params: Map<String, Value>,
    pub has_envelope: bool,
}

impl ParsedJob {
    /// Envelope presence alone selects the v1 renderer contract.
    pub fn used_v1(&self) -> bool {
        self.has_envelope
    }

    pub fn captions_enabled(&self) -> bool {
        self.merged_params.get("captions").is_some_and(is_truthy)
    }

    /// Enveloped inputs are asset ids and must become local paths before
    /// the render call.
    pub fn needs_input_materialization(&self) -> bool {
        self.has_envelope
    }
}

/// Parser over the raw params payload stored on the job row.
#[derive(Clone)]
pub struct JobParser {
    templates: TemplatesRepo,
}

impl JobParser {
    pub fn new(templates: TemplatesRepo) -> Self {
        Self { templates }
    }

    /// Parse a raw params payload, consulting the catalog for template
    /// defaults when the payload is enveloped.
    pub async fn parse(&self, raw: &Value) -> WorkerResult<ParsedJob> {
        let raw = raw
            .as_object()
            .ok_or_else(|| WorkerError::validation("invalid params_json: not an object"))?;

        match envelope_template_id(raw) {
            Some(template_id) => {
                let defaults = self
                    .templates
                    .defaults(&template_id)
                    .await?
                    .ok_or_else(|| {
                        WorkerError::validation(format!("template not found: {template_id}"))
                    })?;
                assemble_envelope(raw, template_id, &defaults)
            }
            None => assemble_legacy(raw),
        }
    }
}

/// Non-empty `template_id` marks the enveloped shape.
fn envelope_template_id(raw: &Map<String, Value>) -> Option<String> {
    raw.get("template_id")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Build a `ParsedJob` from an enveloped payload and resolved defaults.
/// Pure; the catalog round-trip lives in `JobParser::parse`.
pub fn assemble_envelope(
    raw: &Map<String, Value>,
    template_id: String,
    defaults: &Value,
) -> WorkerResult<ParsedJob> {
    let params = raw
        .get("params")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let mut inputs = BTreeMap::new();
    if let Some(raw_inputs) = raw.get("inputs").and_then(Value::as_object) {
        for (name, value) in raw_inputs {
            if let Some(s) = value.as_str() {
                let s = s.trim();
                if !s.is_empty() {
                    inputs.insert(name.clone(), s.to_string());
                }
            }
        }
    }

    let defaults = defaults.as_object().cloned().unwrap_or_default();
    let merged_params = merge_params(&defaults, &params);

    if !has_valid_text(&merged_params) {
        return Err(WorkerError::validation(
            "params.text is required (after defaults merge)",
        ));
    }

    if !inputs.contains_key(AVATAR_INPUT) {
        return Err(WorkerError::validation(format!(
            "inputs.{AVATAR_INPUT} is required"
        )));
    }

    Ok(ParsedJob {
        template_id: Some(template_id),
        inputs,
        params,
        merged_params,
        has_envelope: true,
    })
}

/// Build a `ParsedJob` from a flat legacy payload.
pub fn assemble_legacy(raw: &Map<String, Value>) -> WorkerResult<ParsedJob> {
    if !has_valid_text(raw) {
        return Err(WorkerError::validation("params.text is required"));
    }

    Ok(ParsedJob {
        template_id: None,
        inputs: BTreeMap::new(),
        params: Map::new(),
        merged_params: raw.clone(),
        has_envelope: false,
    })
}

/// defaults overlaid by the job's params; job-provided keys win.
fn merge_params(defaults: &Map<String, Value>, params: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = defaults.clone();
    for (k, v) in params {
        merged.insert(k.clone(), v.clone());
    }
    merged
}

fn has_valid_text(params: &Map<String, Value>) -> bool {
    params
        .get("text")
        .and_then(Value::as_str)
        .is_some_and(|t| !t.trim().is_empty())
}
