//! Wire types for the renderer endpoints.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Output block of the legacy (v0) spec.
#[derive(Debug, Clone, Serialize)]
pub struct OutputKeysV0 {
    pub video_object_key: String,
    pub thumb_object_key: String,
}

/// Legacy render spec: flat params, fixed two outputs.
#[derive(Debug, Clone, Serialize)]
pub struct RenderSpecV0 {
    pub job_id: String,
    pub params: Value,
    pub output: OutputKeysV0,
}

/// Output block of the enveloped (v1) spec. The captions key is present
/// only when captions are requested.
#[derive(Debug, Clone, Serialize)]
pub struct OutputKeysV1 {
    pub video_object_key: String,
    pub thumb_object_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captions_object_key: Option<String>,
}

/// Enveloped render spec: template, materialized input paths, merged
/// params.
#[derive(Debug, Clone, Serialize)]
pub struct RenderSpecV1 {
    pub job_id: String,
    pub template_id: String,
    pub inputs: BTreeMap<String, String>,
    pub params: Value,
    pub output: OutputKeysV1,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_v0_spec_shape() {
        let spec = RenderSpecV0 {
            job_id: "job_1".into(),
            params: json!({"text": "HELLO"}),
            output: OutputKeysV0 {
                video_object_key: "renders/job_1/hello.mp4".into(),
                thumb_object_key: "renders/job_1/hello.jpg".into(),
            },
        };

        let v = serde_json::to_value(&spec).unwrap();
        assert_eq!(v["params"]["text"], "HELLO");
        assert_eq!(v["output"]["video_object_key"], "renders/job_1/hello.mp4");
        assert!(v["output"].get("captions_object_key").is_none());
    }

    #[test]
    fn test_v1_spec_omits_captions_when_disabled() {
        let spec = RenderSpecV1 {
            job_id: "job_2".into(),
            template_id: "tpl_9".into(),
            inputs: BTreeMap::from([(
                "avatar_image".to_string(),
                "/data/jobs/job_2/inputs/avatar_image.png".to_string(),
            )]),
            params: json!({"text": "GALA"}),
            output: OutputKeysV1 {
                video_object_key: "renders/job_2/hello.mp4".into(),
                thumb_object_key: "renders/job_2/hello.jpg".into(),
                captions_object_key: None,
            },
        };

        let v = serde_json::to_value(&spec).unwrap();
        assert_eq!(v["template_id"], "tpl_9");
        assert!(v["output"].as_object().unwrap().get("captions_object_key").is_none());
    }

    #[test]
    fn test_v1_spec_includes_captions_when_enabled() {
        let spec = RenderSpecV1 {
            job_id: "job_3".into(),
            template_id: "tpl_9".into(),
            inputs: BTreeMap::new(),
            params: json!({"text": "GALA", "captions": true}),
            output: OutputKeysV1 {
                video_object_key: "renders/job_3/hello.mp4".into(),
                thumb_object_key: "renders/job_3/hello.jpg".into(),
                captions_object_key: Some("renders/job_3/captions.vtt".into()),
            },
        };

        let v = serde_json::to_value(&spec).unwrap();
        assert_eq!(v["output"]["captions_object_key"], "renders/job_3/captions.vtt");
    }
}
