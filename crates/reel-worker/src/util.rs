//! Small pure helpers shared across the pipeline.

use serde_json::Value;

/// Clean an input name before it becomes a filename. Path separators and
/// spaces become underscores, `..` is stripped, and an empty result falls
/// back to `input`.
pub fn sanitize_filename(s: &str) -> String {
    let s = s
        .trim()
        .replace("..", "")
        .replace(['/', '\\', ' '], "_");
    if s.is_empty() {
        "input".to_string()
    } else {
        s
    }
}

/// File extension (with dot) for the mimes the renderer consumes;
/// unknown mimes get none.
pub fn ext_from_mime(mime: &str) -> &'static str {
    match mime.trim().to_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => ".jpg",
        "image/png" => ".png",
        "audio/wav" | "audio/x-wav" => ".wav",
        "audio/mpeg" | "audio/mp3" => ".mp3",
        "video/mp4" => ".mp4",
        "text/vtt" => ".vtt",
        _ => "",
    }
}

/// Flag-style truthiness: `true`, numeric 1, or one of
/// "1"/"true"/"yes"/"on" (trimmed, case-insensitive).
pub fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => {
            let s = s.trim().to_lowercase();
            matches!(s.as_str(), "1" | "true" | "yes" | "on")
        }
        _ => false,
    }
}

/// Truncate to at most `max` chars on a char boundary.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("avatar image"), "avatar_image");
        assert_eq!(sanitize_filename("../../etc/passwd"), "__etc_passwd");
        assert_eq!(sanitize_filename("a\\b/c"), "a_b_c");
        assert_eq!(sanitize_filename("  "), "input");
        assert_eq!(sanitize_filename(".."), "input");
    }

    #[test]
    fn test_ext_from_mime() {
        assert_eq!(ext_from_mime("image/jpeg"), ".jpg");
        assert_eq!(ext_from_mime(" IMAGE/PNG "), ".png");
        assert_eq!(ext_from_mime("audio/x-wav"), ".wav");
        assert_eq!(ext_from_mime("audio/mpeg"), ".mp3");
        assert_eq!(ext_from_mime("video/mp4"), ".mp4");
        assert_eq!(ext_from_mime("text/vtt"), ".vtt");
        assert_eq!(ext_from_mime("application/pdf"), "");
    }

    #[test]
    fn test_is_truthy() {
        for v in [json!(true), json!(1), json!(1.0), json!("1"), json!("true"), json!(" YES "), json!("on")] {
            assert!(is_truthy(&v), "{v} should be truthy");
        }
        for v in [json!(false), json!(0), json!(2), json!("no"), json!("off"), json!(""), json!(null), json!([1])] {
            assert!(!is_truthy(&v), "{v} should be falsy");
        }
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abc", 5), "abc");
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        // Multi-byte chars are counted, not sliced.
        assert_eq!(truncate_chars("ééé", 2), "éé");
    }
}
