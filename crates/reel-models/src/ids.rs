//! Opaque prefixed identifiers.

use uuid::Uuid;

/// Generate a new opaque id with a type prefix, e.g. `job_4f1c…`.
pub fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_has_prefix() {
        let id = new_id("job");
        assert!(id.starts_with("job_"));
        assert_eq!(id.len(), "job_".len() + 32);
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(new_id("ast"), new_id("ast"));
    }
}
