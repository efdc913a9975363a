//! Render jobs and the job status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::ids::new_id;

/// Lifecycle status of a job.
///
/// A job leaves `Queued` at most once; `Running` transitions only to
/// `Done` or `Failed`, both terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Waiting in the queue for a worker
    #[default]
    Queued,
    /// Leased by a worker and being processed
    Running,
    /// Completed with outputs committed
    Done,
    /// Terminally failed
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "QUEUED",
            JobStatus::Running => "RUNNING",
            JobStatus::Done => "DONE",
            JobStatus::Failed => "FAILED",
        }
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for JobStatus {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "QUEUED" => Ok(JobStatus::Queued),
            "RUNNING" => Ok(JobStatus::Running),
            "DONE" => Ok(JobStatus::Done),
            "FAILED" => Ok(JobStatus::Failed),
            other => Err(format!("unknown job status: {other}")),
        }
    }
}

/// A unit of render work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Opaque id with `job_` prefix
    pub id: String,

    /// Optional display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Lifecycle status
    pub status: JobStatus,

    /// Raw params payload as submitted (opaque JSON)
    pub params: Value,

    pub created_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    /// Failure message, truncated to 2000 chars when persisted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,
}

/// Fields needed to create a job row.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub id: String,
    pub name: Option<String>,
    pub params: Value,
}

impl NewJob {
    pub fn new(name: Option<String>, params: Value) -> Self {
        Self {
            id: new_id("job"),
            name: name.filter(|n| !n.trim().is_empty()),
            params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_round_trip() {
        for s in ["QUEUED", "RUNNING", "DONE", "FAILED"] {
            let status = JobStatus::try_from(s).unwrap();
            assert_eq!(status.as_str(), s);
        }
        assert!(JobStatus::try_from("PENDING").is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Done.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn test_status_serde_uses_screaming_case() {
        let s = serde_json::to_string(&JobStatus::Queued).unwrap();
        assert_eq!(s, "\"QUEUED\"");
    }

    #[test]
    fn test_new_job_blank_name_dropped() {
        let j = NewJob::new(Some("  ".into()), json!({"text": "hi"}));
        assert!(j.name.is_none());
        assert!(j.id.starts_with("job_"));
    }
}
