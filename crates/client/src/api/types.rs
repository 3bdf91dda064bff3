//! Wire types for the Invaro parse API
//!
//! The service has two historical response shapes: `{ "data": { ... } }` and
//! the inner object directly. [`Envelope`] is the single normalization point;
//! everything downstream works on the inner object.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Multipart field name used by the upload endpoint, repeated per file.
pub(crate) const UPLOAD_FIELD: &str = "files";

/// Response envelope covering both service response shapes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Envelope<T> {
    /// Current shape: payload wrapped under a `data` key.
    Wrapped { data: T },
    /// Legacy shape: the payload is the whole response.
    Bare(T),
}

impl<T> Envelope<T> {
    /// Unwrap to the inner payload regardless of shape.
    pub fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } => data,
            Self::Bare(inner) => inner,
        }
    }
}

/// Opaque job identifier returned when an asynchronous operation is accepted.
///
/// The service returns either a string or a number; both deserialize here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobId {
    /// String identifier.
    Text(String),
    /// Numeric identifier.
    Number(u64),
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(id) => f.write_str(id),
            Self::Number(id) => write!(f, "{id}"),
        }
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_owned())
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

impl From<u64> for JobId {
    fn from(id: u64) -> Self {
        Self::Number(id)
    }
}

/// Status of an asynchronous parse job.
///
/// The service's non-terminal label is not guaranteed; any status other than
/// `completed` or `failed` deserializes to [`JobStatus::Pending`] and means
/// keep waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Terminal success.
    Completed,
    /// Terminal failure.
    Failed,
    /// Any non-terminal status.
    #[serde(other)]
    Pending,
}

impl JobStatus {
    /// Whether polling stops at this status.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Normalized status payload for a job, terminal or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobState {
    /// Current job status.
    pub status: JobStatus,
    /// Remaining fields of the status payload (parse results, timestamps, ...).
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Accepted-job payload returned by a single submit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobAccepted {
    /// Identifier to poll for completion.
    pub job_id: JobId,
    /// Remaining fields of the accepted payload.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Accepted-batch payload returned by a batch submit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchAccepted {
    /// One job identifier per submitted document, in submission order.
    pub job_ids: Vec<JobId>,
    /// Remaining fields of the accepted payload.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The two document kinds the parse API distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Financial statements.
    Statement,
    /// Invoices.
    Invoice,
}

impl DocumentKind {
    /// Endpoint for submitting a single document.
    pub(crate) const fn submit_path(self) -> &'static str {
        match self {
            Self::Statement => "/parse/statements",
            Self::Invoice => "/parse/invoices",
        }
    }

    /// Endpoint for submitting a batch.
    pub(crate) const fn batch_path(self) -> &'static str {
        match self {
            Self::Statement => "/parse/statements/batch",
            Self::Invoice => "/parse/invoices/batch",
        }
    }

    /// Endpoint for fetching a job's status.
    pub(crate) fn status_path(self, job_id: &JobId) -> String {
        format!("{}/{}", self.submit_path(), job_id)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Statement => f.write_str("statement"),
            Self::Invoice => f.write_str("invoice"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn envelope_unwraps_data_key() {
        let payload = json!({"data": {"status": "completed", "x": 1}});
        let state: JobState =
            serde_json::from_value::<Envelope<JobState>>(payload).unwrap().into_inner();
        assert_eq!(state.status, JobStatus::Completed);
        assert_eq!(state.details["x"], 1);
    }

    #[test]
    fn envelope_accepts_bare_payload() {
        let payload = json!({"status": "completed", "x": 1});
        let state: JobState =
            serde_json::from_value::<Envelope<JobState>>(payload).unwrap().into_inner();
        assert_eq!(state.status, JobStatus::Completed);
        assert_eq!(state.details["x"], 1);
    }

    #[test]
    fn unknown_status_labels_are_non_terminal() {
        for label in ["pending", "processing", "queued", "running"] {
            let state: JobState =
                serde_json::from_value(json!({"status": label})).unwrap();
            assert_eq!(state.status, JobStatus::Pending);
            assert!(!state.status.is_terminal());
        }
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn job_id_accepts_string_or_number() {
        let text: JobId = serde_json::from_value(json!("job-42")).unwrap();
        assert_eq!(text, JobId::from("job-42"));
        assert_eq!(text.to_string(), "job-42");

        let number: JobId = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(number, JobId::from(42u64));
        assert_eq!(number.to_string(), "42");
    }

    #[test]
    fn batch_accepted_preserves_job_id_order() {
        let accepted: BatchAccepted =
            serde_json::from_value(json!({"job_ids": ["j1", "j2", "j3"], "queued": 3})).unwrap();
        let ids: Vec<String> = accepted.job_ids.iter().map(ToString::to_string).collect();
        assert_eq!(ids, ["j1", "j2", "j3"]);
        assert_eq!(accepted.extra["queued"], 3);
    }

    #[test]
    fn status_paths_substitute_job_id() {
        let id = JobId::from("j-9");
        assert_eq!(DocumentKind::Statement.status_path(&id), "/parse/statements/j-9");
        assert_eq!(DocumentKind::Invoice.status_path(&id), "/parse/invoices/j-9");
        assert_eq!(DocumentKind::Statement.batch_path(), "/parse/statements/batch");
        assert_eq!(DocumentKind::Invoice.batch_path(), "/parse/invoices/batch");
    }
}
