//! Error types for the Invaro client
//!
//! Service failures and job failures are classified here; transport-level
//! faults (connection errors, malformed JSON bodies) are not wrapped and pass
//! through as [`InvaroError::Transport`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::api::types::JobId;

/// Errors surfaced by [`InvaroClient`](crate::InvaroClient) operations.
#[derive(Debug, Error)]
pub enum InvaroError {
    /// The service answered with a non-success HTTP status.
    ///
    /// The message is taken from the body's `error` field when present,
    /// otherwise from the raw body text.
    #[error("{status}: {message}")]
    Service {
        /// Numeric HTTP status code.
        status: u16,
        /// Normalized error message.
        message: String,
    },

    /// A polled job reached the terminal `failed` status.
    #[error("job {job_id} failed")]
    JobFailed {
        /// Identifier of the failed job.
        job_id: JobId,
    },

    /// Transport fault from the underlying HTTP client, passed through
    /// unwrapped (connection errors, timeouts, undecodable JSON).
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// A file destined for upload could not be read.
    #[error("failed to read {path}: {source}")]
    File {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Invalid client configuration (missing API key, bad env value, ...).
    #[error("configuration error: {0}")]
    Config(String),
}

impl InvaroError {
    /// HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Service { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
