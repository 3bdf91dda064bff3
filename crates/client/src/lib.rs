//! # Invaro Client
//!
//! Async client for the Invaro document parsing API: upload files, submit
//! parse jobs for financial statements and invoices (single or batch), and
//! optionally poll until jobs complete.
//!
//! ```no_run
//! use invaro_client::InvaroClient;
//!
//! # async fn run() -> Result<(), invaro_client::InvaroError> {
//! let client = InvaroClient::builder().api_key("sk-...").build()?;
//!
//! let uploaded = client.upload_documents(&["statement.pdf"]).await?;
//! let document_id = uploaded["documents"][0]["id"].as_str().unwrap_or_default();
//!
//! let result = client.process_statements_and_wait(document_id).await?;
//! println!("parsed: {:?}", result.details);
//! # Ok(())
//! # }
//! ```
//!
//! Waiting operations poll indefinitely; wrap them in `tokio::time::timeout`
//! to impose a deadline. Transport faults (connection errors, undecodable
//! bodies) pass through unwrapped as [`InvaroError::Transport`].

pub mod api;
pub mod config;
pub mod errors;
pub mod http;

// Re-export commonly used items
pub use api::{
    BatchAccepted, DocumentKind, InvaroClient, InvaroClientBuilder, JobAccepted, JobId, JobState,
    JobStatus,
};
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_BASE_URL};
pub use errors::InvaroError;
pub use http::{HttpClient, HttpClientBuilder};
