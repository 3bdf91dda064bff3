//! Invaro parse API client
//!
//! The public surface for the parse service: upload, submit single/batch,
//! poll to completion, and status fetch, for statements and invoices.
//!
//! # Architecture
//!
//! - `client` holds the facade and the request executor (auth header merge,
//!   dispatch, error normalization)
//! - `jobs` holds the polling state machine and batch fan-out
//! - `types` holds the wire types, including the dual response-shape
//!   normalization

pub mod client;
mod jobs;
pub mod types;

pub use client::{InvaroClient, InvaroClientBuilder};
pub use types::{BatchAccepted, DocumentKind, JobAccepted, JobId, JobState, JobStatus};
