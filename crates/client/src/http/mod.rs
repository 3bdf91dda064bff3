//! HTTP transport layer
//!
//! Thin wrapper around `reqwest` providing timeout and user-agent
//! configuration, plus the request-option types the executor consumes.
//! Nothing here retries: every failure propagates to the caller exactly once.

pub mod client;
pub(crate) mod options;

pub use client::{HttpClient, HttpClientBuilder};
