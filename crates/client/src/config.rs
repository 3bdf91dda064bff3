//! Client configuration
//!
//! Configuration is set once at construction and immutable for the client's
//! lifetime. It can be assembled with the builder or loaded from environment
//! variables:
//!
//! - `INVARO_API_KEY`: API key (required)
//! - `INVARO_BASE_URL`: service base URL
//! - `INVARO_POLL_INTERVAL_SECS`: delay between job-status polls, in seconds
//! - `INVARO_TIMEOUT_SECS`: per-request timeout, in seconds

use std::env;
use std::time::Duration;

use crate::errors::InvaroError;

/// Default base URL for the Invaro parse API.
pub const DEFAULT_BASE_URL: &str = "https://api.invaro.ai/api/v1";

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`InvaroClient`](crate::InvaroClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API key sent as `Authorization: Bearer <api_key>` on every request.
    pub api_key: String,
    /// Base URL the endpoint paths are appended to.
    pub base_url: String,
    /// Delay between consecutive job-status polls.
    pub poll_interval: Duration,
    /// Per-request timeout applied by the HTTP transport.
    pub timeout: Duration,
    /// Cap on concurrent polls during batch waits; `None` means unbounded.
    pub max_concurrent_polls: Option<usize>,
    /// Optional `User-Agent` header value.
    pub user_agent: Option<String>,
}

impl ClientConfig {
    /// Create a configuration with the given API key and defaults elsewhere.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            max_concurrent_polls: None,
            user_agent: None,
        }
    }

    /// Start building a configuration.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Load configuration from `INVARO_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`InvaroError::Config`] if `INVARO_API_KEY` is unset or a
    /// numeric variable fails to parse.
    pub fn from_env() -> Result<Self, InvaroError> {
        let api_key = env::var("INVARO_API_KEY")
            .map_err(|_| InvaroError::Config("INVARO_API_KEY is not set".into()))?;

        let mut builder = Self::builder().api_key(api_key);

        if let Ok(base_url) = env::var("INVARO_BASE_URL") {
            builder = builder.base_url(base_url);
        }
        if let Ok(raw) = env::var("INVARO_POLL_INTERVAL_SECS") {
            builder = builder.poll_interval(Duration::from_secs(parse_secs(
                "INVARO_POLL_INTERVAL_SECS",
                &raw,
            )?));
        }
        if let Ok(raw) = env::var("INVARO_TIMEOUT_SECS") {
            builder = builder.timeout(Duration::from_secs(parse_secs("INVARO_TIMEOUT_SECS", &raw)?));
        }

        let config = builder.build()?;
        tracing::info!("configuration loaded from environment variables");
        Ok(config)
    }
}

fn parse_secs(name: &str, raw: &str) -> Result<u64, InvaroError> {
    raw.parse()
        .map_err(|_| InvaroError::Config(format!("{name} must be a number of seconds, got {raw:?}")))
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    poll_interval: Option<Duration>,
    timeout: Option<Duration>,
    max_concurrent_polls: Option<usize>,
    user_agent: Option<String>,
}

impl ClientConfigBuilder {
    /// Set the API key (required).
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the base URL. A trailing slash is trimmed so endpoint paths
    /// concatenate cleanly.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the delay between job-status polls.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Cap the number of concurrent polls in batch waits.
    pub fn max_concurrent_polls(mut self, cap: usize) -> Self {
        self.max_concurrent_polls = Some(cap.max(1));
        self
    }

    /// Set the `User-Agent` header value.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`InvaroError::Config`] if the API key is missing or empty.
    pub fn build(self) -> Result<ClientConfig, InvaroError> {
        let api_key = self
            .api_key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| InvaroError::Config("API key is required".into()))?;

        let base_url = self
            .base_url
            .map_or_else(|| DEFAULT_BASE_URL.to_string(), |url| url.trim_end_matches('/').to_string());

        Ok(ClientConfig {
            api_key,
            base_url,
            poll_interval: self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            max_concurrent_polls: self.max_concurrent_polls,
            user_agent: self.user_agent,
        })
    }
}
