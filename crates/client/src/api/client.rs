//! Invaro API client facade

use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use super::types::{
    BatchAccepted, DocumentKind, Envelope, JobAccepted, JobId, JobState, UPLOAD_FIELD,
};
use crate::config::{ClientConfig, ClientConfigBuilder};
use crate::errors::InvaroError;
use crate::http::options::{merge_headers, RequestOptions};
use crate::http::HttpClient;

/// Async client for the Invaro document parsing API.
///
/// Uploads documents, submits parse jobs for statements and invoices (single
/// or batch), and optionally waits for jobs to finish. Cloning is cheap and
/// clones share one connection pool; the pool is released when the last clone
/// is dropped.
///
/// Waiting operations poll indefinitely; impose a deadline by wrapping the
/// future, e.g. `tokio::time::timeout(limit, client.process_statements_and_wait(id))`.
#[derive(Clone)]
pub struct InvaroClient {
    pub(crate) http: HttpClient,
    pub(crate) config: ClientConfig,
}

impl InvaroClient {
    /// Create a client from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`InvaroError::Config`] if the API key is empty or not usable
    /// as a header value, or if the HTTP transport cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, InvaroError> {
        if config.api_key.is_empty() {
            return Err(InvaroError::Config("API key is required".into()));
        }
        // Fail at construction, not on the first request.
        merge_headers(&config.api_key, reqwest::header::HeaderMap::new())?;

        let mut http = HttpClient::builder().timeout(config.timeout);
        if let Some(agent) = &config.user_agent {
            http = http.user_agent(agent.clone());
        }

        Ok(Self { http: http.build()?, config })
    }

    /// Create a client with default configuration and the given API key.
    ///
    /// # Errors
    ///
    /// See [`InvaroClient::new`].
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self, InvaroError> {
        Self::new(ClientConfig::new(api_key))
    }

    /// Create a client from `INVARO_*` environment variables.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`] and [`InvaroClient::new`].
    pub fn from_env() -> Result<Self, InvaroError> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Start building a client.
    pub fn builder() -> InvaroClientBuilder {
        InvaroClientBuilder::default()
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Execute a request against the service.
    ///
    /// Attaches the bearer token, sends through the transport, and decodes the
    /// JSON body. Success-range statuses return the decoded body; anything
    /// else is normalized into [`InvaroError::Service`].
    pub(crate) async fn execute<R: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<R, InvaroError> {
        if endpoint.is_empty() || !endpoint.starts_with('/') {
            return Err(InvaroError::Config(format!(
                "endpoint must be a non-empty /-prefixed path, got {endpoint:?}"
            )));
        }

        let url = format!("{}{}", self.config.base_url, endpoint);
        let headers = merge_headers(&self.config.api_key, options.headers)?;

        let mut request = self.http.request(method, &url).headers(headers);
        if let Some(body) = options.json {
            request = request.json(&body);
        }
        if let Some(form) = options.form {
            request = request.multipart(form);
        }

        let response = self.http.send(request).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(normalize_failure(status, response).await);
        }

        Ok(response.json().await?)
    }

    /// Upload documents for parsing.
    ///
    /// Each file is read as binary and attached as a repeated `files`
    /// multipart field with its original filename and an octet-stream content
    /// type, in one request.
    ///
    /// # Errors
    ///
    /// Returns [`InvaroError::File`] if a file cannot be read, otherwise the
    /// usual service/transport errors.
    #[instrument(skip(self, files))]
    pub async fn upload_documents<P>(&self, files: &[P]) -> Result<Value, InvaroError>
    where
        P: AsRef<Path>,
    {
        let mut form = Form::new();
        for file in files {
            let path = file.as_ref();
            let bytes = tokio::fs::read(path).await.map_err(|source| InvaroError::File {
                path: path.to_path_buf(),
                source,
            })?;
            let filename = path.file_name().map_or_else(
                || path.display().to_string(),
                |name| name.to_string_lossy().into_owned(),
            );
            let part = Part::bytes(bytes).file_name(filename).mime_str("application/octet-stream")?;
            form = form.part(UPLOAD_FIELD, part);
        }

        info!(count = files.len(), "uploading documents");
        let envelope: Envelope<Value> =
            self.execute(Method::POST, "/parse/upload", RequestOptions::form(form)).await?;
        Ok(envelope.into_inner())
    }

    /// Submit a statement for parsing; returns the accepted job immediately.
    #[instrument(skip(self), fields(document_id = %document_id))]
    pub async fn process_statements(&self, document_id: &str) -> Result<JobAccepted, InvaroError> {
        self.submit(DocumentKind::Statement, document_id).await
    }

    /// Submit a statement and poll until it completes.
    ///
    /// # Errors
    ///
    /// Returns [`InvaroError::JobFailed`] if the job reaches `failed`.
    #[instrument(skip(self), fields(document_id = %document_id))]
    pub async fn process_statements_and_wait(
        &self,
        document_id: &str,
    ) -> Result<JobState, InvaroError> {
        let accepted = self.submit(DocumentKind::Statement, document_id).await?;
        self.poll_job(DocumentKind::Statement, &accepted.job_id).await
    }

    /// Submit a batch of statements; returns the accepted jobs immediately,
    /// with job identifiers in submission order.
    #[instrument(skip(self, document_ids))]
    pub async fn process_statements_batch<S>(
        &self,
        document_ids: &[S],
    ) -> Result<BatchAccepted, InvaroError>
    where
        S: AsRef<str>,
    {
        self.submit_batch(DocumentKind::Statement, document_ids).await
    }

    /// Submit a batch of statements and poll every job until it completes.
    ///
    /// Results come back in submission order regardless of completion order.
    ///
    /// # Errors
    ///
    /// The first job failure propagates and outstanding polls are dropped.
    #[instrument(skip(self, document_ids))]
    pub async fn process_statements_batch_and_wait<S>(
        &self,
        document_ids: &[S],
    ) -> Result<Vec<JobState>, InvaroError>
    where
        S: AsRef<str>,
    {
        let accepted = self.submit_batch(DocumentKind::Statement, document_ids).await?;
        self.poll_batch(DocumentKind::Statement, &accepted.job_ids).await
    }

    /// Fetch the current status of a statement job. One request, no polling.
    #[instrument(skip(self, job_id))]
    pub async fn get_statement_status(
        &self,
        job_id: impl Into<JobId>,
    ) -> Result<JobState, InvaroError> {
        self.job_status(DocumentKind::Statement, &job_id.into()).await
    }

    /// Submit an invoice for parsing; returns the accepted job immediately.
    #[instrument(skip(self), fields(document_id = %document_id))]
    pub async fn process_invoices(&self, document_id: &str) -> Result<JobAccepted, InvaroError> {
        self.submit(DocumentKind::Invoice, document_id).await
    }

    /// Submit an invoice and poll until it completes.
    ///
    /// # Errors
    ///
    /// Returns [`InvaroError::JobFailed`] if the job reaches `failed`.
    #[instrument(skip(self), fields(document_id = %document_id))]
    pub async fn process_invoices_and_wait(
        &self,
        document_id: &str,
    ) -> Result<JobState, InvaroError> {
        let accepted = self.submit(DocumentKind::Invoice, document_id).await?;
        self.poll_job(DocumentKind::Invoice, &accepted.job_id).await
    }

    /// Submit a batch of invoices; returns the accepted jobs immediately,
    /// with job identifiers in submission order.
    #[instrument(skip(self, document_ids))]
    pub async fn process_invoices_batch<S>(
        &self,
        document_ids: &[S],
    ) -> Result<BatchAccepted, InvaroError>
    where
        S: AsRef<str>,
    {
        self.submit_batch(DocumentKind::Invoice, document_ids).await
    }

    /// Submit a batch of invoices and poll every job until it completes.
    ///
    /// Results come back in submission order regardless of completion order.
    ///
    /// # Errors
    ///
    /// The first job failure propagates and outstanding polls are dropped.
    #[instrument(skip(self, document_ids))]
    pub async fn process_invoices_batch_and_wait<S>(
        &self,
        document_ids: &[S],
    ) -> Result<Vec<JobState>, InvaroError>
    where
        S: AsRef<str>,
    {
        let accepted = self.submit_batch(DocumentKind::Invoice, document_ids).await?;
        self.poll_batch(DocumentKind::Invoice, &accepted.job_ids).await
    }

    /// Fetch the current status of an invoice job. One request, no polling.
    #[instrument(skip(self, job_id))]
    pub async fn get_invoice_status(
        &self,
        job_id: impl Into<JobId>,
    ) -> Result<JobState, InvaroError> {
        self.job_status(DocumentKind::Invoice, &job_id.into()).await
    }

    async fn submit(
        &self,
        kind: DocumentKind,
        document_id: &str,
    ) -> Result<JobAccepted, InvaroError> {
        let body = json!({ "document_id": document_id });
        let envelope: Envelope<JobAccepted> =
            self.execute(Method::POST, kind.submit_path(), RequestOptions::json(body)).await?;
        let accepted = envelope.into_inner();
        debug!(%kind, job_id = %accepted.job_id, "job accepted");
        Ok(accepted)
    }

    async fn submit_batch<S>(
        &self,
        kind: DocumentKind,
        document_ids: &[S],
    ) -> Result<BatchAccepted, InvaroError>
    where
        S: AsRef<str>,
    {
        let files: Vec<Value> = document_ids
            .iter()
            .map(|id| json!({ "document_id": id.as_ref() }))
            .collect();
        let body = json!({ "files": files });

        let envelope: Envelope<BatchAccepted> =
            self.execute(Method::POST, kind.batch_path(), RequestOptions::json(body)).await?;
        let accepted = envelope.into_inner();
        debug!(%kind, jobs = accepted.job_ids.len(), "batch accepted");
        Ok(accepted)
    }

    async fn job_status(
        &self,
        kind: DocumentKind,
        job_id: &JobId,
    ) -> Result<JobState, InvaroError> {
        let envelope: Envelope<JobState> = self
            .execute(Method::GET, &kind.status_path(job_id), RequestOptions::default())
            .await?;
        Ok(envelope.into_inner())
    }
}

/// Normalize a non-success response into [`InvaroError::Service`].
///
/// If the body is JSON with an `error` field, that field's value is the
/// message (string values as-is, anything else rendered as JSON); otherwise
/// the raw body text is the message.
async fn normalize_failure(status: StatusCode, response: Response) -> InvaroError {
    let body = response.text().await.unwrap_or_default();

    let message = match serde_json::from_str::<Value>(&body) {
        Ok(decoded) => match decoded.get("error") {
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => body,
        },
        Err(_) => body,
    };

    InvaroError::Service { status: status.as_u16(), message }
}

/// Builder for [`InvaroClient`].
#[derive(Debug, Default)]
pub struct InvaroClientBuilder {
    config: ClientConfigBuilder,
}

impl InvaroClientBuilder {
    /// Set the API key (required).
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config = self.config.api_key(api_key);
        self
    }

    /// Override the service base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config = self.config.base_url(base_url);
        self
    }

    /// Set the delay between job-status polls.
    pub fn poll_interval(mut self, interval: std::time::Duration) -> Self {
        self.config = self.config.poll_interval(interval);
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Cap the number of concurrent polls in batch waits.
    pub fn max_concurrent_polls(mut self, cap: usize) -> Self {
        self.config = self.config.max_concurrent_polls(cap);
        self
    }

    /// Set the `User-Agent` header value.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config = self.config.user_agent(agent);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`InvaroError::Config`] if required fields are missing.
    pub fn build(self) -> Result<InvaroClient, InvaroError> {
        InvaroClient::new(self.config.build()?)
    }
}
