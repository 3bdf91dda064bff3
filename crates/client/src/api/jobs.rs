//! Job polling and batch fan-out
//!
//! The poll loop is unbounded by design: it re-queries the status endpoint at
//! the configured interval until the job reaches a terminal state. Every
//! network call and sleep is an `.await`, so callers impose deadlines by
//! wrapping the future (`tokio::time::timeout`) or selecting against a
//! cancellation token; dropping the future cancels cleanly between iterations.

use futures::future::try_join_all;
use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::Method;
use tracing::{debug, warn};

use super::client::InvaroClient;
use super::types::{DocumentKind, Envelope, JobId, JobState, JobStatus};
use crate::errors::InvaroError;
use crate::http::options::RequestOptions;

impl InvaroClient {
    /// Poll a job until it reaches a terminal state.
    ///
    /// Both response shapes are normalized before the status is read; any
    /// status other than `completed`/`failed` means wait another interval.
    pub(crate) async fn poll_job(
        &self,
        kind: DocumentKind,
        job_id: &JobId,
    ) -> Result<JobState, InvaroError> {
        let endpoint = kind.status_path(job_id);

        loop {
            let envelope: Envelope<JobState> =
                self.execute(Method::GET, &endpoint, RequestOptions::default()).await?;
            let state = envelope.into_inner();

            match state.status {
                JobStatus::Completed => {
                    debug!(%kind, %job_id, "job completed");
                    return Ok(state);
                }
                JobStatus::Failed => {
                    warn!(%kind, %job_id, "job failed");
                    return Err(InvaroError::JobFailed { job_id: job_id.clone() });
                }
                JobStatus::Pending => {
                    debug!(%kind, %job_id, interval = ?self.config.poll_interval, "job still running");
                    tokio::time::sleep(self.config.poll_interval).await;
                }
            }
        }
    }

    /// Poll a set of jobs concurrently and collect terminal results in the
    /// order of `job_ids`, regardless of completion order.
    ///
    /// Fail-fast: the first error propagates and outstanding polls are
    /// dropped; completed sibling results are discarded with them.
    pub(crate) async fn poll_batch(
        &self,
        kind: DocumentKind,
        job_ids: &[JobId],
    ) -> Result<Vec<JobState>, InvaroError> {
        debug!(%kind, jobs = job_ids.len(), "waiting for batch");

        match self.config.max_concurrent_polls {
            Some(cap) => {
                // `buffered` keeps at most `cap` polls in flight and still
                // yields outputs in input order.
                stream::iter(job_ids.iter().map(|id| self.poll_job(kind, id)))
                    .buffered(cap.max(1))
                    .try_collect()
                    .await
            }
            None => try_join_all(job_ids.iter().map(|id| self.poll_job(kind, id))).await,
        }
    }
}
