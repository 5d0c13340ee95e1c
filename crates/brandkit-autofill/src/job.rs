//! Submit-then-poll helper for the vendor's asynchronous jobs.

use std::sync::Arc;
use std::time::Duration;

use brandkit_core::{truncated_body, CancelToken};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::AutofillError;
use crate::token::TokenCache;
use crate::types::{JobEnvelope, JobStatus, PolledJob};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize)]
struct SubmittedJob {
    job: JobRef,
}

#[derive(Debug, Deserialize)]
struct JobRef {
    id: String,
}

#[derive(Clone)]
pub struct JobPoller {
    http: Client,
    base_url: String,
    tokens: Arc<TokenCache>,
    interval: Duration,
}

impl JobPoller {
    #[must_use]
    pub fn new(http: Client, base_url: &str, tokens: Arc<TokenCache>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn tokens(&self) -> &Arc<TokenCache> {
        &self.tokens
    }

    /// Send `request`, then poll `{base}/{endpoint}/{id}` until the job
    /// reaches a terminal status.
    ///
    /// The first poll happens right after submission, so a job always sees
    /// at least one GET. The wait between polls is raced against `cancel`.
    ///
    /// # Errors
    ///
    /// - [`AutofillError::UnexpectedStatus`] on a non-2xx submit or poll
    /// - [`AutofillError::JobFailed`] when the job ends in `failed`
    /// - [`AutofillError::MissingResult`] when `success` carries no payload
    /// - [`AutofillError::Task`] with `Cancelled` if `cancel` trips
    pub async fn submit_and_wait<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
        cancel: &CancelToken,
    ) -> Result<R, AutofillError> {
        let submit_url = format!("{}/{endpoint}", self.base_url);
        let submitted: SubmittedJob = cancel
            .run(async {
                let token = self.tokens.access_token().await?;
                self.send_json(request.bearer_auth(token), &submit_url).await
            })
            .await?;
        let id = submitted.job.id;
        tracing::debug!(endpoint, job = %id, "submitted remote job");

        let poll_url = format!("{}/{endpoint}/{id}", self.base_url);
        let mut polls = 0u32;
        loop {
            let envelope: JobEnvelope<R> = cancel
                .run(async {
                    let token = self.tokens.access_token().await?;
                    self.send_json(self.http.get(&poll_url).bearer_auth(token), &poll_url)
                        .await
                })
                .await?;
            polls += 1;
            let PolledJob {
                status,
                result,
                error,
                ..
            } = envelope.job;

            match status {
                JobStatus::Success => {
                    tracing::debug!(endpoint, job = %id, polls, "remote job succeeded");
                    return result.ok_or(AutofillError::MissingResult { id });
                }
                JobStatus::Failed => {
                    let message = error
                        .and_then(|e| e.message.or(e.code))
                        .unwrap_or_else(|| "no reason given".to_string());
                    tracing::warn!(endpoint, job = %id, polls, %message, "remote job failed");
                    return Err(AutofillError::JobFailed { id, message });
                }
                JobStatus::Pending => {
                    tracing::debug!(endpoint, job = %id, polls, "remote job pending");
                    let interval = self.interval;
                    cancel
                        .run(async {
                            tokio::time::sleep(interval).await;
                            Ok::<(), AutofillError>(())
                        })
                        .await?;
                }
            }
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> Result<T, AutofillError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AutofillError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
                body: truncated_body(&body),
            });
        }
        serde_json::from_str(&body).map_err(|source| AutofillError::Deserialize {
            context: url.to_string(),
            source,
        })
    }
}
