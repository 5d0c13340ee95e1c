//! Background job scheduler.
//!
//! Keeps the template-vendor access token fresh so request paths never
//! refresh it themselves under load.

use std::sync::Arc;

use brandkit_autofill::TokenCache;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Every 30 minutes, on the hour and half hour.
pub const TOKEN_REFRESH_CRON: &str = "0 0,30 * * * *";

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process. Dropping it shuts down all scheduled jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, the
/// job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(tokens: Arc<TokenCache>) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_token_refresh_job(&scheduler, tokens).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_token_refresh_job(
    scheduler: &JobScheduler,
    tokens: Arc<TokenCache>,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(TOKEN_REFRESH_CRON, move |_uuid, _lock| {
        let tokens = Arc::clone(&tokens);

        Box::pin(async move {
            // A failed refresh leaves the old token in place; the next run retries.
            match tokens.refresh().await {
                Ok(_) => tracing::debug!("scheduler: autofill token refresh complete"),
                Err(e) => tracing::error!(error = %e, "scheduler: autofill token refresh failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = TOKEN_REFRESH_CRON, "scheduler: registered token refresh job");
    Ok(())
}
