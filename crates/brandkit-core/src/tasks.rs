//! Fan-out primitives: one-shot task handles, ordered gather, bounded retry.
//!
//! Every worker is raced against a [`CancelToken`], so tripping the token
//! stops outstanding work instead of leaving it running detached.

use std::future::Future;

use tokio::task::JoinHandle;

use crate::cancel::CancelToken;
use crate::error::TaskError;

/// One-shot handle to a spawned worker.
#[derive(Debug)]
pub struct Handle<T, E> {
    inner: JoinHandle<Result<T, E>>,
}

impl<T, E> Handle<T, E>
where
    E: From<TaskError>,
{
    /// Wait for the worker to produce its value or fail.
    ///
    /// # Errors
    ///
    /// Returns the worker's error, [`TaskError::Cancelled`] if its token
    /// tripped, or [`TaskError::Panicked`] if it panicked.
    pub async fn join(self) -> Result<T, E> {
        match self.inner.await {
            Ok(result) => result,
            Err(join_err) if join_err.is_cancelled() => Err(TaskError::Cancelled.into()),
            Err(join_err) => Err(TaskError::Panicked(join_err.to_string()).into()),
        }
    }
}

/// Start `fut` immediately on a fresh tokio task.
pub fn spawn<T, E, F>(cancel: &CancelToken, fut: F) -> Handle<T, E>
where
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: From<TaskError> + Send + 'static,
{
    let cancel = cancel.clone();
    Handle {
        inner: tokio::spawn(async move { cancel.run(fut).await }),
    }
}

/// Parallel map: one worker per item, all started before this returns.
pub fn spawn_list<I, T, E, F, Fut>(
    cancel: &CancelToken,
    items: impl IntoIterator<Item = I>,
    mut f: F,
) -> Vec<Handle<T, E>>
where
    F: FnMut(I) -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: From<TaskError> + Send + 'static,
{
    items.into_iter().map(|item| spawn(cancel, f(item))).collect()
}

/// Gather handles in input order.
///
/// Returns the first error in input order, regardless of which worker
/// finished first. Workers after the failing one keep running to completion;
/// their results are discarded.
///
/// # Errors
///
/// The first failing handle's error.
pub async fn join_all<T, E>(handles: Vec<Handle<T, E>>) -> Result<Vec<T>, E>
where
    E: From<TaskError>,
{
    let mut values = Vec::with_capacity(handles.len());
    for handle in handles {
        values.push(handle.join().await?);
    }
    Ok(values)
}

/// Invoke `operation` up to `attempts` times (at least once), returning the
/// first success or the last error. No delay between attempts.
///
/// # Errors
///
/// The error of the final attempt.
pub async fn retry<T, E, F, Fut>(attempts: u32, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let attempts = attempts.max(1);
    let mut attempt = 1u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= attempts => return Err(err),
            Err(err) => {
                tracing::warn!(attempt, attempts, error = %err, "attempt failed; retrying");
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
#[path = "tasks_test.rs"]
mod tests;
