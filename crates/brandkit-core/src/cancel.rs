//! Cooperative cancellation shared between a caller and the workers it spawns.

use std::future::Future;
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::watch;

use crate::error::TaskError;

#[derive(Debug)]
struct Inner {
    tx: watch::Sender<bool>,
    children: Mutex<Vec<Weak<Inner>>>,
}

impl Inner {
    fn cancel(&self) {
        self.tx.send_replace(true);
        let children = match self.children.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        for child in children.iter().filter_map(Weak::upgrade) {
            child.cancel();
        }
    }
}

/// Cloneable cancellation signal.
///
/// All clones observe the same flag. Child tokens created with
/// [`CancelToken::child`] are tripped when their parent is, but cancelling a
/// child leaves the parent untouched.
#[derive(Debug, Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                tx,
                children: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Token that trips when either it or `self` is cancelled.
    #[must_use]
    pub fn child(&self) -> Self {
        let child = Self::new();
        match self.inner.children.lock() {
            Ok(mut children) => {
                children.retain(|c| c.strong_count() > 0);
                children.push(Arc::downgrade(&child.inner));
            }
            Err(poisoned) => poisoned.into_inner().push(Arc::downgrade(&child.inner)),
        }
        // A cancel that raced the registration above has already drained the list.
        if self.is_cancelled() {
            child.cancel();
        }
        child
    }

    pub fn cancel(&self) {
        self.inner.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.inner.tx.borrow()
    }

    /// Resolves once this token or any ancestor is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.inner.tx.subscribe();
        // The sender lives in `self`, so `wait_for` only returns once the flag flips.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Race `fut` against the signal. The future is dropped on cancellation,
    /// which also drops any in-flight HTTP request it owns.
    ///
    /// # Errors
    ///
    /// Returns the future's own error, or [`TaskError::Cancelled`] converted
    /// into `E` when the token trips first.
    pub async fn run<T, E, F>(&self, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<TaskError>,
    {
        if self.is_cancelled() {
            return Err(TaskError::Cancelled.into());
        }
        tokio::select! {
            biased;
            () = self.cancelled() => Err(TaskError::Cancelled.into()),
            result = fut => result,
        }
    }

    /// Cancels the token when the returned guard is dropped.
    #[must_use]
    pub fn drop_guard(&self) -> CancelOnDrop {
        CancelOnDrop {
            token: Some(self.clone()),
        }
    }
}

/// Trips its token on drop unless [`CancelOnDrop::disarm`] was called.
#[derive(Debug)]
pub struct CancelOnDrop {
    token: Option<CancelToken>,
}

impl CancelOnDrop {
    pub fn disarm(mut self) {
        self.token = None;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn run_returns_future_result_when_not_cancelled() {
        let token = CancelToken::new();
        let result: Result<u32, TaskError> = token.run(async { Ok(7) }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn run_aborts_pending_future_on_cancel() {
        let token = CancelToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });
        let result: Result<(), TaskError> = token
            .run(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(())
            })
            .await;
        assert_eq!(result, Err(TaskError::Cancelled));
    }

    #[tokio::test]
    async fn already_cancelled_token_short_circuits() {
        let token = CancelToken::new();
        token.cancel();
        let result: Result<u32, TaskError> = token.run(async { Ok(1) }).await;
        assert_eq!(result, Err(TaskError::Cancelled));
    }

    #[tokio::test]
    async fn child_observes_parent_but_not_vice_versa() {
        let parent = CancelToken::new();
        let child = parent.child();
        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());

        let parent = CancelToken::new();
        let child = parent.child();
        parent.cancel();
        assert!(child.is_cancelled());
        tokio::time::timeout(Duration::from_secs(1), child.cancelled())
            .await
            .expect("child should resolve after parent cancel");
    }

    #[test]
    fn drop_guard_cancels_unless_disarmed() {
        let token = CancelToken::new();
        drop(token.drop_guard());
        assert!(token.is_cancelled());

        let token = CancelToken::new();
        token.drop_guard().disarm();
        assert!(!token.is_cancelled());
    }
}
