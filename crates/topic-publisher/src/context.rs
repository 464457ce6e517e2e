//! # Call Context
//!
//! Caller-supplied deadline and cancellation for operations that wait on
//! the transport. Every port call made by the publisher is raced against
//! both; whichever fires first aborts the call with
//! [`PublisherError::Cancelled`].

use crate::domain::{CancelReason, PublisherError, Stage};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
pub use tokio_util::sync::CancellationToken;

/// Deadline and cancellation for one operation.
#[derive(Clone, Debug, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    token: Option<CancellationToken>,
}

impl CallContext {
    /// No deadline, not cancellable.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// Deadline `timeout` from now.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::default().timeout(timeout)
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    #[must_use]
    pub fn deadline_at(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn cancellable(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Why the context is already done, if it is.
    #[must_use]
    pub fn done(&self) -> Option<CancelReason> {
        if self.token.as_ref().is_some_and(CancellationToken::is_cancelled) {
            return Some(CancelReason::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Some(CancelReason::DeadlineExceeded);
        }
        None
    }

    /// Run `fut`, aborting with `Cancelled { stage, .. }` if the token
    /// fires or the deadline passes first.
    pub async fn run<T, F>(&self, stage: Stage, fut: F) -> Result<T, PublisherError>
    where
        F: Future<Output = Result<T, PublisherError>>,
    {
        if let Some(reason) = self.done() {
            return Err(PublisherError::Cancelled { stage, reason });
        }

        let cancelled = async {
            match &self.token {
                Some(token) => token.cancelled().await,
                None => std::future::pending().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            () = cancelled => Err(PublisherError::Cancelled { stage, reason: CancelReason::Cancelled }),
            () = expired => Err(PublisherError::Cancelled { stage, reason: CancelReason::DeadlineExceeded }),
            result = fut => result,
        }
    }
}
