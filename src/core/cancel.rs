//! Cooperative cancellation shared between the executor, its workers and tasks

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

pub const DEFAULT_CANCEL_REASON: &str = "cancelled";

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    reason: OnceLock<String>,
    deadline: Option<Instant>,
}

/// A cloneable, thread-safe cancellation flag
///
/// The executor only checks the token between tasks; a task that is already
/// running is never interrupted. Tasks wanting to stop early must poll
/// [`CancellationToken::is_cancelled`] themselves.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that reports itself cancelled once `deadline` has passed
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            inner: Arc::new(Inner {
                deadline: Some(deadline),
                ..Inner::default()
            }),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn cancel(&self) {
        self.cancel_with_reason(DEFAULT_CANCEL_REASON);
    }

    /// Cancels the token; only the first reason is kept
    pub fn cancel_with_reason(&self, reason: impl Into<String>) {
        let _ = self.inner.reason.set(reason.into());
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            log::info!("cancellation requested: {}", self.reason());
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
            || self.inner.deadline.is_some_and(|d| Instant::now() >= d)
    }

    pub fn reason(&self) -> &str {
        match self.inner.reason.get() {
            Some(reason) => reason,
            None if self.inner.deadline.is_some_and(|d| Instant::now() >= d) => "deadline exceeded",
            None => DEFAULT_CANCEL_REASON,
        }
    }
}
