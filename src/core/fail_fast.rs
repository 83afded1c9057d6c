//! Opt-in "stop on first failure" wrapper around a task

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::config::Repository;

use super::cancel::CancellationToken;
use super::config::FAIL_FAST_REASON;
use super::error::RepoError;
use super::executor::Task;
use super::result::TaskResult;

/// Per-invocation fail-fast state
///
/// Once any wrapped task fails, the remaining tasks return a cancelled result
/// without running and the shared token is cancelled so the executor stops
/// dispatching. Tasks that are already running finish normally.
#[derive(Debug)]
pub struct FailFast {
    enabled: bool,
    tripped: AtomicBool,
    cancel: CancellationToken,
}

impl FailFast {
    pub fn new(enabled: bool, cancel: CancellationToken) -> Self {
        Self {
            enabled,
            tripped: AtomicBool::new(false),
            cancel,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// True once a wrapped task has failed
    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::SeqCst)
    }

    /// Wraps `task`; a disabled `FailFast` passes results through unchanged
    pub fn wrap<'a, T>(&'a self, task: T) -> impl Fn(&Repository) -> TaskResult + Sync + 'a
    where
        T: Task + 'a,
    {
        move |repo: &Repository| {
            if !self.enabled {
                return task.run(repo);
            }

            if self.is_tripped() {
                return TaskResult::failed(
                    repo.name.clone(),
                    RepoError::cancelled(FAIL_FAST_REASON),
                    Duration::ZERO,
                );
            }

            let result = task.run(repo);
            if result.is_failed() && !self.tripped.swap(true, Ordering::SeqCst) {
                log::warn!("{} failed, cancelling remaining repositories", repo.name);
                self.cancel.cancel_with_reason(FAIL_FAST_REASON);
            }
            result
        }
    }
}
