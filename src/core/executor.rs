//! Fan-out execution of a per-repository task
//!
//! The executor runs a [`Task`] once for every repository in a [`Registry`],
//! either strictly in order on the calling thread or on a fixed-size pool of
//! worker threads draining a shared FIFO queue.
//!
//! Cancellation is only observed at task boundaries:
//! - sequential mode checks the token before each repository and stops, so
//!   unreached repositories have no result at all;
//! - parallel mode checks the token at every dequeue and records a cancelled
//!   result for each remaining repository, so the summary always holds one
//!   result per registered repository.
//!
//! A task that is already running always completes.

use std::collections::VecDeque;
use std::sync::mpsc;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::config::Repository;

use super::cancel::CancellationToken;
use super::error::RepoError;
use super::registry::Registry;
use super::result::{Summary, TaskResult};

/// Callback invoked once per produced result; may be called from several workers at once
pub type ProgressFn<'a> = dyn Fn(&TaskResult) + Sync + 'a;

/// An operation applied to a single repository
///
/// Implemented for every `Fn(&Repository) -> TaskResult + Sync` closure.
pub trait Task: Sync {
    fn run(&self, repo: &Repository) -> TaskResult;
}

impl<F> Task for F
where
    F: Fn(&Repository) -> TaskResult + Sync,
{
    fn run(&self, repo: &Repository) -> TaskResult {
        self(repo)
    }
}

pub struct Executor<'r> {
    registry: &'r Registry,
}

impl<'r> Executor<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Runs `task` over every repository and returns the aggregated summary
    ///
    /// Uses sequential mode when the registry's parallelism is 1, a pool of
    /// `min(parallelism, count)` workers otherwise.
    pub fn execute<T: Task>(
        &self,
        task: T,
        cancel: &CancellationToken,
        on_progress: Option<&ProgressFn<'_>>,
    ) -> Summary {
        if self.registry.parallelism() > 1 {
            self.execute_parallel(task, cancel, on_progress)
        } else {
            self.execute_sequential(task, cancel, on_progress)
        }
    }

    /// Runs the task on each repository in registration order
    pub fn execute_sequential<T: Task>(
        &self,
        task: T,
        cancel: &CancellationToken,
        on_progress: Option<&ProgressFn<'_>>,
    ) -> Summary {
        let start_time = Instant::now();
        let repos = self.registry.repositories();
        let mut results = Vec::with_capacity(repos.len());
        log::debug!("executing sequentially over {} repositories", repos.len());

        for repo in repos {
            if cancel.is_cancelled() {
                log::info!(
                    "stopping after {} of {} repositories: {}",
                    results.len(),
                    repos.len(),
                    cancel.reason()
                );
                break;
            }

            let result = task.run(repo);
            if let Some(progress) = on_progress {
                progress(&result);
            }
            results.push(result);
        }

        Summary::new(results, start_time.elapsed())
    }

    /// Runs the task on a bounded pool of worker threads
    ///
    /// Result order follows completion order.
    pub fn execute_parallel<T: Task>(
        &self,
        task: T,
        cancel: &CancellationToken,
        on_progress: Option<&ProgressFn<'_>>,
    ) -> Summary {
        let start_time = Instant::now();
        let repos = self.registry.repositories();
        if repos.is_empty() {
            return Summary::new(Vec::new(), start_time.elapsed());
        }

        let workers = self.registry.parallelism().min(repos.len()).max(1);
        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("multi-git-worker-{i}"))
            .build()
        {
            Ok(pool) => pool,
            Err(e) => {
                log::warn!("failed to start worker pool ({e}), falling back to sequential execution");
                return self.execute_sequential(task, cancel, on_progress);
            }
        };
        log::debug!(
            "executing over {} repositories with {} workers",
            repos.len(),
            workers
        );

        let queue: Mutex<VecDeque<&Repository>> = Mutex::new(repos.iter().collect());
        let (sink, results_rx) = mpsc::channel::<TaskResult>();
        let task = &task;
        let queue = &queue;

        pool.scope(|scope| {
            for _ in 0..workers {
                let sink = sink.clone();
                scope.spawn(move |_| {
                    while let Some(repo) = dequeue(queue) {
                        let result = if cancel.is_cancelled() {
                            cancelled_result(repo, cancel)
                        } else {
                            task.run(repo)
                        };
                        if let Some(progress) = on_progress {
                            progress(&result);
                        }
                        // The receiver outlives the scope, so sending cannot fail
                        let _ = sink.send(result);
                    }
                });
            }
        });
        drop(sink);

        let results: Vec<TaskResult> = results_rx.into_iter().collect();
        debug_assert_eq!(results.len(), repos.len());
        Summary::new(results, start_time.elapsed())
    }
}

fn dequeue<'a>(queue: &Mutex<VecDeque<&'a Repository>>) -> Option<&'a Repository> {
    lock_queue(queue).pop_front()
}

fn lock_queue<'q, 'a>(
    queue: &'q Mutex<VecDeque<&'a Repository>>,
) -> MutexGuard<'q, VecDeque<&'a Repository>> {
    // A panicking task never holds the queue lock, so the data is intact
    queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn cancelled_result(repo: &Repository, cancel: &CancellationToken) -> TaskResult {
    TaskResult::failed(
        repo.name.clone(),
        RepoError::cancelled(cancel.reason()),
        Duration::ZERO,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::error::{ErrorKind, RepoError};
    use crate::core::result::Outcome;
    use std::collections::HashSet;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn registry(names: &[&str], workers: i64) -> Registry {
        Registry::new(Config {
            base_dir: PathBuf::from("/work"),
            default_remote: "origin".to_string(),
            parallel_workers: workers,
            repositories: names
                .iter()
                .map(|n| Repository::new(*n, format!("git@github.com:acme/{n}.git")))
                .collect(),
        })
    }

    fn ok_task(repo: &Repository) -> TaskResult {
        TaskResult::success(repo.name.clone(), Duration::from_millis(1))
    }

    fn names(summary: &Summary) -> Vec<String> {
        summary.results.iter().map(|r| r.repo_name.clone()).collect()
    }

    #[test]
    fn test_sequential_preserves_order() {
        let reg = registry(&["a", "b", "c", "d"], 1);
        let summary = Executor::new(&reg).execute(ok_task, &CancellationToken::new(), None);
        assert_eq!(names(&summary), ["a", "b", "c", "d"]);
        assert_eq!(summary.success_count, 4);
    }

    #[test]
    fn test_every_mode_produces_one_result_per_repository() {
        let repo_names: Vec<String> = (0..17).map(|i| format!("repo-{i}")).collect();
        let refs: Vec<&str> = repo_names.iter().map(String::as_str).collect();

        for workers in [1, 2, 3, 8, 64] {
            let reg = registry(&refs, workers);
            let summary = Executor::new(&reg).execute(ok_task, &CancellationToken::new(), None);
            assert_eq!(summary.total_count, 17, "workers = {workers}");
            let unique: HashSet<_> = names(&summary).into_iter().collect();
            assert_eq!(unique.len(), 17, "workers = {workers}");
        }
    }

    #[test]
    fn test_empty_registry_gives_empty_summary() {
        for workers in [1, 4] {
            let reg = registry(&[], workers);
            let summary = Executor::new(&reg).execute(ok_task, &CancellationToken::new(), None);
            assert_eq!(summary.total_count, 0);
            assert!(!summary.has_failures());
        }
    }

    #[test]
    fn test_parallel_runs_each_task_exactly_once() {
        let reg = registry(&["a", "b", "c", "d", "e", "f", "g"], 3);
        let calls = AtomicUsize::new(0);
        let task = |repo: &Repository| {
            calls.fetch_add(1, Ordering::SeqCst);
            ok_task(repo)
        };
        let summary = Executor::new(&reg).execute(task, &CancellationToken::new(), None);
        assert_eq!(calls.load(Ordering::SeqCst), 7);
        assert_eq!(summary.total_count, 7);
    }

    #[test]
    fn test_parallel_respects_worker_bound() {
        let reg = registry(&["a", "b", "c", "d", "e", "f", "g", "h", "i"], 3);
        let running = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let task = |repo: &Repository| {
            let now = running.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            running.fetch_sub(1, Ordering::SeqCst);
            ok_task(repo)
        };
        Executor::new(&reg).execute(task, &CancellationToken::new(), None);
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert!(peak.load(Ordering::SeqCst) >= 2);
    }

    #[test]
    fn test_sequential_cancellation_truncates_results() {
        let reg = registry(&["a", "b", "c", "d", "e"], 1);
        let cancel = CancellationToken::new();
        let task = |repo: &Repository| {
            // Cancel while processing the second repository
            if repo.name == "b" {
                cancel.cancel();
            }
            ok_task(repo)
        };
        let summary = Executor::new(&reg).execute(task, &cancel, None);
        assert_eq!(names(&summary), ["a", "b"]);
        assert_eq!(summary.failed_count, 0);
    }

    #[test]
    fn test_sequential_cancelled_before_start_runs_nothing() {
        let reg = registry(&["a", "b"], 1);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let summary = Executor::new(&reg).execute(ok_task, &cancel, None);
        assert_eq!(summary.total_count, 0);
    }

    #[test]
    fn test_parallel_cancellation_synthesizes_results() {
        let reg = registry(&["a", "b", "c", "d"], 2);
        let cancel = CancellationToken::new();
        cancel.cancel_with_reason("interrupted");
        let calls = AtomicUsize::new(0);
        let task = |repo: &Repository| {
            calls.fetch_add(1, Ordering::SeqCst);
            ok_task(repo)
        };

        let summary = Executor::new(&reg).execute(task, &cancel, None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(summary.total_count, 4);
        assert_eq!(summary.failed_count, 4);
        for result in &summary.results {
            let err = result.error.as_ref().unwrap();
            assert_eq!(err.kind, ErrorKind::Cancelled);
            assert_eq!(err.message, "interrupted");
        }
    }

    #[test]
    fn test_running_task_is_not_interrupted() {
        let reg = registry(&["slow", "next"], 1);
        let cancel = CancellationToken::new();
        let task = |repo: &Repository| {
            if repo.name == "slow" {
                cancel.cancel();
                std::thread::sleep(Duration::from_millis(10));
            }
            ok_task(repo)
        };
        let summary = Executor::new(&reg).execute(task, &cancel, None);
        assert_eq!(summary.total_count, 1);
        assert_eq!(summary.results[0].outcome, Outcome::Success);
    }

    #[test]
    fn test_progress_called_once_per_result() {
        for workers in [1, 3] {
            let reg = registry(&["a", "b", "c", "d", "e"], workers);
            let count = AtomicUsize::new(0);
            let progress = |_: &TaskResult| {
                count.fetch_add(1, Ordering::SeqCst);
            };
            Executor::new(&reg).execute(ok_task, &CancellationToken::new(), Some(&progress));
            assert_eq!(count.load(Ordering::SeqCst), 5, "workers = {workers}");
        }
    }

    #[test]
    fn test_progress_includes_cancelled_results_in_parallel() {
        let reg = registry(&["a", "b", "c"], 3);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let count = AtomicUsize::new(0);
        let progress = |_: &TaskResult| {
            count.fetch_add(1, Ordering::SeqCst);
        };
        Executor::new(&reg).execute(ok_task, &cancel, Some(&progress));
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_failures_do_not_abort_the_batch() {
        let reg = registry(&["a", "b", "c"], 2);
        let task = |repo: &Repository| {
            if repo.name == "b" {
                TaskResult::failed("b", RepoError::operation_failed("boom"), Duration::from_millis(1))
            } else {
                ok_task(repo)
            }
        };
        let summary = Executor::new(&reg).execute(task, &CancellationToken::new(), None);
        assert_eq!(summary.total_count, 3);
        assert_eq!(summary.failed_count, 1);
        assert_eq!(summary.success_count, 2);
    }
}
