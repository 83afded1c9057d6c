//! Outcome records for single repositories and the aggregate summary of a run

use serde::{Serialize, Serializer};
use std::time::Duration;

use super::error::RepoError;

/// Classification of a single task result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The operation ran and completed
    Success,
    /// Nothing to do, the repository was already in the desired state
    Skipped,
    /// The operation failed or was not performed because of cancellation
    Failed,
}

impl Outcome {
    /// Returns the emoji symbol for this outcome
    pub fn symbol(&self) -> &str {
        match self {
            Outcome::Success => "🟢",
            Outcome::Skipped => "🟠",
            Outcome::Failed => "🔴",
        }
    }

    /// Returns the text representation of this outcome
    pub fn text(&self) -> &str {
        match self {
            Outcome::Success => "ok",
            Outcome::Skipped => "skip",
            Outcome::Failed => "failed",
        }
    }
}

/// Result of running a task against one repository
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TaskResult {
    pub repo_name: String,
    pub outcome: Outcome,
    pub error: Option<RepoError>,
    #[serde(rename = "duration_secs", serialize_with = "serialize_secs")]
    pub duration: Duration,
    pub message: Option<String>,
}

impl TaskResult {
    pub fn success(repo_name: impl Into<String>, duration: Duration) -> Self {
        Self {
            repo_name: repo_name.into(),
            outcome: Outcome::Success,
            error: None,
            duration,
            message: None,
        }
    }

    /// A no-op result; skipped work has no meaningful duration
    pub fn skipped(repo_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            repo_name: repo_name.into(),
            outcome: Outcome::Skipped,
            error: None,
            duration: Duration::ZERO,
            message: Some(message.into()),
        }
    }

    pub fn failed(repo_name: impl Into<String>, error: RepoError, duration: Duration) -> Self {
        Self {
            repo_name: repo_name.into(),
            outcome: Outcome::Failed,
            error: Some(error),
            duration,
            message: None,
        }
    }

    /// Builds a result from loose fields, inferring a skip from the
    /// `success && duration == 0 && !message.is_empty()` convention
    pub fn from_parts(
        repo_name: impl Into<String>,
        success: bool,
        error: Option<RepoError>,
        duration: Duration,
        message: Option<String>,
    ) -> Self {
        let has_message = message.as_deref().is_some_and(|m| !m.is_empty());
        let outcome = if !success {
            Outcome::Failed
        } else if duration.is_zero() && has_message {
            Outcome::Skipped
        } else {
            Outcome::Success
        };
        Self {
            repo_name: repo_name.into(),
            outcome,
            error,
            duration,
            message,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn classify(&self) -> Outcome {
        self.outcome
    }

    /// True only for results that did real work; skipped results are excluded
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }

    pub fn is_skipped(&self) -> bool {
        self.outcome == Outcome::Skipped
    }

    pub fn is_failed(&self) -> bool {
        self.outcome == Outcome::Failed
    }
}

impl std::fmt::Display for TaskResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let secs = self.duration.as_secs_f64();
        match (self.outcome, &self.message, &self.error) {
            (Outcome::Failed, _, Some(err)) => {
                write!(f, "✗ {} ({:.2}s) - {}", self.repo_name, secs, err)
            }
            (Outcome::Failed, _, None) => write!(f, "✗ {} ({:.2}s)", self.repo_name, secs),
            (Outcome::Skipped, Some(msg), _) => write!(f, "- {}: {} (skipped)", self.repo_name, msg),
            (_, Some(msg), _) if !msg.is_empty() => {
                write!(f, "✓ {}: {} ({:.2}s)", self.repo_name, msg, secs)
            }
            _ => write!(f, "✓ {} ({:.2}s)", self.repo_name, secs),
        }
    }
}

/// Aggregate of every result produced by one run
#[derive(Clone, Debug, Serialize)]
pub struct Summary {
    pub total_count: usize,
    pub success_count: usize,
    pub failed_count: usize,
    pub skipped_count: usize,
    #[serde(rename = "total_duration_secs", serialize_with = "serialize_secs")]
    pub total_duration: Duration,
    pub results: Vec<TaskResult>,
}

impl Summary {
    /// Creates a summary in a single pass over `results`
    ///
    /// `total_duration` is the wall-clock span of the run, not the sum of the
    /// individual task durations.
    pub fn new(results: Vec<TaskResult>, total_duration: Duration) -> Self {
        let mut summary = Self {
            total_count: results.len(),
            success_count: 0,
            failed_count: 0,
            skipped_count: 0,
            total_duration,
            results: Vec::new(),
        };

        for result in &results {
            match result.classify() {
                Outcome::Success => summary.success_count += 1,
                Outcome::Skipped => summary.skipped_count += 1,
                Outcome::Failed => summary.failed_count += 1,
            }
        }

        summary.results = results;
        summary
    }

    pub fn failed_results(&self) -> Vec<&TaskResult> {
        self.filter(Outcome::Failed)
    }

    /// Results that did real work; skipped results are excluded
    pub fn successful_results(&self) -> Vec<&TaskResult> {
        self.filter(Outcome::Success)
    }

    pub fn skipped_results(&self) -> Vec<&TaskResult> {
        self.filter(Outcome::Skipped)
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count > 0
    }

    fn filter(&self, outcome: Outcome) -> Vec<&TaskResult> {
        self.results
            .iter()
            .filter(|r| r.classify() == outcome)
            .collect()
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Summary:\n  Success: {}\n  Failed:  {}\n  Skipped: {}\n  Total time: {:.2}s",
            self.success_count,
            self.failed_count,
            self.skipped_count,
            self.total_duration.as_secs_f64()
        )
    }
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{ErrorKind, RepoError};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_from_parts_infers_skip() {
        let r = TaskResult::from_parts("a", true, None, Duration::ZERO, Some("already on branch".into()));
        assert_eq!(r.classify(), Outcome::Skipped);
    }

    #[test]
    fn test_from_parts_zero_duration_without_message_is_success() {
        let r = TaskResult::from_parts("a", true, None, Duration::ZERO, None);
        assert_eq!(r.classify(), Outcome::Success);
        let r = TaskResult::from_parts("a", true, None, Duration::ZERO, Some(String::new()));
        assert_eq!(r.classify(), Outcome::Success);
    }

    #[test]
    fn test_from_parts_failure_wins() {
        let r = TaskResult::from_parts(
            "a",
            false,
            Some(RepoError::operation_failed("boom")),
            Duration::ZERO,
            Some("output".into()),
        );
        assert_eq!(r.classify(), Outcome::Failed);
    }

    #[test]
    fn test_success_with_message_and_duration_is_not_skip() {
        let r = TaskResult::success("a", ms(40)).with_message("tag created");
        assert_eq!(r.classify(), Outcome::Success);
    }

    #[test]
    fn test_predicates_agree_with_summary_filters() {
        let done = TaskResult::success("a", ms(10));
        let skipped = TaskResult::skipped("b", "already exists");
        let failed = TaskResult::failed("c", RepoError::operation_failed("boom"), ms(5));

        assert!(done.is_success() && !done.is_skipped() && !done.is_failed());
        assert!(!skipped.is_success() && skipped.is_skipped() && !skipped.is_failed());
        assert!(!failed.is_success() && !failed.is_skipped() && failed.is_failed());

        let summary = Summary::new(vec![done, skipped, failed], ms(20));
        let successful: Vec<_> = summary.results.iter().filter(|r| r.is_success()).collect();
        assert_eq!(successful.len(), summary.successful_results().len());
    }

    #[test]
    fn test_summary_counts() {
        let results = vec![
            TaskResult::success("a", ms(10)),
            TaskResult::skipped("b", "already exists"),
            TaskResult::failed("c", RepoError::network("connection refused"), ms(5)),
            TaskResult::success("d", ms(20)).with_message("done"),
        ];
        let summary = Summary::new(results, ms(50));

        assert_eq!(summary.total_count, 4);
        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.skipped_count, 1);
        assert_eq!(summary.failed_count, 1);
        assert_eq!(summary.total_duration, ms(50));
        assert!(summary.has_failures());
    }

    #[test]
    fn test_summary_filters_are_disjoint() {
        let results = vec![
            TaskResult::success("a", ms(10)),
            TaskResult::skipped("b", "already exists"),
            TaskResult::failed("c", RepoError::cancelled("cancelled"), Duration::ZERO),
        ];
        let summary = Summary::new(results, ms(10));

        let ok: Vec<_> = summary.successful_results().iter().map(|r| r.repo_name.as_str()).collect();
        let skipped: Vec<_> = summary.skipped_results().iter().map(|r| r.repo_name.as_str()).collect();
        let failed: Vec<_> = summary.failed_results().iter().map(|r| r.repo_name.as_str()).collect();
        assert_eq!(ok, ["a"]);
        assert_eq!(skipped, ["b"]);
        assert_eq!(failed, ["c"]);
        assert_eq!(failed.len() + ok.len() + skipped.len(), summary.total_count);
    }

    #[test]
    fn test_summary_is_deterministic() {
        let results = vec![
            TaskResult::success("a", ms(1)),
            TaskResult::from_parts("b", true, None, Duration::ZERO, Some("noop".into())),
            TaskResult::failed("c", RepoError::new(ErrorKind::AuthFailed, "auth failed"), ms(1)),
        ];
        let first = Summary::new(results.clone(), ms(3));
        let second = Summary::new(results, ms(3));
        assert_eq!(
            (first.success_count, first.skipped_count, first.failed_count),
            (second.success_count, second.skipped_count, second.failed_count)
        );
    }

    #[test]
    fn test_empty_summary() {
        let summary = Summary::new(Vec::new(), Duration::ZERO);
        assert_eq!(summary.total_count, 0);
        assert!(!summary.has_failures());
        assert!(summary.failed_results().is_empty());
    }

    #[test]
    fn test_display_lines() {
        let ok = TaskResult::success("api", ms(1500));
        assert_eq!(ok.to_string(), "✓ api (1.50s)");

        let skipped = TaskResult::skipped("web", "already on branch");
        assert_eq!(skipped.to_string(), "- web: already on branch (skipped)");

        let failed = TaskResult::failed("db", RepoError::not_found("branch 'x' not found"), ms(250));
        assert_eq!(failed.to_string(), "✗ db (0.25s) - branch 'x' not found");
    }

    #[test]
    fn test_summary_serializes_durations_as_seconds() {
        let summary = Summary::new(vec![TaskResult::success("a", ms(500))], ms(1500));
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["total_duration_secs"], 1.5);
        assert_eq!(json["results"][0]["duration_secs"], 0.5);
        assert_eq!(json["results"][0]["outcome"], "success");
    }
}
