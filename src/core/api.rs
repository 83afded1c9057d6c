//! Public API for the core module.
//!
//! This module provides the stable public API for the execution engine:
//! - Repository registry and parallelism policy
//! - Sequential and bounded-parallel execution with cooperative cancellation
//! - Result classification, summaries and reporting
//!
//! Internal implementation details are not exposed through this API.

// Engine
pub use super::cancel::{CancellationToken, DEFAULT_CANCEL_REASON};
pub use super::executor::{Executor, ProgressFn, Task};
pub use super::fail_fast::FailFast;
pub use super::registry::Registry;

// Results
pub use super::error::{ErrorKind, RepoError};
pub use super::result::{Outcome, Summary, TaskResult};

// Output
pub use super::progress::RunProgress;
pub use super::reporter::Reporter;

// Configuration
pub use super::config::{
    DEFAULT_PARALLEL_WORKERS, FAIL_FAST_REASON, GIT_OPERATION_TIMEOUT_SECS,
    SHELL_COMMAND_TIMEOUT_SECS,
};
