//! Configuration constants and settings

// Concurrency Configuration
//
// Git operations are I/O-bound; a small pool keeps remote hosts from throttling
// while still overlapping network round-trips.

/// Worker count used when the configuration gives none (or a non-positive value)
pub const DEFAULT_PARALLEL_WORKERS: usize = 3;

// Timeouts
pub const GIT_OPERATION_TIMEOUT_SECS: u64 = 180; // 3 minutes per git invocation
pub const SHELL_COMMAND_TIMEOUT_SECS: u64 = 300; // 5 minutes per shell command

// Progress bar configuration
pub const PROGRESS_CHARS: &str = "##-";
pub const PROGRESS_TEMPLATE: &str = "{prefix:.bold} [{bar:30}] {pos}/{len} {wide_msg}";

// Display formatting constants
pub const SEPARATOR_WIDTH: usize = 40;

// Fail-fast
pub const FAIL_FAST_REASON: &str = "skipped due to previous failure";
