//! Common test utilities and helpers
#![allow(dead_code, unused_imports)]

pub mod fixtures;
pub mod git;

pub use self::fixtures::{offline_registry, TestFleet};
pub use self::git::{is_git_available, setup_git_repo};

/// Tokio runtime whose handle command tasks block on from worker threads
pub fn test_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap()
}
