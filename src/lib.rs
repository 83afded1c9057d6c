//! # multi-git
//!
//! `multi-git` runs one operation (clone, checkout, pull, tag, push or an
//! arbitrary shell command) across a fleet of configured git repositories and
//! collects the per-repository outcomes into a single report. It powers the
//! `multi-git` CLI tool.
//!
//! ## Core Features
//!
//! - **Registry**: repositories, their paths and the worker count come from one YAML or TOML file.
//! - **Executor**: sequential or bounded-parallel fan-out with cooperative cancellation.
//! - **Summary**: every repository ends as success, skipped or failed; reports render as text or JSON.
//!
//! ## Example
//!
//! ```rust,no_run
//! use multi_git::config::load_and_validate;
//! use multi_git::core::{CancellationToken, Executor, Registry, Reporter, TaskResult};
//! use std::time::Duration;
//!
//! fn main() -> anyhow::Result<()> {
//!     let registry = Registry::new(load_and_validate("multi-git.yaml")?);
//!     let summary = Executor::new(&registry).execute(
//!         |repo: &multi_git::config::Repository| {
//!             TaskResult::success(repo.name.clone(), Duration::ZERO)
//!         },
//!         &CancellationToken::new(),
//!         None,
//!     );
//!     Reporter::new().print_full_report(&summary)?;
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod config;
pub mod core;
pub mod git;
pub mod shell;
pub mod utils;
