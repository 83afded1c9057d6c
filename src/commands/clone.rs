//! `clone`: clone every configured repository that is not present yet

use anyhow::{Context, Result};
use std::time::Instant;
use tokio::runtime::Handle;

use super::{finish, CommandContext, Completion};
use crate::config::Repository;
use crate::core::{Registry, RepoError, TaskResult};
use crate::git::{CloneOptions, CloneStatus, GitClient};

pub const SKIPPED_EXISTING: &str = "already exists";

#[derive(Clone, Debug)]
pub struct CloneParams {
    /// Report present repositories as skipped instead of failed
    pub skip_existing: bool,
    /// Shallow clone depth, `0` for full history
    pub depth: u32,
}

impl Default for CloneParams {
    fn default() -> Self {
        Self {
            skip_existing: true,
            depth: 0,
        }
    }
}

pub fn clone_task<'a>(
    registry: &'a Registry,
    runtime: &'a Handle,
    params: &'a CloneParams,
) -> impl Fn(&Repository) -> TaskResult + Sync + 'a {
    move |repo: &Repository| {
        let start = Instant::now();
        let path = registry.repository_path(repo);
        let opts = CloneOptions {
            depth: params.depth,
            branch: None,
        };

        let outcome = runtime
            .block_on(GitClient::clone_if_missing(&repo.url, &path, &opts))
            .and_then(|status| match status {
                CloneStatus::Cloned => Ok(Completion::Done),
                CloneStatus::AlreadyPresent if params.skip_existing => {
                    Ok(Completion::Skipped(SKIPPED_EXISTING.to_string()))
                }
                CloneStatus::AlreadyPresent => Err(RepoError::already_exists(format!(
                    "directory already exists: {}",
                    path.display()
                ))),
            });
        finish(&repo.name, start, outcome)
    }
}

/// Handles the clone command
pub fn handle_clone_command(ctx: &CommandContext, params: &CloneParams) -> Result<bool> {
    ctx.registry.ensure_base_dir().with_context(|| {
        format!(
            "failed to create base directory {}",
            ctx.registry.base_dir().display()
        )
    })?;

    ctx.header(&format!(
        "Cloning {} repositories into {}",
        ctx.registry.count(),
        ctx.registry.base_dir().display()
    ))?;
    let summary = ctx.execute("Cloning", clone_task(&ctx.registry, &ctx.runtime, params))?;
    ctx.report(&summary, false)
}
