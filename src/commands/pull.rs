//! `pull`: fast-forward every repository from its remote

use anyhow::Result;
use std::time::Instant;
use tokio::runtime::Handle;

use super::{finish, CommandContext, Completion};
use crate::config::Repository;
use crate::core::{Registry, RepoError, TaskResult};
use crate::git::GitClient;

#[derive(Clone, Debug, Default)]
pub struct PullParams {
    /// Remote to pull from; the configured default when unset
    pub remote: Option<String>,
    /// Discard local changes before pulling
    pub force: bool,
}

pub fn pull_task<'a>(
    registry: &'a Registry,
    runtime: &'a Handle,
    params: &'a PullParams,
) -> impl Fn(&Repository) -> TaskResult + Sync + 'a {
    let remote = params
        .remote
        .as_deref()
        .unwrap_or_else(|| registry.default_remote());

    move |repo: &Repository| {
        let start = Instant::now();
        let path = registry.repository_path(repo);
        if !registry.is_repository(repo) {
            return finish(&repo.name, start, Err(RepoError::not_cloned(&path)));
        }

        let client = GitClient::new(path, remote);
        let outcome = runtime
            .block_on(client.pull(params.force))
            .map(|()| Completion::Done);
        finish(&repo.name, start, outcome)
    }
}

/// Handles the pull command
pub fn handle_pull_command(ctx: &CommandContext, params: &PullParams) -> Result<bool> {
    let remote = params
        .remote
        .as_deref()
        .unwrap_or_else(|| ctx.registry.default_remote());

    ctx.header(&format!(
        "Pulling {} repositories from {remote}",
        ctx.registry.count()
    ))?;
    let summary = ctx.execute("Pulling", pull_task(&ctx.registry, &ctx.runtime, params))?;
    ctx.report(&summary, false)
}
