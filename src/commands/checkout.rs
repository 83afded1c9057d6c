//! `checkout`: switch every repository to one branch

use anyhow::Result;
use std::time::Instant;
use tokio::runtime::Handle;

use super::{finish, CommandContext, Completion};
use crate::config::Repository;
use crate::core::{Registry, RepoError, TaskResult};
use crate::git::{CheckoutOptions, GitClient};

pub const SKIPPED_ON_BRANCH: &str = "already on branch";

#[derive(Clone, Debug, Default)]
pub struct CheckoutParams {
    pub branch: String,
    pub create: bool,
    pub force: bool,
    pub fetch: bool,
}

pub fn checkout_task<'a>(
    registry: &'a Registry,
    runtime: &'a Handle,
    params: &'a CheckoutParams,
) -> impl Fn(&Repository) -> TaskResult + Sync + 'a {
    move |repo: &Repository| {
        let start = Instant::now();
        let path = registry.repository_path(repo);
        if !registry.is_repository(repo) {
            return finish(&repo.name, start, Err(RepoError::not_cloned(&path)));
        }

        let client = GitClient::new(path, registry.default_remote());
        let outcome = runtime.block_on(checkout_repo(&client, params));
        finish(&repo.name, start, outcome)
    }
}

async fn checkout_repo(client: &GitClient, params: &CheckoutParams) -> Result<Completion, RepoError> {
    let current = client.current_branch().await?;
    if current.as_deref() == Some(params.branch.as_str()) {
        return Ok(Completion::Skipped(SKIPPED_ON_BRANCH.to_string()));
    }

    client
        .checkout(&CheckoutOptions {
            branch: params.branch.clone(),
            create: params.create,
            force: params.force,
            fetch_first: params.fetch,
        })
        .await?;
    Ok(Completion::Done)
}

/// Handles the checkout command
pub fn handle_checkout_command(ctx: &CommandContext, params: &CheckoutParams) -> Result<bool> {
    if params.branch.trim().is_empty() {
        anyhow::bail!("branch name is required");
    }

    ctx.header(&format!("Checking out branch: {}", params.branch))?;
    let summary = ctx.execute(
        "Checking out",
        checkout_task(&ctx.registry, &ctx.runtime, params),
    )?;
    ctx.report(&summary, false)
}
