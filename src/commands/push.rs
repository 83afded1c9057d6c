//! `push`: force-push one branch of every repository

use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::time::Instant;
use tokio::runtime::Handle;

use super::{after, finish, CommandContext, Completion};
use crate::config::Repository;
use crate::core::{Registry, RepoError, TaskResult};
use crate::git::{CheckoutOptions, GitClient, PushOptions};

#[derive(Clone, Debug, Default)]
pub struct PushParams {
    pub local_branch: String,
    pub remote_branch: String,
    /// Remote to push to; the configured default when unset
    pub remote: Option<String>,
    pub force: bool,
    pub dry_run: bool,
    /// Skip the confirmation prompt
    pub yes: bool,
}

impl PushParams {
    /// Builds parameters from a `local[:remote]` branch spec
    pub fn from_spec(spec: &str) -> Self {
        let (local_branch, remote_branch) = parse_branch_spec(spec);
        Self {
            local_branch,
            remote_branch,
            ..Default::default()
        }
    }

    fn is_renamed(&self) -> bool {
        self.local_branch != self.remote_branch
    }
}

/// Splits `local:remote`; anything else pushes to the same name
pub fn parse_branch_spec(spec: &str) -> (String, String) {
    let parts: Vec<&str> = spec.split(':').collect();
    match parts.as_slice() {
        [local, remote] => (local.trim().to_string(), remote.trim().to_string()),
        _ => (spec.to_string(), spec.to_string()),
    }
}

pub fn push_task<'a>(
    registry: &'a Registry,
    runtime: &'a Handle,
    params: &'a PushParams,
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
        let outcome = runtime.block_on(push_repo(&client, params));
        finish(&repo.name, start, outcome)
    }
}

async fn push_repo(client: &GitClient, params: &PushParams) -> Result<Completion, RepoError> {
    let local = params.local_branch.as_str();
    if !client.branch_exists(local).await? {
        return Err(
            RepoError::not_found(format!("branch '{local}' does not exist"))
                .with_hint("check branch name or create it first"),
        );
    }

    if client.current_branch().await?.as_deref() != Some(local) {
        client
            .checkout(&CheckoutOptions {
                branch: local.to_string(),
                ..Default::default()
            })
            .await
            .map_err(|e| after(&format!("failed to checkout branch '{local}'"), e))?;
    }

    client
        .push(&PushOptions {
            branch: local.to_string(),
            remote_branch: Some(params.remote_branch.clone()),
            force: params.force,
            dry_run: params.dry_run,
        })
        .await?;

    let message = match (params.dry_run, params.is_renamed()) {
        (true, true) => format!(
            "would be force pushed '{local}' -> '{}' (dry-run)",
            params.remote_branch
        ),
        (true, false) => "would be force pushed (dry-run)".to_string(),
        (false, true) => format!(
            "force pushed '{local}' -> '{}' successfully",
            params.remote_branch
        ),
        (false, false) => "force pushed successfully".to_string(),
    };
    Ok(Completion::DoneWith(message))
}

/// Asks for confirmation before a force push; only `y`/`yes` proceeds
pub fn confirm_force_push(
    input: &mut impl BufRead,
    out: &mut impl Write,
    params: &PushParams,
    remote: &str,
    repo_count: usize,
) -> io::Result<bool> {
    writeln!(out)?;
    writeln!(out, "⚠️  WARNING: Force push will overwrite remote branch history!")?;
    writeln!(out, "   Local branch: {}", params.local_branch)?;
    if params.is_renamed() {
        writeln!(out, "   Remote branch: {}", params.remote_branch)?;
    } else {
        writeln!(out, "   Branch: {}", params.local_branch)?;
    }
    writeln!(out, "   Remote: {remote}")?;
    writeln!(out, "   Repositories: {repo_count}")?;
    writeln!(out)?;
    write!(out, "Continue? [y/N]: ")?;
    out.flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        return Ok(false);
    }
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

fn needs_confirmation(params: &PushParams) -> bool {
    !params.yes && !params.dry_run
}

/// Prompts on `out` and reports a declined push there as well
fn confirm_or_cancel(
    input: &mut impl BufRead,
    out: &mut impl Write,
    params: &PushParams,
    remote: &str,
    repo_count: usize,
) -> io::Result<bool> {
    let confirmed = confirm_force_push(input, out, params, remote, repo_count)?;
    if !confirmed {
        writeln!(out, "Cancelled.")?;
    }
    Ok(confirmed)
}

/// Handles the push command
pub fn handle_push_command(ctx: &CommandContext, params: &PushParams) -> Result<bool> {
    if params.local_branch.trim().is_empty() || params.remote_branch.trim().is_empty() {
        anyhow::bail!("branch is required\n  hint: use '--branch <local>[:<remote>]'");
    }
    if !params.force {
        anyhow::bail!(
            "push only supports force pushing\n  hint: add '--force' to confirm you want to overwrite remote history"
        );
    }

    let remote = params
        .remote
        .as_deref()
        .unwrap_or_else(|| ctx.registry.default_remote());

    if needs_confirmation(params) {
        // The prompt goes to stderr so stdout stays a clean report stream
        let confirmed = confirm_or_cancel(
            &mut io::stdin().lock(),
            &mut io::stderr(),
            params,
            remote,
            ctx.registry.count(),
        )
        .context("failed to read confirmation")?;
        if !confirmed {
            return Ok(false);
        }
    }

    let mut header = format!("Force pushing branch '{}'", params.local_branch);
    if params.is_renamed() {
        header.push_str(&format!(" -> '{}'", params.remote_branch));
    }
    header.push_str(&format!(" to {remote}"));
    if params.dry_run {
        header.push_str(" (dry-run)");
    }
    ctx.header(&header)?;

    let summary = ctx.execute("Pushing", push_task(&ctx.registry, &ctx.runtime, params))?;
    ctx.report(&summary, false)
}
