//! `exec`: run a shell command in every repository

use anyhow::Result;
use std::time::Instant;
use tokio::runtime::Handle;

use super::{finish, CommandContext, Completion};
use crate::config::Repository;
use crate::core::{FailFast, Registry, RepoError, TaskResult};
use crate::shell::{run_shell, DEFAULT_SHELL};

#[derive(Clone, Debug)]
pub struct ExecParams {
    pub command: String,
    pub shell: String,
    /// Stop dispatching after the first failure
    pub fail_fast: bool,
    pub dry_run: bool,
    /// Keep command output in the results
    pub show_output: bool,
}

impl ExecParams {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            shell: DEFAULT_SHELL.to_string(),
            fail_fast: false,
            dry_run: false,
            show_output: true,
        }
    }
}

pub fn exec_task<'a>(
    registry: &'a Registry,
    runtime: &'a Handle,
    params: &'a ExecParams,
) -> impl Fn(&Repository) -> TaskResult + Sync + 'a {
    move |repo: &Repository| {
        let start = Instant::now();
        let path = registry.repository_path(repo);
        if !registry.exists(repo) {
            let err = RepoError::not_found(format!("repository not found: {}", path.display()))
                .with_hint("run 'multi-git clone' first");
            return finish(&repo.name, start, Err(err));
        }

        if params.dry_run {
            let message = format!("would execute: {}", params.command);
            return finish(&repo.name, start, Ok(Completion::DoneWith(message)));
        }

        match runtime.block_on(run_shell(&path, &params.shell, &params.command)) {
            Ok(output) => {
                let output = output.trim();
                let message = if params.show_output && !output.is_empty() {
                    output.to_string()
                } else {
                    "executed successfully".to_string()
                };
                finish(&repo.name, start, Ok(Completion::DoneWith(message)))
            }
            Err(err) => {
                log::warn!("'{}' failed in {}: {err}", params.command, repo.name);
                let output = err
                    .output()
                    .map(str::trim)
                    .filter(|o| params.show_output && !o.is_empty())
                    .map(str::to_string);
                let result = finish(&repo.name, start, Err(err.into_repo_error()));
                match output {
                    Some(output) => result.with_message(output),
                    None => result,
                }
            }
        }
    }
}

/// Handles the exec command
pub fn handle_exec_command(ctx: &CommandContext, params: &ExecParams) -> Result<bool> {
    if params.command.trim().is_empty() {
        anyhow::bail!("command is required");
    }

    let mut header = format!(
        "Executing '{}' across {} repositories",
        params.command,
        ctx.registry.count()
    );
    if params.dry_run {
        header.push_str(" (dry-run)");
    }
    ctx.header(&header)?;

    let fail_fast = FailFast::new(params.fail_fast, ctx.cancel.clone());
    let task = fail_fast.wrap(exec_task(&ctx.registry, &ctx.runtime, params));
    let summary = ctx.execute("Executing", task)?;
    ctx.report(&summary, params.show_output)
}
