//! `tag`: create or delete one tag across every repository

use anyhow::Result;
use std::time::Instant;
use tokio::runtime::Handle;

use super::{after, finish, CommandContext, Completion};
use crate::config::Repository;
use crate::core::{Registry, RepoError, TaskResult};
use crate::git::{CheckoutOptions, GitClient, TagOptions};

pub const SKIPPED_TAG_MISSING: &str = "tag not found (already deleted)";

#[derive(Clone, Debug, Default)]
pub struct TagParams {
    pub name: String,
    /// Branch to tag; required when creating
    pub branch: Option<String>,
    /// Annotated tag message
    pub message: Option<String>,
    /// Also push the tag (or its deletion) to the remote
    pub push: bool,
    pub force: bool,
    pub delete: bool,
}

impl TagParams {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("tag name is required\n  hint: use '--name <tag>'");
        }
        if !self.delete && self.branch.as_deref().map_or(true, |b| b.trim().is_empty()) {
            anyhow::bail!(
                "--branch is required when creating a tag\n  hint: use '--branch <branch-name>' to specify the branch"
            );
        }
        Ok(())
    }
}

pub fn tag_task<'a>(
    registry: &'a Registry,
    runtime: &'a Handle,
    params: &'a TagParams,
) -> impl Fn(&Repository) -> TaskResult + Sync + 'a {
    move |repo: &Repository| {
        let start = Instant::now();
        let path = registry.repository_path(repo);
        if !registry.is_repository(repo) {
            return finish(&repo.name, start, Err(RepoError::not_cloned(&path)));
        }

        let client = GitClient::new(path, registry.default_remote());
        let outcome = if params.delete {
            runtime.block_on(delete_tag(&client, params))
        } else {
            runtime.block_on(create_tag(&client, params))
        };
        finish(&repo.name, start, outcome)
    }
}

async fn create_tag(client: &GitClient, params: &TagParams) -> Result<Completion, RepoError> {
    let branch = params.branch.clone().unwrap_or_default();
    client
        .checkout(&CheckoutOptions {
            branch: branch.clone(),
            fetch_first: true,
            ..Default::default()
        })
        .await
        .map_err(|e| after(&format!("failed to checkout branch '{branch}'"), e))?;

    client
        .create_tag(&TagOptions {
            name: params.name.clone(),
            message: params.message.clone(),
            force: params.force,
        })
        .await?;

    if !params.push {
        return Ok(Completion::DoneWith("tag created".to_string()));
    }
    client
        .push_tag(&params.name, params.force)
        .await
        .map_err(|e| after("tag created but push failed", e))?;
    Ok(Completion::DoneWith("tag created and pushed".to_string()))
}

async fn delete_tag(client: &GitClient, params: &TagParams) -> Result<Completion, RepoError> {
    if !client.tag_exists(&params.name).await? {
        return Ok(Completion::Skipped(SKIPPED_TAG_MISSING.to_string()));
    }

    client.delete_tag(&params.name).await?;
    if !params.push {
        return Ok(Completion::DoneWith("tag deleted (local only)".to_string()));
    }
    client
        .delete_remote_tag(&params.name)
        .await
        .map_err(|e| after("local tag deleted but remote deletion failed", e))?;
    Ok(Completion::DoneWith("tag deleted (local + remote)".to_string()))
}

/// Handles the tag command
pub fn handle_tag_command(ctx: &CommandContext, params: &TagParams) -> Result<bool> {
    params.validate()?;

    if params.delete {
        ctx.header(&format!("Deleting tag '{}'", params.name))?;
    } else {
        ctx.header(&format!(
            "Creating tag '{}' on branch '{}'",
            params.name,
            params.branch.as_deref().unwrap_or_default()
        ))?;
    }

    let label = if params.delete { "Deleting tag" } else { "Tagging" };
    let summary = ctx.execute(label, tag_task(&ctx.registry, &ctx.runtime, params))?;
    ctx.report(&summary, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_requires_branch() {
        let params = TagParams {
            name: "v1.0.0".to_string(),
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = TagParams {
            name: "v1.0.0".to_string(),
            branch: Some("main".to_string()),
            ..Default::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_delete_does_not_need_branch() {
        let params = TagParams {
            name: "v1.0.0".to_string(),
            delete: true,
            ..Default::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_name_is_required() {
        let params = TagParams {
            delete: true,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
