//! Repository-level git operations built on [`run_git`]

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::operations::{git_error, run_git_with_timeout, GitOutput};
use crate::core::{RepoError, GIT_OPERATION_TIMEOUT_SECS};

/// Options for [`GitClient::clone_repo`]
#[derive(Clone, Debug, Default)]
pub struct CloneOptions {
    /// Shallow clone depth; `0` clones the full history
    pub depth: u32,
    /// Clone only this branch
    pub branch: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloneStatus {
    Cloned,
    AlreadyPresent,
}

#[derive(Clone, Debug, Default)]
pub struct CheckoutOptions {
    pub branch: String,
    /// Create the branch from HEAD when it exists neither locally nor on the remote
    pub create: bool,
    /// Discard local changes
    pub force: bool,
    /// Fetch the remote first; a failed fetch is logged and ignored
    pub fetch_first: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PushOptions {
    pub branch: String,
    /// Target branch on the remote; defaults to `branch`
    pub remote_branch: Option<String>,
    pub force: bool,
    /// Validate the branch without pushing
    pub dry_run: bool,
}

#[derive(Clone, Debug, Default)]
pub struct TagOptions {
    pub name: String,
    /// Creates an annotated tag when set
    pub message: Option<String>,
    /// Replace an existing tag
    pub force: bool,
}

/// Git operations on the repository at one path
#[derive(Clone, Debug)]
pub struct GitClient {
    path: PathBuf,
    remote: String,
    timeout: Duration,
}

impl GitClient {
    pub fn new(path: impl Into<PathBuf>, remote: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            remote: remote.into(),
            timeout: Duration::from_secs(GIT_OPERATION_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn exec(&self, args: &[&str]) -> Result<GitOutput, RepoError> {
        run_git_with_timeout(&self.path, args, self.timeout).await
    }

    /// Runs git and turns a non-zero exit into an error for `operation`
    async fn git(&self, operation: &str, args: &[&str]) -> Result<String, RepoError> {
        let output = self.exec(args).await?;
        if output.success {
            Ok(output.stdout)
        } else {
            log::warn!("git {} failed in {}: {}", operation, self.path.display(), output.stderr);
            Err(git_error(operation, &output.stderr))
        }
    }

    /// Runs a quiet query whose exit status is the answer
    async fn probe(&self, operation: &str, args: &[&str]) -> Result<bool, RepoError> {
        let output = self.exec(args).await?;
        if output.success {
            Ok(true)
        } else if output.stderr.is_empty() {
            Ok(false)
        } else {
            Err(git_error(operation, &output.stderr))
        }
    }

    // Cloning

    /// Clones `url` into `path`; a partially created directory is removed on failure
    pub async fn clone_repo(url: &str, path: &Path, opts: &CloneOptions) -> Result<(), RepoError> {
        if path.exists() {
            return Err(RepoError::already_exists(format!(
                "directory already exists: {}",
                path.display()
            )));
        }
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&parent).await.map_err(|e| {
            RepoError::operation_failed("failed to create parent directory").with_cause(e)
        })?;

        let depth = opts.depth.to_string();
        // git runs inside `parent`, so the target is relative to it
        let target = match path.file_name() {
            Some(name) => name.to_string_lossy(),
            None => path.to_string_lossy(),
        };
        let mut args = vec!["clone", "--quiet"];
        if opts.depth > 0 {
            args.extend(["--depth", depth.as_str()]);
        }
        if let Some(branch) = &opts.branch {
            args.extend(["--branch", branch.as_str(), "--single-branch"]);
        }
        args.extend(["--", url, &*target]);

        let output = run_git_with_timeout(
            &parent,
            &args,
            Duration::from_secs(GIT_OPERATION_TIMEOUT_SECS),
        )
        .await;

        let failure = match output {
            Ok(out) if out.success => return Ok(()),
            Ok(out) => git_error("clone", &out.stderr),
            Err(e) => e,
        };
        if path.exists() {
            let _ = tokio::fs::remove_dir_all(path).await;
        }
        Err(failure)
    }

    /// Clones unless a repository is already present at `path`
    ///
    /// A directory that exists but is not a repository is an error.
    pub async fn clone_if_missing(
        url: &str,
        path: &Path,
        opts: &CloneOptions,
    ) -> Result<CloneStatus, RepoError> {
        if path.is_dir() {
            if path.join(".git").exists() {
                return Ok(CloneStatus::AlreadyPresent);
            }
            return Err(RepoError::already_exists(format!(
                "directory exists but is not a git repository: {}",
                path.display()
            )));
        }
        Self::clone_repo(url, path, opts).await?;
        Ok(CloneStatus::Cloned)
    }

    // Branches

    /// Current branch name, `None` when HEAD is detached
    pub async fn current_branch(&self) -> Result<Option<String>, RepoError> {
        let output = self.exec(&["symbolic-ref", "--quiet", "--short", "HEAD"]).await?;
        if output.success {
            Ok(Some(output.stdout))
        } else if output.stderr.is_empty() {
            Ok(None)
        } else {
            Err(git_error("get current branch", &output.stderr))
        }
    }

    pub async fn branch_exists(&self, branch: &str) -> Result<bool, RepoError> {
        let reference = format!("refs/heads/{branch}");
        self.probe("check branch", &["show-ref", "--verify", "--quiet", &reference])
            .await
    }

    pub async fn remote_branch_exists(&self, branch: &str) -> Result<bool, RepoError> {
        let reference = format!("refs/remotes/{}/{branch}", self.remote);
        self.probe("check remote branch", &["show-ref", "--verify", "--quiet", &reference])
            .await
    }

    /// True when the worktree or index has uncommitted changes, untracked files included
    pub async fn has_local_changes(&self) -> Result<bool, RepoError> {
        let status = self.git("status", &["status", "--porcelain"]).await?;
        Ok(!status.is_empty())
    }

    pub async fn fetch(&self) -> Result<(), RepoError> {
        self.git("fetch", &["fetch", "--quiet", "--prune", &self.remote])
            .await
            .map(|_| ())
    }

    /// Switches to `opts.branch`
    ///
    /// Resolution order: local branch, `<remote>/<branch>` as a new tracking
    /// branch, then a new branch from HEAD when `create` is set.
    pub async fn checkout(&self, opts: &CheckoutOptions) -> Result<(), RepoError> {
        if opts.branch.trim().is_empty() {
            return Err(RepoError::operation_failed("branch name is required"));
        }

        if opts.fetch_first {
            if let Err(e) = self.fetch().await {
                log::warn!("fetch before checkout failed in {}: {e}", self.path.display());
            }
        }

        if !opts.force && self.has_local_changes().await? {
            return Err(RepoError::local_changes());
        }

        let branch = opts.branch.as_str();
        let upstream = format!("{}/{branch}", self.remote);
        let mut args = vec!["checkout", "--quiet"];
        if opts.force {
            args.push("--force");
        }

        if self.branch_exists(branch).await? {
            args.push(branch);
        } else if self.remote_branch_exists(branch).await? {
            args.extend(["-b", branch, "--track", upstream.as_str()]);
        } else if opts.create {
            args.extend(["-b", branch]);
        } else {
            return Err(RepoError::not_found(format!(
                "branch '{branch}' not found locally or on {}",
                self.remote
            ))
            .with_hint("use '--fetch' to update remote references, or '-b' to create a new branch"));
        }

        self.git("checkout", &args).await.map(|_| ())
    }

    /// Fast-forwards the current branch from the remote
    pub async fn pull(&self, force: bool) -> Result<(), RepoError> {
        if self.has_local_changes().await? {
            if !force {
                return Err(RepoError::local_changes());
            }
            self.git("discard local changes", &["reset", "--hard", "--quiet", "HEAD"])
                .await?;
        }

        let branch = self.current_branch().await?.ok_or_else(|| {
            RepoError::operation_failed("cannot pull: HEAD is detached")
                .with_hint("check out a branch first")
        })?;

        self.git("pull", &["pull", "--ff-only", "--quiet", &self.remote, &branch])
            .await
            .map(|_| ())
    }

    /// Pushes `opts.branch` to `opts.remote_branch` on the remote
    pub async fn push(&self, opts: &PushOptions) -> Result<(), RepoError> {
        if !self.branch_exists(&opts.branch).await? {
            return Err(
                RepoError::not_found(format!("branch '{}' does not exist", opts.branch))
                    .with_hint("check branch name or create it first"),
            );
        }
        if opts.dry_run {
            return Ok(());
        }

        let remote_branch = opts.remote_branch.as_deref().unwrap_or(&opts.branch);
        let refspec = format!(
            "{}refs/heads/{}:refs/heads/{}",
            if opts.force { "+" } else { "" },
            opts.branch,
            remote_branch
        );
        self.git("push", &["push", "--quiet", &self.remote, &refspec])
            .await
            .map(|_| ())
    }

    // Tags

    pub async fn tag_exists(&self, name: &str) -> Result<bool, RepoError> {
        let reference = format!("refs/tags/{name}");
        self.probe("check tag", &["show-ref", "--verify", "--quiet", &reference])
            .await
    }

    /// Tags HEAD; lightweight unless a message is given
    pub async fn create_tag(&self, opts: &TagOptions) -> Result<(), RepoError> {
        if opts.name.trim().is_empty() {
            return Err(RepoError::operation_failed("tag name is required"));
        }
        if !opts.force && self.tag_exists(&opts.name).await? {
            return Err(
                RepoError::already_exists(format!("tag '{}' already exists", opts.name))
                    .with_hint("use '--force' to overwrite"),
            );
        }

        let mut args = vec!["tag"];
        if opts.force {
            args.push("--force");
        }
        if let Some(message) = &opts.message {
            args.extend(["--annotate", "--message", message.as_str()]);
        }
        args.push(opts.name.as_str());
        self.git("create tag", &args).await.map(|_| ())
    }

    pub async fn delete_tag(&self, name: &str) -> Result<(), RepoError> {
        self.git("delete tag", &["tag", "--delete", name])
            .await
            .map(|_| ())
    }

    pub async fn push_tag(&self, name: &str, force: bool) -> Result<(), RepoError> {
        let refspec = format!("{}refs/tags/{name}:refs/tags/{name}", if force { "+" } else { "" });
        self.git("push tag", &["push", "--quiet", &self.remote, &refspec])
            .await
            .map(|_| ())
    }

    pub async fn delete_remote_tag(&self, name: &str) -> Result<(), RepoError> {
        let refspec = format!(":refs/tags/{name}");
        self.git("delete remote tag", &["push", "--quiet", &self.remote, &refspec])
            .await
            .map(|_| ())
    }
}
