//! Git testing utilities

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Runs git in `path` and returns trimmed stdout, failing on a non-zero exit
pub fn git(path: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(path)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()?;

    if !output.status.success() {
        anyhow::bail!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Sets up a git repository with user config and `main` as the initial branch
pub fn setup_git_repo(path: &Path) -> Result<()> {
    git(path, &["init"])?;
    git(path, &["symbolic-ref", "HEAD", "refs/heads/main"])?;
    configure_user(path)
}

/// Configures a commit identity and disables signing
pub fn configure_user(path: &Path) -> Result<()> {
    git(path, &["config", "user.name", "Test User"])?;
    git(path, &["config", "user.email", "test@example.com"])?;
    git(path, &["config", "commit.gpgsign", "false"])?;
    git(path, &["config", "tag.gpgsign", "false"])?;
    Ok(())
}

/// Creates a test commit in the repository
pub fn create_test_commit(
    path: &Path,
    file_name: &str,
    content: &str,
    message: &str,
) -> Result<()> {
    std::fs::write(path.join(file_name), content)?;
    git(path, &["add", file_name])?;
    git(path, &["commit", "-m", message])?;
    Ok(())
}

/// Adds a git remote to a repository
pub fn add_git_remote(path: &Path, remote_name: &str, url: &str) -> Result<()> {
    git(path, &["remote", "add", remote_name, url])?;
    Ok(())
}

/// Creates a bare repository at `parent/<name>.git` whose `main` holds one commit
pub fn create_bare_remote(parent: &Path, name: &str) -> Result<PathBuf> {
    let remote = parent.join(format!("{name}.git"));
    std::fs::create_dir_all(&remote)?;
    git(&remote, &["init", "--bare"])?;
    git(&remote, &["symbolic-ref", "HEAD", "refs/heads/main"])?;

    let seed = parent.join(format!("{name}-seed"));
    std::fs::create_dir_all(&seed)?;
    setup_git_repo(&seed)?;
    create_test_commit(&seed, "README.md", &format!("# {name}"), "Initial commit")?;
    add_git_remote(&seed, "origin", &remote.to_string_lossy())?;
    git(&seed, &["push", "origin", "main"])?;

    Ok(remote)
}

/// Commits a new file to `main` of a bare remote through a throwaway clone
pub fn push_remote_commit(remote: &Path, file_name: &str, content: &str) -> Result<()> {
    let scratch = tempfile::TempDir::new()?;
    let work = scratch.path().join("work");
    git(
        scratch.path(),
        &["clone", &remote.to_string_lossy(), "work"],
    )?;
    configure_user(&work)?;
    create_test_commit(&work, file_name, content, &format!("Add {file_name}"))?;
    git(&work, &["push", "origin", "HEAD:main"])?;
    Ok(())
}

/// Lists the tag names of a repository (bare or not)
pub fn list_tags(path: &Path) -> Result<Vec<String>> {
    let out = git(path, &["tag", "--list"])?;
    Ok(out.lines().map(str::to_string).collect())
}

/// Checks if git is available in the system
pub fn is_git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
