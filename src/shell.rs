//! Runs arbitrary shell commands inside a repository

use std::io;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

use crate::core::{RepoError, SHELL_COMMAND_TIMEOUT_SECS};

pub const DEFAULT_SHELL: &str = "/bin/sh";

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("failed to start shell '{shell}': {source}")]
    Spawn {
        shell: String,
        #[source]
        source: io::Error,
    },

    #[error("{}", exit_message(.code))]
    Exit { code: Option<i32>, output: String },

    #[error("command timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

fn exit_message(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("command exited with status {code}"),
        None => "command terminated by signal".to_string(),
    }
}

impl ShellError {
    /// Output captured before the command failed, if it ran at all
    pub fn output(&self) -> Option<&str> {
        match self {
            ShellError::Exit { output, .. } => Some(output),
            _ => None,
        }
    }

    /// Converts to a per-repository error with a remediation hint where one applies
    pub fn into_repo_error(self) -> RepoError {
        let hint = match &self {
            ShellError::Spawn { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                Some("check if the shell is installed and in PATH")
            }
            ShellError::Spawn { source, .. }
                if source.kind() == io::ErrorKind::PermissionDenied =>
            {
                Some("check file permissions")
            }
            ShellError::Exit { code: Some(127), .. } => {
                Some("check if the command is installed and in PATH")
            }
            ShellError::Exit { code: Some(126), .. } => Some("check file permissions"),
            ShellError::Timeout(_) => Some("increase timeout or optimize command"),
            _ => None,
        };

        let err = RepoError::operation_failed(self.to_string());
        match hint {
            Some(hint) => err.with_hint(hint),
            None => err,
        }
    }
}

/// Runs `<shell> -c <command>` in `work_dir` with the default timeout
pub async fn run_shell(work_dir: &Path, shell: &str, command: &str) -> Result<String, ShellError> {
    run_shell_with_timeout(
        work_dir,
        shell,
        command,
        Duration::from_secs(SHELL_COMMAND_TIMEOUT_SECS),
    )
    .await
}

/// Runs `<shell> -c <command>` and returns stdout followed by stderr
///
/// The child is killed when the timeout elapses.
pub async fn run_shell_with_timeout(
    work_dir: &Path,
    shell: &str,
    command: &str,
    timeout: Duration,
) -> Result<String, ShellError> {
    log::debug!("{shell} -c {command:?} (in {})", work_dir.display());

    let result = tokio::time::timeout(
        timeout,
        Command::new(shell)
            .arg("-c")
            .arg(command)
            .current_dir(work_dir)
            .kill_on_drop(true)
            .output(),
    )
    .await;

    let output = match result {
        Ok(Ok(output)) => output,
        Ok(Err(source)) => {
            return Err(ShellError::Spawn {
                shell: shell.to_string(),
                source,
            })
        }
        Err(_) => return Err(ShellError::Timeout(timeout)),
    };

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    if !output.stderr.is_empty() {
        if !combined.is_empty() && !combined.ends_with('\n') {
            combined.push('\n');
        }
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
    }

    if output.status.success() {
        Ok(combined)
    } else {
        Err(ShellError::Exit {
            code: output.status.code(),
            output: combined,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_runs_in_work_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "x").unwrap();
        let output = run_shell(dir.path(), DEFAULT_SHELL, "ls").await.unwrap();
        assert!(output.contains("marker.txt"));
    }

    #[tokio::test]
    async fn test_combines_stdout_and_stderr() {
        let dir = TempDir::new().unwrap();
        let output = run_shell(dir.path(), DEFAULT_SHELL, "echo out; echo err >&2")
            .await
            .unwrap();
        assert_eq!(output, "out\nerr\n");
    }

    #[tokio::test]
    async fn test_non_zero_exit_keeps_output() {
        let dir = TempDir::new().unwrap();
        let err = run_shell(dir.path(), DEFAULT_SHELL, "echo partial; exit 3")
            .await
            .unwrap_err();
        assert!(matches!(err, ShellError::Exit { code: Some(3), .. }));
        assert_eq!(err.output(), Some("partial\n"));
        assert_eq!(err.to_string(), "command exited with status 3");
    }

    #[tokio::test]
    async fn test_missing_command_gets_hint() {
        let dir = TempDir::new().unwrap();
        let err = run_shell(dir.path(), DEFAULT_SHELL, "definitely-not-a-command-xyz")
            .await
            .unwrap_err();
        let repo_err = err.into_repo_error();
        assert_eq!(
            repo_err.hint.as_deref(),
            Some("check if the command is installed and in PATH")
        );
    }

    #[tokio::test]
    async fn test_missing_shell_is_spawn_error() {
        let dir = TempDir::new().unwrap();
        let err = run_shell(dir.path(), "/nonexistent/shell", "true")
            .await
            .unwrap_err();
        assert!(matches!(err, ShellError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_timeout() {
        let dir = TempDir::new().unwrap();
        let err = run_shell_with_timeout(
            dir.path(),
            DEFAULT_SHELL,
            "sleep 5",
            Duration::from_millis(100),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ShellError::Timeout(_)));
        assert!(err.into_repo_error().hint.is_some());
    }
}
