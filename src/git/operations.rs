//! Git command execution and stderr classification

use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

use crate::core::{ErrorKind, RepoError, GIT_OPERATION_TIMEOUT_SECS};

/// Output of a finished git invocation
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GitOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs a git command in the specified directory with the default timeout
pub async fn run_git(path: &Path, args: &[&str]) -> Result<GitOutput, RepoError> {
    run_git_with_timeout(path, args, Duration::from_secs(GIT_OPERATION_TIMEOUT_SECS)).await
}

/// Runs a git command in the specified directory with a timeout
///
/// A non-zero exit is reported through [`GitOutput::success`]; only spawn
/// failures and timeouts are errors. The child is killed on timeout.
pub async fn run_git_with_timeout(
    path: &Path,
    args: &[&str],
    timeout: Duration,
) -> Result<GitOutput, RepoError> {
    log::debug!("git {} (in {})", args.join(" "), path.display());

    let result = tokio::time::timeout(
        timeout,
        Command::new("git")
            .args(args)
            .current_dir(path)
            .env("GIT_TERMINAL_PROMPT", "0")
            .kill_on_drop(true)
            .output(),
    )
    .await;

    match result {
        Ok(Ok(output)) => Ok(GitOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }),
        Ok(Err(e)) => Err(RepoError::operation_failed("failed to run git").with_cause(e)),
        Err(_) => Err(RepoError::network(format!(
            "git {} timed out after {} seconds",
            args.first().copied().unwrap_or_default(),
            timeout.as_secs()
        ))),
    }
}

/// Maps git's stderr to an error category
pub fn classify_stderr(stderr: &str) -> ErrorKind {
    let lower = stderr.to_lowercase();

    if lower.contains("not a git repository") {
        ErrorKind::NotGitRepo
    } else if is_auth_failure(&lower) {
        ErrorKind::AuthFailed
    } else if lower.contains("could not resolve host")
        || lower.contains("connection refused")
        || lower.contains("connection timed out")
        || lower.contains("connection reset")
        || lower.contains("network is unreachable")
        || lower.contains("could not read from remote repository")
    {
        ErrorKind::Network
    } else {
        ErrorKind::OperationFailed
    }
}

/// Auth markers only in the forms git emits them; stderr also echoes ref and
/// file names, so bare status codes or "permission denied" are not enough
fn is_auth_failure(lower: &str) -> bool {
    const HTTP_AUTH: [&str; 4] = [
        "returned error: 401",
        "returned error: 403",
        "http 401",
        "http 403",
    ];

    lower.contains("authentication failed")
        || lower.contains("could not read username")
        || lower.contains("could not read password")
        || lower.contains("permission denied (publickey")
        || (lower.contains("permission denied")
            && lower.contains("could not read from remote repository"))
        || HTTP_AUTH.iter().any(|marker| lower.contains(marker))
}

/// Builds the error for a failed git `operation` from its stderr
pub fn git_error(operation: &str, stderr: &str) -> RepoError {
    let kind = classify_stderr(stderr);
    let message = match kind {
        ErrorKind::NotGitRepo => format!("not a git repository: {operation}"),
        ErrorKind::AuthFailed => format!("authentication failed: {operation}"),
        ErrorKind::Network => format!("network error: {operation}"),
        _ => format!("{operation} failed"),
    };

    let mut err = RepoError::new(kind, message);
    if !stderr.is_empty() {
        err = err.with_cause(first_meaningful_line(stderr));
    }
    match kind {
        ErrorKind::AuthFailed => err.with_hint("check your credentials or SSH key"),
        ErrorKind::Network => err.with_hint("check your network connection"),
        _ => err,
    }
}

/// Picks the `fatal:`/`error:` line out of multi-line git stderr
fn first_meaningful_line(stderr: &str) -> &str {
    stderr
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("fatal:") || line.starts_with("error:"))
        .or_else(|| stderr.lines().map(str::trim).find(|line| !line.is_empty()))
        .unwrap_or(stderr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_stderr() {
        assert_eq!(
            classify_stderr("fatal: not a git repository (or any of the parent directories): .git"),
            ErrorKind::NotGitRepo
        );
        assert_eq!(
            classify_stderr("git@github.com: Permission denied (publickey)."),
            ErrorKind::AuthFailed
        );
        assert_eq!(
            classify_stderr("fatal: unable to access 'https://x/': The requested URL returned error: 403"),
            ErrorKind::AuthFailed
        );
        assert_eq!(
            classify_stderr("ssh: Could not resolve hostname example.invalid"),
            ErrorKind::Network
        );
        assert_eq!(
            classify_stderr("error: pathspec 'nope' did not match any file(s) known to git"),
            ErrorKind::OperationFailed
        );
    }

    #[test]
    fn test_classify_stderr_ignores_codes_in_names() {
        assert_eq!(
            classify_stderr("fatal: couldn't find remote ref hotfix-403"),
            ErrorKind::OperationFailed
        );
        assert_eq!(
            classify_stderr("error: pathspec 'release-401' did not match any file(s) known to git"),
            ErrorKind::OperationFailed
        );
        assert_eq!(
            classify_stderr("error: unable to create file src/a.rs: Permission denied"),
            ErrorKind::OperationFailed
        );
        assert_eq!(
            classify_stderr(
                "git@host: Permission denied.\nfatal: Could not read from remote repository."
            ),
            ErrorKind::AuthFailed
        );
        assert_eq!(
            classify_stderr("fatal: unable to access 'https://x/': The requested URL returned error: 401"),
            ErrorKind::AuthFailed
        );
    }

    #[test]
    fn test_git_error_local_permission_has_no_credentials_hint() {
        let err = git_error("checkout", "error: unable to unlink old 'a.txt': Permission denied");
        assert_eq!(err.kind, ErrorKind::OperationFailed);
        assert!(err.hint.is_none());
    }

    #[test]
    fn test_git_error_keeps_fatal_line() {
        let err = git_error(
            "pull",
            "hint: something\nfatal: Not possible to fast-forward, aborting.",
        );
        assert_eq!(err.kind, ErrorKind::OperationFailed);
        assert_eq!(err.message, "pull failed");
        assert_eq!(
            err.cause.as_deref(),
            Some("fatal: Not possible to fast-forward, aborting.")
        );
    }

    #[test]
    fn test_git_error_adds_hints() {
        let err = git_error("push", "Permission denied (publickey).");
        assert_eq!(err.kind, ErrorKind::AuthFailed);
        assert!(err.hint.is_some());
    }

    #[tokio::test]
    async fn test_run_git_reports_exit_status() {
        if std::process::Command::new("git").arg("--version").output().is_err() {
            return;
        }
        let dir = tempfile::TempDir::new().unwrap();
        let output = run_git(dir.path(), &["rev-parse", "--git-dir"]).await.unwrap();
        assert!(!output.success);
        assert_eq!(classify_stderr(&output.stderr), ErrorKind::NotGitRepo);
    }
}
