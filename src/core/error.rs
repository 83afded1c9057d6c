//! Per-repository error taxonomy carried inside a [`TaskResult`](super::TaskResult)

use serde::Serialize;
use thiserror::Error;

/// Category of a per-repository failure
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Repository directory, branch, tag or remote does not exist
    NotFound,
    /// Directory exists but is not a git repository
    NotGitRepo,
    /// Remote rejected the credentials
    AuthFailed,
    /// Remote could not be reached
    Network,
    /// Local modifications would be overwritten
    LocalChanges,
    /// Target (directory, tag) already exists
    AlreadyExists,
    /// Any other failure of the underlying operation
    OperationFailed,
    /// Work was not performed because the run was cancelled
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::NotGitRepo => "NOT_GIT_REPO",
            ErrorKind::AuthFailed => "AUTH_FAILED",
            ErrorKind::Network => "NETWORK_ERROR",
            ErrorKind::LocalChanges => "LOCAL_CHANGES",
            ErrorKind::AlreadyExists => "ALREADY_EXISTS",
            ErrorKind::OperationFailed => "OPERATION_FAILED",
            ErrorKind::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error produced by a task for one repository
///
/// `cause` keeps the rendered text of the underlying failure (git stderr, io error)
/// so results stay cheap to clone and serialize.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize)]
#[error("{message}{}{}",
    cause.as_ref().map(|c| format!(": {c}")).unwrap_or_default(),
    hint.as_ref().map(|h| format!("\n  hint: {h}")).unwrap_or_default())]
pub struct RepoError {
    pub kind: ErrorKind,
    pub message: String,
    pub cause: Option<String>,
    pub hint: Option<String>,
}

impl RepoError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
            hint: None,
        }
    }

    pub fn with_cause(mut self, cause: impl std::fmt::Display) -> Self {
        self.cause = Some(cause.to_string());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn not_cloned(path: &std::path::Path) -> Self {
        Self::new(
            ErrorKind::NotGitRepo,
            format!("repository not cloned: {}", path.display()),
        )
        .with_hint("run 'multi-git clone' first")
    }

    pub fn auth_failed(cause: impl std::fmt::Display) -> Self {
        Self::new(ErrorKind::AuthFailed, "authentication failed").with_cause(cause)
    }

    pub fn network(cause: impl std::fmt::Display) -> Self {
        Self::new(ErrorKind::Network, "network error").with_cause(cause)
    }

    pub fn local_changes() -> Self {
        Self::new(ErrorKind::LocalChanges, "local changes would be overwritten")
            .with_hint("use '-f' or '--force' to discard local changes")
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyExists, message)
    }

    pub fn operation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::OperationFailed, message)
    }

    pub fn cancelled(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, reason)
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}
