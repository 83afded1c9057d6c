//! Configuration errors

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("failed to determine home directory")]
    HomeDir,

    #[error("unsupported path format: {0} (use ~/path instead)")]
    UnsupportedPath(String),

    #[error("EMPTY_REPOSITORIES: at least one repository is required")]
    EmptyRepositories,

    #[error("INVALID_URL: invalid URL for repository '{name}': {reason} (field: repositories[].url)")]
    InvalidUrl { name: String, reason: String },

    #[error("DUPLICATE_NAME: duplicate repository name '{name}' found at index {first} and {second} (field: repositories[].name)")]
    DuplicateName {
        name: String,
        first: usize,
        second: usize,
    },

    #[error("PATH_CONFLICT: repositories '{first}' and '{second}' resolve to the same path: {} (field: repositories[].path)", path.display())]
    PathConflict {
        first: String,
        second: String,
        path: PathBuf,
    },

    #[error("INVALID_CONFIG: {message}{}", field.as_ref().map(|f| format!(" (field: {f})")).unwrap_or_default())]
    Invalid {
        message: String,
        field: Option<String>,
    },
}

impl ConfigError {
    pub(crate) fn invalid(message: impl Into<String>, field: &str) -> Self {
        ConfigError::Invalid {
            message: message.into(),
            field: Some(field.to_string()),
        }
    }
}
