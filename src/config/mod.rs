//! Configuration file model, loading and validation
//!
//! The configuration lists the managed repositories together with the base
//! directory they live under, the default remote and the worker count:
//!
//! ```yaml
//! config:
//!   base_dir: ~/work
//!   default_remote: origin
//!   parallel_workers: 3
//! repositories:
//!   - name: api
//!     url: git@github.com:acme/api.git
//!     path: services/api
//! ```

pub mod error;
pub mod loader;
pub mod validator;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::ConfigError;
pub use loader::{default_config_path, expand_path, load_config};
pub use validator::{validate_config, validate_url};

pub const DEFAULT_REMOTE: &str = "origin";

/// One managed repository as written in the configuration file
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Repository {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// `base_dir/path` when a path override is set, `base_dir/name` otherwise
    pub fn resolve_path(&self, base_dir: &Path) -> PathBuf {
        match self.path.as_deref() {
            Some(path) if !path.is_empty() => base_dir.join(path),
            _ => base_dir.join(&self.name),
        }
    }
}

/// The `config:` section of the file
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConfigSection {
    #[serde(default)]
    pub base_dir: String,
    #[serde(default)]
    pub default_remote: String,
    #[serde(default)]
    pub parallel_workers: i64,
}

/// Raw on-disk layout
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub config: ConfigSection,
    #[serde(default)]
    pub repositories: Vec<Repository>,
}

/// Processed configuration with expanded paths and defaults applied
#[derive(Clone, Debug)]
pub struct Config {
    pub base_dir: PathBuf,
    pub default_remote: String,
    pub parallel_workers: i64,
    pub repositories: Vec<Repository>,
}

/// Loads the configuration file and validates it
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let config = load_config(path)?;
    validate_config(&config)?;
    Ok(config)
}
