//! Reads a configuration file from disk and applies defaults

use std::path::{Path, PathBuf};

use super::{Config, ConfigError, ConfigFile, DEFAULT_REMOTE};
use crate::core::config::DEFAULT_PARALLEL_WORKERS;

const CONFIG_DIR_NAME: &str = ".multi-git";
const CONFIG_FILE_NAME: &str = "config.yaml";

/// `~/.multi-git/config.yaml`, or a relative path when no home directory is known
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("~"))
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

/// Expands a leading `~` or `~/` to the home directory
///
/// `~user` forms are rejected. Other paths are returned unchanged.
pub fn expand_path(path: &str) -> Result<PathBuf, ConfigError> {
    if path.is_empty() {
        return Err(ConfigError::invalid("path is empty", "path"));
    }

    if !path.starts_with('~') {
        return Ok(PathBuf::from(path));
    }

    let home = dirs::home_dir().ok_or(ConfigError::HomeDir)?;
    if path == "~" {
        Ok(home)
    } else if let Some(rest) = path.strip_prefix("~/") {
        Ok(home.join(rest))
    } else {
        Err(ConfigError::UnsupportedPath(path.to_string()))
    }
}

/// Parses file contents; `.toml` files are read as TOML, everything else as YAML
pub fn parse_config_file(path: &Path, contents: &str) -> Result<ConfigFile, ConfigError> {
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let parsed = if is_toml {
        toml::from_str::<ConfigFile>(contents).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str::<ConfigFile>(contents).map_err(|e| e.to_string())
    };

    parsed.map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Loads a configuration file without validating it
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let raw = path.as_ref().to_string_lossy();
    let path = expand_path(&raw)?;

    if !path.exists() {
        return Err(ConfigError::NotFound(path));
    }

    let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let file = parse_config_file(&path, &contents)?;
    log::debug!(
        "loaded {} repositories from {}",
        file.repositories.len(),
        path.display()
    );

    into_config(file)
}

/// Applies defaults and resolves `base_dir` to an absolute path
pub fn into_config(file: ConfigFile) -> Result<Config, ConfigError> {
    if file.config.base_dir.trim().is_empty() {
        return Err(ConfigError::invalid("base_dir is required", "config.base_dir"));
    }
    let base_dir = expand_path(&file.config.base_dir)?;
    let base_dir = std::path::absolute(&base_dir).map_err(|e| {
        ConfigError::invalid(
            format!("failed to get absolute path for base_dir: {e}"),
            "config.base_dir",
        )
    })?;

    let default_remote = if file.config.default_remote.is_empty() {
        DEFAULT_REMOTE.to_string()
    } else {
        file.config.default_remote
    };

    let parallel_workers = if file.config.parallel_workers <= 0 {
        DEFAULT_PARALLEL_WORKERS as i64
    } else {
        file.config.parallel_workers
    };

    Ok(Config {
        base_dir,
        default_remote,
        parallel_workers,
        repositories: file.repositories,
    })
}
