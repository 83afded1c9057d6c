//! Structural validation of a loaded configuration

use regex::Regex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

use super::{Config, ConfigError, Repository};

const HTTPS_URL_PATTERN: &str =
    r"^https://[a-zA-Z0-9][a-zA-Z0-9\-]*[a-zA-Z0-9]*(\.[a-zA-Z0-9][a-zA-Z0-9\-]*[a-zA-Z0-9]*)*(/.*)?\.git$";
const SSH_URL_PATTERN: &str =
    r"^git@[a-zA-Z0-9][a-zA-Z0-9\-]*[a-zA-Z0-9]*(\.[a-zA-Z0-9][a-zA-Z0-9\-]*[a-zA-Z0-9]*)+:.*\.git$";

fn url_patterns() -> &'static (Regex, Regex) {
    static PATTERNS: OnceLock<(Regex, Regex)> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        (
            Regex::new(HTTPS_URL_PATTERN).expect("static HTTPS pattern is valid"),
            Regex::new(SSH_URL_PATTERN).expect("static SSH pattern is valid"),
        )
    })
}

/// Validates a configuration; the first violation found is returned
///
/// Checks run in order: required fields, URL format, duplicate names,
/// resolved path conflicts, defaults.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    validate_required_fields(&config.repositories)?;
    for repo in &config.repositories {
        validate_url(&repo.url).map_err(|reason| ConfigError::InvalidUrl {
            name: repo.name.clone(),
            reason,
        })?;
    }
    check_duplicate_names(&config.repositories)?;
    check_path_conflicts(config)?;
    validate_defaults(config)
}

/// Accepts `https://host/path.git` and `git@host:path.git`
pub fn validate_url(url: &str) -> Result<(), String> {
    if url.trim().is_empty() {
        return Err("URL is empty".to_string());
    }
    let (https, ssh) = url_patterns();
    if https.is_match(url) || ssh.is_match(url) {
        Ok(())
    } else {
        Err("URL must be in HTTPS (https://host/path.git) or SSH (git@host:path.git) format"
            .to_string())
    }
}

fn validate_required_fields(repos: &[Repository]) -> Result<(), ConfigError> {
    if repos.is_empty() {
        return Err(ConfigError::EmptyRepositories);
    }

    for (i, repo) in repos.iter().enumerate() {
        if repo.name.trim().is_empty() {
            return Err(ConfigError::invalid(
                format!("repository name is required (index: {i})"),
                "repositories[].name",
            ));
        }
        if repo.url.trim().is_empty() {
            return Err(ConfigError::invalid(
                format!("repository URL is required (index: {i}, name: {})", repo.name),
                "repositories[].url",
            ));
        }
    }
    Ok(())
}

fn check_duplicate_names(repos: &[Repository]) -> Result<(), ConfigError> {
    let mut seen: HashMap<&str, usize> = HashMap::with_capacity(repos.len());
    for (i, repo) in repos.iter().enumerate() {
        let name = repo.name.trim();
        if let Some(&first) = seen.get(name) {
            return Err(ConfigError::DuplicateName {
                name: name.to_string(),
                first,
                second: i,
            });
        }
        seen.insert(name, i);
    }
    Ok(())
}

fn check_path_conflicts(config: &Config) -> Result<(), ConfigError> {
    let mut seen: HashMap<PathBuf, &str> = HashMap::with_capacity(config.repositories.len());
    for repo in &config.repositories {
        let resolved = repo.resolve_path(&config.base_dir);
        let path = std::path::absolute(&resolved).unwrap_or(resolved);
        let path = normalize(&path);
        if let Some(existing) = seen.get(&path) {
            return Err(ConfigError::PathConflict {
                first: existing.to_string(),
                second: repo.name.clone(),
                path,
            });
        }
        seen.insert(path, &repo.name);
    }
    Ok(())
}

/// Lexically removes `.` and `..` components so `a/../b` and `b` compare equal
fn normalize(path: &std::path::Path) -> PathBuf {
    use std::path::Component;

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn validate_defaults(config: &Config) -> Result<(), ConfigError> {
    if config.parallel_workers < 1 {
        return Err(ConfigError::invalid(
            format!(
                "parallel_workers must be at least 1, got {}",
                config.parallel_workers
            ),
            "config.parallel_workers",
        ));
    }
    if config.default_remote.trim().is_empty() {
        return Err(ConfigError::invalid(
            "default_remote cannot be empty",
            "config.default_remote",
        ));
    }
    Ok(())
}
