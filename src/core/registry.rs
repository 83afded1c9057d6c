//! Repository registry: path resolution and parallelism policy

use std::path::{Path, PathBuf};

use crate::config::{Config, Repository};

use super::config::DEFAULT_PARALLEL_WORKERS;

/// The set of repositories a command operates on
///
/// Built once per invocation from a validated [`Config`]; read-only afterwards.
#[derive(Clone, Debug)]
pub struct Registry {
    base_dir: PathBuf,
    default_remote: String,
    parallel_workers: i64,
    repositories: Vec<Repository>,
}

impl Registry {
    pub fn new(config: Config) -> Self {
        Self {
            base_dir: config.base_dir,
            default_remote: config.default_remote,
            parallel_workers: config.parallel_workers,
            repositories: config.repositories,
        }
    }

    /// Overrides the configured worker count; values `<= 0` keep the configuration
    pub fn with_parallelism(mut self, workers: i64) -> Self {
        if workers > 0 {
            self.parallel_workers = workers;
        }
        self
    }

    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    pub fn count(&self) -> usize {
        self.repositories.len()
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn default_remote(&self) -> &str {
        &self.default_remote
    }

    /// Number of workers to use; non-positive configuration falls back to the default
    pub fn parallelism(&self) -> usize {
        if self.parallel_workers <= 0 {
            return DEFAULT_PARALLEL_WORKERS;
        }
        usize::try_from(self.parallel_workers).unwrap_or(usize::MAX).max(1)
    }

    pub fn repository_path(&self, repo: &Repository) -> PathBuf {
        repo.resolve_path(&self.base_dir)
    }

    pub fn exists(&self, repo: &Repository) -> bool {
        self.repository_path(repo).is_dir()
    }

    /// True when the resolved path contains a `.git` directory
    pub fn is_repository(&self, repo: &Repository) -> bool {
        self.repository_path(repo).join(".git").is_dir()
    }

    pub fn ensure_base_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.base_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn registry(base_dir: &Path, workers: i64, repos: Vec<Repository>) -> Registry {
        Registry::new(Config {
            base_dir: base_dir.to_path_buf(),
            default_remote: "origin".to_string(),
            parallel_workers: workers,
            repositories: repos,
        })
    }

    #[test]
    fn test_repository_path_uses_name_by_default() {
        let reg = registry(Path::new("/work"), 3, vec![]);
        let repo = Repository::new("api", "git@github.com:acme/api.git");
        assert_eq!(reg.repository_path(&repo), PathBuf::from("/work/api"));
    }

    #[test]
    fn test_repository_path_prefers_override() {
        let reg = registry(Path::new("/work"), 3, vec![]);
        let repo = Repository::new("api", "git@github.com:acme/api.git").with_path("services/api");
        assert_eq!(reg.repository_path(&repo), PathBuf::from("/work/services/api"));
    }

    #[test]
    fn test_parallelism_defaults_for_non_positive_values() {
        assert_eq!(registry(Path::new("/w"), 0, vec![]).parallelism(), 3);
        assert_eq!(registry(Path::new("/w"), -4, vec![]).parallelism(), 3);
        assert_eq!(registry(Path::new("/w"), 1, vec![]).parallelism(), 1);
        assert_eq!(registry(Path::new("/w"), 8, vec![]).parallelism(), 8);
    }

    #[test]
    fn test_with_parallelism_override() {
        let reg = registry(Path::new("/w"), 3, vec![]);
        assert_eq!(reg.clone().with_parallelism(0).parallelism(), 3);
        assert_eq!(reg.clone().with_parallelism(-1).parallelism(), 3);
        assert_eq!(reg.with_parallelism(6).parallelism(), 6);
    }

    #[test]
    fn test_exists_and_is_repository() {
        let dir = TempDir::new().unwrap();
        let plain = Repository::new("plain", "https://example.com/plain.git");
        let git = Repository::new("git", "https://example.com/git.git");
        let missing = Repository::new("missing", "https://example.com/missing.git");
        std::fs::create_dir(dir.path().join("plain")).unwrap();
        std::fs::create_dir_all(dir.path().join("git/.git")).unwrap();

        let reg = registry(dir.path(), 3, vec![plain.clone(), git.clone(), missing.clone()]);
        assert_eq!(reg.count(), 3);
        assert!(reg.exists(&plain));
        assert!(!reg.is_repository(&plain));
        assert!(reg.is_repository(&git));
        assert!(!reg.exists(&missing));
    }

    #[test]
    fn test_ensure_base_dir_creates_nested_dirs() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("a/b/c");
        let reg = registry(&base, 3, vec![]);
        reg.ensure_base_dir().unwrap();
        assert!(base.is_dir());
    }
}
