//! Test fixtures and builders

use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use multi_git::config::{Config, Repository};
use multi_git::core::Registry;

use super::git::{create_bare_remote, git};

/// A workspace holding bare remotes and the base directory clones land in
pub struct TestFleet {
    pub temp_dir: TempDir,
    pub repositories: Vec<Repository>,
    workers: i64,
}

impl TestFleet {
    /// Creates one bare remote per name
    pub fn new(names: &[&str]) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let remotes = temp_dir.path().join("remotes");
        std::fs::create_dir_all(&remotes)?;

        let mut repositories = Vec::with_capacity(names.len());
        for name in names {
            let remote = create_bare_remote(&remotes, name)?;
            repositories.push(Repository::new(*name, remote.to_string_lossy()));
        }

        Ok(Self {
            temp_dir,
            repositories,
            workers: 1,
        })
    }

    pub fn with_workers(mut self, workers: i64) -> Self {
        self.workers = workers;
        self
    }

    pub fn base_dir(&self) -> PathBuf {
        self.temp_dir.path().join("repos")
    }

    /// Path of the named repository's bare remote
    pub fn remote(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join("remotes").join(format!("{name}.git"))
    }

    /// Working copy path of the named repository
    pub fn checkout_path(&self, name: &str) -> PathBuf {
        self.base_dir().join(name)
    }

    pub fn config(&self) -> Config {
        Config {
            base_dir: self.base_dir(),
            default_remote: "origin".to_string(),
            parallel_workers: self.workers,
            repositories: self.repositories.clone(),
        }
    }

    pub fn registry(&self) -> Registry {
        Registry::new(self.config())
    }

    /// Clones every remote into the base directory with plain git
    pub fn clone_all(&self) -> Result<()> {
        std::fs::create_dir_all(self.base_dir())?;
        for repo in &self.repositories {
            git(&self.base_dir(), &["clone", &repo.url, &repo.name])?;
            super::git::configure_user(&self.checkout_path(&repo.name))?;
        }
        Ok(())
    }
}

/// Builds an in-memory registry of repositories that never touch disk
pub fn offline_registry(base_dir: &Path, count: usize, workers: i64) -> Registry {
    let repositories = (0..count)
        .map(|i| Repository::new(format!("repo-{i}"), format!("https://github.com/test/repo-{i}.git")))
        .collect();
    Registry::new(Config {
        base_dir: base_dir.to_path_buf(),
        default_remote: "origin".to_string(),
        parallel_workers: workers,
        repositories,
    })
}
