//! A single entry point for host interfaces.
//!
//! [`GitManager`] bundles directory setup, cloning and repository listing
//! behind one object, so a CLI, a desktop backend or a service can all expose
//! the same three operations without re-implementing any of them.

use crate::error::{Error, Result};
use crate::git_cli::{CommandLineGit, GitBackend};
use crate::models::{RepositoryInfo, ScanConfig, ScanContext};
use crate::scanner::{DefaultScanner, RepositoryScanner};
use crate::workspace::{self, CloneStatus, SetupStatus};
use std::path::Path;

/// Setup, clone and list operations sharing one configuration and git backend.
///
/// # Example
///
/// ```no_run
/// use git_repos_core::{GitManager, ScanContext};
/// use std::path::Path;
///
/// let manager = GitManager::new();
/// let root = Path::new("/home/user/projects");
///
/// println!("{}", manager.setup(root)?);
/// manager.git_clone("https://github.com/rust-lang/log.git", &root.join("log"), &ScanContext::new())?;
///
/// for repo in manager.list_repositories(root, &ScanContext::new())? {
///     println!("{} {} {}", repo.name, repo.last_commit_date, repo.branch_count);
/// }
/// # Ok::<(), git_repos_core::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct GitManager<G = CommandLineGit> {
    scanner: DefaultScanner<G>,
}

impl GitManager<CommandLineGit> {
    pub fn new() -> Self {
        Self::with_config(ScanConfig::default())
    }

    pub fn with_config(config: ScanConfig) -> Self {
        Self {
            scanner: DefaultScanner::with_config(config),
        }
    }
}

impl Default for GitManager<CommandLineGit> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: GitBackend> GitManager<G> {
    pub fn with_backend(config: ScanConfig, git: G) -> Self {
        Self {
            scanner: DefaultScanner::with_backend(config, git),
        }
    }

    pub fn scanner(&self) -> &DefaultScanner<G> {
        &self.scanner
    }

    /// Ensures `path` exists as a directory. See [`workspace::ensure_directory`].
    pub fn setup(&self, path: &Path) -> Result<SetupStatus> {
        workspace::ensure_directory(path)
    }

    /// Clones `url` into `target`.
    ///
    /// Clones have no time limit unless `ctx` carries one; the configured
    /// query timeout is meant for the quick metadata queries only.
    pub fn git_clone(&self, url: &str, target: &Path, ctx: &ScanContext) -> Result<CloneStatus> {
        if ctx.is_cancelled() {
            return Err(Error::Cancelled);
        }

        workspace::clone_repository(self.scanner.git(), url, target, ctx.effective_timeout(None))
    }

    /// Lists the repositories directly under `path`. See [`RepositoryScanner::scan`].
    pub fn list_repositories(&self, path: &Path, ctx: &ScanContext) -> Result<Vec<RepositoryInfo>> {
        self.scanner.scan(path, ctx)
    }
}
