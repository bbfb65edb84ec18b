//! Repository discovery and metadata aggregation.
//!
//! This module provides the core scanning logic: list the immediate children
//! of a parent directory, keep those that are Git repository roots, and ask git
//! for a little metadata about each. The main entry point is the
//! [`RepositoryScanner`] trait, with a default implementation in
//! [`DefaultScanner`].

use crate::error::{Error, Result};
use crate::git_cli::{count_branch_lines, CommandLineGit, GitBackend};
use crate::models::{RepositoryInfo, ScanConfig, ScanContext, NOT_AVAILABLE};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Name of the directory that marks a repository root.
pub const GIT_MARKER: &str = ".git";

/// Trait for discovering Git repositories directly below a directory.
///
/// # Example
///
/// ```no_run
/// use git_repos_core::{DefaultScanner, RepositoryScanner, ScanContext};
/// use std::path::Path;
///
/// let scanner = DefaultScanner::new();
/// let repos = scanner.scan(Path::new("/home/user/projects"), &ScanContext::new())?;
/// println!("Found {} repositories", repos.len());
/// # Ok::<(), git_repos_core::Error>(())
/// ```
pub trait RepositoryScanner {
    /// Scans the immediate subdirectories of `parent`.
    ///
    /// Returns one [`RepositoryInfo`] per subdirectory holding a `.git`
    /// directory, possibly none.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `parent` doesn't exist or isn't a directory ([`Error::NotADirectory`])
    /// - `parent` can't be listed ([`Error::ReadDir`])
    /// - the context was cancelled ([`Error::Cancelled`])
    ///
    /// Git failures for individual repositories never fail the scan.
    fn scan(&self, parent: &Path, ctx: &ScanContext) -> Result<Vec<RepositoryInfo>>;
}

/// Default implementation of the [`RepositoryScanner`] trait.
///
/// This scanner:
/// - Looks exactly one level deep, using `walkdir`
/// - Treats symlinks to directories as plain entries and skips them
/// - Requires `.git` to be a directory; a `.git` *file* (linked worktrees,
///   submodules) is not recognized
/// - Runs two git queries per repository, one after another, falling back to
///   `"N/A"` / `0` when a query fails
///
/// Repositories are processed sequentially, so output order is the
/// enumeration order (sorted by name unless [`ScanConfig::sort_by_name`] is
/// turned off).
#[derive(Debug, Clone)]
pub struct DefaultScanner<G = CommandLineGit> {
    config: ScanConfig,
    git: G,
}

impl DefaultScanner<CommandLineGit> {
    /// Creates a scanner with [`ScanConfig::default`] and the `git` executable.
    ///
    /// # Example
    ///
    /// ```
    /// use git_repos_core::DefaultScanner;
    ///
    /// let scanner = DefaultScanner::new();
    /// assert!(scanner.config().sort_by_name);
    /// ```
    pub fn new() -> Self {
        Self::with_config(ScanConfig::default())
    }

    /// Creates a scanner invoking `config.git_program`.
    pub fn with_config(config: ScanConfig) -> Self {
        let git = CommandLineGit::with_program(config.git_program.clone());
        Self { config, git }
    }
}

impl Default for DefaultScanner<CommandLineGit> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: GitBackend> DefaultScanner<G> {
    /// Creates a scanner that talks to git through `git`.
    pub fn with_backend(config: ScanConfig, git: G) -> Self {
        Self { config, git }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn git(&self) -> &G {
        &self.git
    }

    /// Queries git about one repository, substituting defaults for anything
    /// that fails.
    fn describe_repository(
        &self,
        name: String,
        path: &Path,
        timeout: Option<Duration>,
    ) -> RepositoryInfo {
        let last_commit_date = match self.git.last_commit_date(path, timeout) {
            Ok(date) if !date.is_empty() => date,
            Ok(_) => NOT_AVAILABLE.to_string(),
            Err(e) => {
                warn!(repo = %path.display(), error = %e, "could not read last commit date");
                NOT_AVAILABLE.to_string()
            }
        };

        let branch_count = match self.git.branch_listing(path, timeout) {
            Ok(listing) => count_branch_lines(&listing, self.config.branch_count_policy),
            Err(e) => {
                warn!(repo = %path.display(), error = %e, "could not list branches");
                0
            }
        };

        RepositoryInfo {
            name,
            last_commit_date,
            branch_count,
        }
    }
}

impl<G: GitBackend> RepositoryScanner for DefaultScanner<G> {
    fn scan(&self, parent: &Path, ctx: &ScanContext) -> Result<Vec<RepositoryInfo>> {
        if !parent.is_dir() {
            return Err(Error::not_a_directory(parent));
        }

        info!(parent = %parent.display(), "scanning for repositories");
        let timeout = ctx.effective_timeout(self.config.query_timeout);

        let mut walker = WalkDir::new(parent)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false);
        if self.config.sort_by_name {
            walker = walker.sort_by_file_name();
        }

        let mut repos = Vec::new();

        for entry in walker {
            if ctx.is_cancelled() {
                info!(parent = %parent.display(), found = repos.len(), "scan cancelled");
                return Err(Error::Cancelled);
            }

            let entry = match entry {
                Ok(e) => e,
                // Failing to list the parent itself means there is nothing to scan
                Err(e) if e.depth() == 0 => {
                    return Err(Error::read_dir(parent, walk_io_error(e)));
                }
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            let path = entry.path();
            if !is_repository_root(path) {
                debug!(dir = %path.display(), "not a repository");
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            debug!(repo = %name, "found repository");
            repos.push(self.describe_repository(name, path, timeout));
        }

        info!(parent = %parent.display(), found = repos.len(), "scan finished");
        Ok(repos)
    }
}

/// Unwraps the underlying I/O error so the path isn't reported twice.
fn walk_io_error(e: walkdir::Error) -> std::io::Error {
    if e.io_error().is_some() {
        let message = e.to_string();
        e.into_io_error()
            .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, message))
    } else {
        std::io::Error::from(e)
    }
}

/// Checks whether `path` contains a `.git` directory.
///
/// A `.git` file, as used by linked worktrees and submodules, does not count.
pub fn is_repository_root(path: &Path) -> bool {
    path.join(GIT_MARKER).is_dir()
}
