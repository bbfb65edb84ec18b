//! # git-repos-core
//!
//! A library for listing the Git repositories kept in one directory, with a
//! little metadata about each.
//!
//! ## Features
//!
//! - **One-level discovery** of repositories (subdirectories holding `.git`)
//! - **Best-effort metadata**: last commit date and branch count, queried from
//!   the `git` executable; a broken or empty repository still shows up
//! - **Workspace helpers** to create a directory and clone into it
//! - **Localization support** via Fluent (English, German, Portuguese)
//! - **JSON serialization** for all data structures
//!
//! ## Quick Start
//!
//! ```no_run
//! use git_repos_core::{DefaultScanner, RepositoryScanner, ScanContext};
//! use std::path::Path;
//!
//! let scanner = DefaultScanner::new();
//! let repos = scanner
//!     .scan(Path::new("/home/user/projects"), &ScanContext::new())
//!     .expect("Failed to scan");
//!
//! for repo in repos {
//!     println!("{}: {} ({} branches)", repo.name, repo.last_commit_date, repo.branch_count);
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`models`] - Data structures (RepositoryInfo, ScanConfig, ScanContext)
//! - [`scanner`] - Scanner trait and default implementation
//! - [`git_cli`] - Running `git` as a child process
//! - [`workspace`] - Directory setup and cloning
//! - [`manager`] - One object exposing setup, clone and list to host UIs
//! - [`error`] - Custom error types
//! - [`l10n`] - Localization utilities
//!
//! ## CLI Binary
//!
//! This crate also provides a `repos-cli` binary for command-line usage.
//! See the binary's `--help` output for details.

pub mod error;
pub mod git_cli;
pub mod l10n;
pub mod manager;
pub mod models;
pub mod scanner;
pub mod workspace;

// Re-export commonly used types for convenience
pub use error::{Error, Result};
pub use git_cli::{count_branch_lines, CommandLineGit, GitBackend};
pub use manager::GitManager;
pub use models::{
    BranchCountPolicy, CancellationToken, RepositoryInfo, ScanConfig, ScanContext, NOT_AVAILABLE,
};
pub use scanner::{is_repository_root, DefaultScanner, RepositoryScanner};
pub use workspace::{clone_repository, ensure_directory, CloneStatus, SetupStatus};

/// Library version, derived from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
