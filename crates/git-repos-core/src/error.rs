//! Error types for git-repos-core.
//!
//! This module defines a custom error type using `thiserror` for the library's
//! public API, while using `anyhow` internally for error propagation in the CLI.
//!
//! Only a handful of these are ever returned from a scan: [`Error::NotADirectory`],
//! [`Error::ReadDir`] and [`Error::Cancelled`]. Git query failures are absorbed
//! into default values by the scanner and only surface from the setup and clone
//! utilities.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// A specialized Result type for git-repos-core operations.
///
/// This is a convenience alias that uses our custom [`Error`] type.
///
/// # Example
///
/// ```
/// use git_repos_core::Result;
///
/// fn list_names() -> Result<Vec<String>> {
///     Ok(vec!["alpha".to_string()])
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while scanning, creating directories or cloning.
#[derive(Error, Debug)]
pub enum Error {
    /// An I/O error occurred while accessing the filesystem.
    ///
    /// Raised by directory creation; scans report enumeration failures as
    /// [`Error::ReadDir`] instead.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The path is missing or is not a directory.
    ///
    /// Fatal for a scan. Also returned by directory setup when a file already
    /// occupies the requested path.
    #[error("Path is not a valid directory: {0}")]
    NotADirectory(PathBuf),

    /// Listing the entries of a directory failed (e.g. permission denied).
    #[error("Failed to read directory {path}: {source}")]
    ReadDir {
        /// The directory that couldn't be listed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The git executable could not be started.
    #[error("Failed to run {program}: {source}")]
    GitSpawn {
        /// The program that was invoked.
        program: String,
        /// The underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// Git ran but exited unsuccessfully.
    #[error("git {args} failed ({status}): {output}")]
    GitFailed {
        /// Space-joined arguments passed to git.
        args: String,
        /// Human-readable exit status.
        status: String,
        /// Text git printed before failing.
        output: String,
    },

    /// Git did not finish within the allotted time and was killed.
    #[error("git {args} timed out after {timeout:?}")]
    GitTimeout {
        /// Space-joined arguments passed to git.
        args: String,
        /// The timeout that expired.
        timeout: Duration,
    },

    /// The operation was cancelled through its [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,

    /// Localization system error.
    ///
    /// This covers errors in loading or using Fluent translation files.
    #[error("Localization error: {0}")]
    L10n(String),
}

// Helper constructors for common error cases
impl Error {
    /// Creates a NotADirectory error.
    ///
    /// # Example
    ///
    /// ```ignore
    /// return Err(Error::not_a_directory(path));
    /// ```
    pub fn not_a_directory(path: impl Into<PathBuf>) -> Self {
        Error::NotADirectory(path.into())
    }

    /// Creates a ReadDir error.
    pub fn read_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::ReadDir {
            path: path.into(),
            source,
        }
    }

    /// Creates a GitSpawn error.
    pub fn git_spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Error::GitSpawn {
            program: program.into(),
            source,
        }
    }

    /// Creates a GitFailed error.
    pub fn git_failed(
        args: impl Into<String>,
        status: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Error::GitFailed {
            args: args.into(),
            status: status.into(),
            output: output.into(),
        }
    }

    /// Creates a GitTimeout error.
    pub fn git_timeout(args: impl Into<String>, timeout: Duration) -> Self {
        Error::GitTimeout {
            args: args.into(),
            timeout,
        }
    }

    /// Creates an L10n error.
    pub fn l10n(message: impl Into<String>) -> Self {
        Error::L10n(message.into())
    }

    /// Whether this error came from invoking git (as opposed to the filesystem).
    pub fn is_git_error(&self) -> bool {
        matches!(
            self,
            Error::GitSpawn { .. } | Error::GitFailed { .. } | Error::GitTimeout { .. }
        )
    }
}
