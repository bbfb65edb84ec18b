//! Directory setup and repository cloning.
//!
//! Small helpers host interfaces call before or after a scan: make sure a
//! workspace directory exists, and clone a remote repository into it. Each
//! returns a status value that renders as a human-readable message, either
//! through [`Display`](std::fmt::Display) (English) or through a
//! [`Localizer`](crate::l10n::Localizer) via [`message_id`](SetupStatus::message_id).

use crate::error::{Error, Result};
use crate::git_cli::GitBackend;
use std::fmt;
use std::fs::{self, DirBuilder};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Permission bits for directories created by [`ensure_directory`].
#[cfg(unix)]
const DIRECTORY_MODE: u32 = 0o755;

/// Outcome of [`ensure_directory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupStatus {
    /// The directory was already there; nothing was changed.
    AlreadyExists(PathBuf),
    /// The directory (and any missing parents) was created.
    Created(PathBuf),
}

impl SetupStatus {
    pub fn path(&self) -> &Path {
        match self {
            SetupStatus::AlreadyExists(path) | SetupStatus::Created(path) => path,
        }
    }

    /// Fluent message id describing this outcome. Takes a `path` argument.
    pub fn message_id(&self) -> &'static str {
        match self {
            SetupStatus::AlreadyExists(_) => "setup-exists",
            SetupStatus::Created(_) => "setup-created",
        }
    }
}

impl fmt::Display for SetupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupStatus::AlreadyExists(path) => {
                write!(f, "Directory already exists: {}", path.display())
            }
            SetupStatus::Created(path) => {
                write!(f, "Directory created successfully: {}", path.display())
            }
        }
    }
}

/// Outcome of a successful [`clone_repository`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneStatus {
    pub url: String,
    pub target: PathBuf,
}

impl CloneStatus {
    /// Fluent message id for a finished clone. Takes a `path` argument.
    pub fn message_id(&self) -> &'static str {
        "clone-success"
    }
}

impl fmt::Display for CloneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repository cloned successfully into: {}",
            self.target.display()
        )
    }
}

/// Makes sure `path` exists as a directory, creating missing parents.
///
/// New directories get mode `0755` on Unix.
///
/// # Errors
///
/// - [`Error::NotADirectory`] if something other than a directory is at `path`
/// - [`Error::Io`] if the directory can't be inspected or created
///
/// # Example
///
/// ```no_run
/// use git_repos_core::workspace::{ensure_directory, SetupStatus};
/// use std::path::Path;
///
/// let status = ensure_directory(Path::new("/home/user/projects"))?;
/// println!("{}", status);
/// # Ok::<(), git_repos_core::Error>(())
/// ```
pub fn ensure_directory(path: &Path) -> Result<SetupStatus> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(SetupStatus::AlreadyExists(path.to_path_buf())),
        Ok(_) => Err(Error::not_a_directory(path)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            directory_builder().create(path)?;
            info!(path = %path.display(), "created directory");
            Ok(SetupStatus::Created(path.to_path_buf()))
        }
        Err(e) => Err(Error::Io(e)),
    }
}

fn directory_builder() -> DirBuilder {
    let mut builder = DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIRECTORY_MODE);
    }

    builder
}

/// Clones `url` into `target` using `git`.
///
/// # Errors
///
/// Any git failure is returned as-is; [`Error::GitFailed`] carries git's
/// combined output so the caller can show why the clone failed.
pub fn clone_repository<G: GitBackend + ?Sized>(
    git: &G,
    url: &str,
    target: &Path,
    timeout: Option<Duration>,
) -> Result<CloneStatus> {
    info!(url, target = %target.display(), "cloning repository");
    git.clone_repository(url, target, timeout)?;

    Ok(CloneStatus {
        url: url.to_string(),
        target: target.to_path_buf(),
    })
}
