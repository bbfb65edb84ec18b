//! Git invocation through the `git` command-line executable.
//!
//! Git is treated as a black box: every query runs a short-lived child process
//! with the repository as its working directory and consumes its standard
//! output as text. The [`GitBackend`] trait is the seam the scanner and the
//! clone utility depend on, so hosts and tests can substitute their own
//! implementation.

use crate::error::{Error, Result};
use crate::models::BranchCountPolicy;
use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How often a running child is checked while a timeout is in effect.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Operations the scanner and clone utility need from git.
///
/// Implementations must not write to the repositories they query.
///
/// When a call times out, only the process it spawned is killed. Helpers that
/// process started itself (e.g. `git-remote-https` during a clone) are not
/// tracked and may keep running until they notice their parent is gone; the
/// call itself still returns as soon as the timeout expires.
pub trait GitBackend {
    /// Returns the committer date of the most recent commit on `HEAD`.
    ///
    /// # Errors
    ///
    /// Fails for repositories without commits, or when git cannot run.
    fn last_commit_date(&self, repo: &Path, timeout: Option<Duration>) -> Result<String>;

    /// Returns the raw listing of local and remote-tracking branches.
    fn branch_listing(&self, repo: &Path, timeout: Option<Duration>) -> Result<String>;

    /// Clones `url` into `target`.
    ///
    /// # Errors
    ///
    /// On failure the error carries everything git printed to stdout and stderr.
    fn clone_repository(&self, url: &str, target: &Path, timeout: Option<Duration>)
        -> Result<()>;
}

/// [`GitBackend`] that shells out to a `git` executable.
///
/// # Example
///
/// ```no_run
/// use git_repos_core::{CommandLineGit, GitBackend};
/// use std::path::Path;
///
/// let git = CommandLineGit::new();
/// let date = git.last_commit_date(Path::new("/path/to/repo"), None)?;
/// println!("last commit: {}", date);
/// # Ok::<(), git_repos_core::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct CommandLineGit {
    program: PathBuf,
}

/// Captured output of a finished git process.
struct GitOutput {
    status: ExitStatus,
    stdout: String,
    stderr: String,
}

impl CommandLineGit {
    /// Uses `git` from `PATH`.
    pub fn new() -> Self {
        Self::with_program("git")
    }

    /// Uses a specific executable, e.g. an absolute path to git.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The executable this backend invokes.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Runs a query and returns its trimmed standard output.
    ///
    /// A non-zero exit becomes [`Error::GitFailed`] carrying the trimmed stderr.
    fn query<S: AsRef<OsStr>>(
        &self,
        repo: &Path,
        args: &[S],
        timeout: Option<Duration>,
    ) -> Result<String> {
        let output = self.execute(Some(repo), args, timeout)?;

        if output.status.success() {
            Ok(output.stdout.trim().to_string())
        } else {
            Err(Error::git_failed(
                describe_args(args),
                output.status.to_string(),
                output.stderr.trim(),
            ))
        }
    }

    /// Spawns the program, waits for it (killing it once `timeout` expires)
    /// and collects both output streams.
    fn execute<S: AsRef<OsStr>>(
        &self,
        dir: Option<&Path>,
        args: &[S],
        timeout: Option<Duration>,
    ) -> Result<GitOutput> {
        let described = describe_args(args);
        debug!(
            program = %self.program.display(),
            args = %described,
            dir = ?dir,
            "running git"
        );

        let mut command = Command::new(&self.program);
        command
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = dir {
            command.current_dir(dir);
        }

        let mut child = command
            .spawn()
            .map_err(|e| Error::git_spawn(self.program.display().to_string(), e))?;

        // Drain both pipes concurrently so a chatty child can't block on a full pipe
        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        let status = match timeout {
            None => child.wait()?,
            Some(limit) => match wait_with_timeout(&mut child, limit)? {
                Some(status) => status,
                None => {
                    warn!(args = %described, ?limit, "git timed out and was killed");
                    // Not joining the readers: a grandchild may still hold the
                    // pipes open, and waiting on it would defeat the timeout.
                    return Err(Error::git_timeout(described, limit));
                }
            },
        };

        let output = GitOutput {
            status,
            stdout: join_reader(stdout),
            stderr: join_reader(stderr),
        };

        debug!(args = %described, status = %output.status, "git finished");
        Ok(output)
    }
}

impl Default for CommandLineGit {
    fn default() -> Self {
        Self::new()
    }
}

impl GitBackend for CommandLineGit {
    fn last_commit_date(&self, repo: &Path, timeout: Option<Duration>) -> Result<String> {
        self.query(repo, &["log", "-1", "--format=%cd"], timeout)
    }

    fn branch_listing(&self, repo: &Path, timeout: Option<Duration>) -> Result<String> {
        self.query(repo, &["branch", "-a"], timeout)
    }

    fn clone_repository(
        &self,
        url: &str,
        target: &Path,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let args: [&OsStr; 3] = [OsStr::new("clone"), OsStr::new(url), target.as_os_str()];
        let output = self.execute(None, &args, timeout)?;

        if output.status.success() {
            return Ok(());
        }

        let mut combined = output.stdout;
        combined.push_str(&output.stderr);
        Err(Error::git_failed(
            describe_args(&args),
            output.status.to_string(),
            combined.trim(),
        ))
    }
}

/// Counts the branches in a `git branch -a` listing.
///
/// # Examples
///
/// ```
/// # use git_repos_core::{count_branch_lines, BranchCountPolicy};
/// let listing = "* main\n  remotes/origin/main\n";
/// assert_eq!(count_branch_lines(listing, BranchCountPolicy::NonEmptyLines), 2);
/// assert_eq!(count_branch_lines(listing, BranchCountPolicy::AllLines), 3);
/// ```
pub fn count_branch_lines(listing: &str, policy: BranchCountPolicy) -> u32 {
    let count = match policy {
        BranchCountPolicy::AllLines => listing.split('\n').count(),
        BranchCountPolicy::NonEmptyLines => listing
            .split('\n')
            .filter(|line| !line.trim().is_empty())
            .count(),
    };

    u32::try_from(count).unwrap_or(u32::MAX)
}

fn describe_args<S: AsRef<OsStr>>(args: &[S]) -> String {
    args.iter()
        .map(|arg| arg.as_ref().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

fn spawn_reader<R: Read + Send + 'static>(source: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut source) = source {
            // A read error just truncates the captured text
            let _ = source.read_to_end(&mut buffer);
        }
        buffer
    })
}

fn join_reader(handle: JoinHandle<Vec<u8>>) -> String {
    let bytes = handle.join().unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Waits for `child` to exit. Returns `None` (after killing and reaping it)
/// if it is still running when `limit` elapses.
fn wait_with_timeout(child: &mut Child, limit: Duration) -> std::io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + limit;

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }

        if Instant::now() >= deadline {
            // The child may have exited between the two checks
            let _ = child.kill();
            child.wait()?;
            return Ok(None);
        }

        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    fn os_args(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_count_all_lines() {
        let policy = BranchCountPolicy::AllLines;
        assert_eq!(count_branch_lines("* main\n  remotes/origin/main", policy), 2);
        assert_eq!(count_branch_lines("* main\n  remotes/origin/main\n", policy), 3);
        // Splitting empty text still yields one (empty) line
        assert_eq!(count_branch_lines("", policy), 1);
    }

    #[test]
    fn test_count_non_empty_lines() {
        let policy = BranchCountPolicy::NonEmptyLines;
        assert_eq!(count_branch_lines("* main\n  remotes/origin/main", policy), 2);
        assert_eq!(count_branch_lines("* main\n  remotes/origin/main\n", policy), 2);
        assert_eq!(count_branch_lines("", policy), 0);
        assert_eq!(count_branch_lines("\n  \n* dev\n", policy), 1);
    }

    #[test]
    fn test_describe_args() {
        assert_eq!(describe_args(&os_args(&["log", "-1", "--format=%cd"])), "log -1 --format=%cd");
        assert_eq!(describe_args::<&str>(&[]), "");
    }

    #[test]
    fn test_default_program() {
        assert_eq!(CommandLineGit::new().program(), Path::new("git"));
        assert_eq!(
            CommandLineGit::with_program("/usr/local/bin/git").program(),
            Path::new("/usr/local/bin/git")
        );
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let git = CommandLineGit::with_program("definitely-not-a-real-git-binary-42");
        let temp = std::env::temp_dir();

        match git.last_commit_date(&temp, None) {
            Err(Error::GitSpawn { program, .. }) => {
                assert_eq!(program, "definitely-not-a-real-git-binary-42");
            }
            other => panic!("expected spawn error, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_query_trims_stdout() {
        let sh = CommandLineGit::with_program("sh");
        let temp = std::env::temp_dir();
        let out = sh
            .query(&temp, &os_args(&["-c", "printf '  hello\\n\\n'"]), None)
            .unwrap();
        assert_eq!(out, "hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_query_non_zero_exit() {
        let sh = CommandLineGit::with_program("sh");
        let temp = std::env::temp_dir();
        let err = sh
            .query(&temp, &os_args(&["-c", "echo broken >&2; exit 3"]), None)
            .unwrap_err();

        match err {
            Error::GitFailed { output, .. } => assert_eq!(output, "broken"),
            other => panic!("expected GitFailed, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_child() {
        let sh = CommandLineGit::with_program("sh");
        let started = Instant::now();
        let err = sh
            .execute(
                None,
                &os_args(&["-c", "sleep 5"]),
                Some(Duration::from_millis(100)),
            )
            .err()
            .unwrap();

        assert!(matches!(err, Error::GitTimeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_fast_command_beats_timeout() {
        let sh = CommandLineGit::with_program("sh");
        let output = sh
            .execute(None, &os_args(&["-c", "echo ok"]), Some(Duration::from_secs(10)))
            .ok()
            .unwrap();
        assert!(output.status.success());
        assert_eq!(output.stdout.trim(), "ok");
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_returns_while_grandchild_holds_pipes() {
        let sh = CommandLineGit::with_program("sh");
        let started = Instant::now();
        let err = sh
            .execute(
                None,
                &os_args(&["-c", "sleep 5 & sleep 5"]),
                Some(Duration::from_millis(100)),
            )
            .err()
            .unwrap();

        assert!(matches!(err, Error::GitTimeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
