//! Core data models for repository metadata and scan parameters.
//!
//! [`RepositoryInfo`] is the record handed to host interfaces and is
//! JSON-serializable with snake_case keys (`name`, `last_commit_date`,
//! `branch_count`).

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Placeholder for a commit date that could not be determined.
pub const NOT_AVAILABLE: &str = "N/A";

/// Date format git uses for `%cd` when no `--date` option is given.
///
/// Example: `Mon Jan 1 12:00:00 2024 +0000`
pub const GIT_DEFAULT_DATE_FORMAT: &str = "%a %b %e %H:%M:%S %Y %z";

/// Metadata for one Git repository found directly under a scanned directory.
///
/// Records are built fresh for every scan and never mutated afterwards.
///
/// # Example
///
/// ```
/// # use git_repos_core::RepositoryInfo;
/// let info = RepositoryInfo::new("alpha");
/// assert_eq!(info.last_commit_date, "N/A");
/// assert_eq!(info.branch_count, 0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RepositoryInfo {
    /// Base name of the repository directory.
    ///
    /// Unique within one scan result, since it comes from a single parent.
    pub name: String,

    /// Date of the most recent commit, as printed by git.
    ///
    /// [`NOT_AVAILABLE`] when the repository has no commits or git failed.
    pub last_commit_date: String,

    /// Number of lines in `git branch -a` output (local and remote-tracking).
    ///
    /// `0` when the listing could not be obtained. See [`BranchCountPolicy`].
    pub branch_count: u32,
}

impl RepositoryInfo {
    /// Creates a record with the fallback metadata values.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            last_commit_date: NOT_AVAILABLE.to_string(),
            branch_count: 0,
        }
    }

    /// Returns `false` when the commit date is the `"N/A"` placeholder.
    pub fn has_commit_date(&self) -> bool {
        self.last_commit_date != NOT_AVAILABLE
    }

    /// Best-effort parse of the commit date into a timestamp.
    ///
    /// Understands git's default format, RFC 2822, RFC 3339 and plain
    /// `YYYY-MM-DD` dates (taken as midnight UTC). Returns `None` for anything
    /// else, including the placeholder.
    pub fn parsed_commit_date(&self) -> Option<DateTime<FixedOffset>> {
        if !self.has_commit_date() {
            return None;
        }

        let raw = self.last_commit_date.trim();

        DateTime::parse_from_str(raw, GIT_DEFAULT_DATE_FORMAT)
            .or_else(|_| DateTime::parse_from_rfc2822(raw))
            .or_else(|_| DateTime::parse_from_rfc3339(raw))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
                    .map(|naive| naive.and_utc().fixed_offset())
            })
    }
}

/// How the output of `git branch -a` is turned into a branch count.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BranchCountPolicy {
    /// Count every line produced by splitting on `\n`, blank ones included.
    ///
    /// Empty output still counts as one line.
    AllLines,

    /// Count only lines that contain something other than whitespace.
    #[default]
    NonEmptyLines,
}

/// Configuration for scanning operations.
///
/// # Example
///
/// ```
/// # use git_repos_core::{BranchCountPolicy, ScanConfig};
/// # use std::time::Duration;
/// let config = ScanConfig {
///     sort_by_name: false,
///     query_timeout: Some(Duration::from_secs(5)),
///     branch_count_policy: BranchCountPolicy::AllLines,
///     ..ScanConfig::default()
/// };
/// assert_eq!(config.git_program.to_str(), Some("git"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScanConfig {
    /// Sort candidate directories by file name before querying them.
    ///
    /// When `false`, results follow the platform's directory listing order,
    /// which is not stable across filesystems.
    pub sort_by_name: bool,

    /// Upper bound for each git invocation. `None` waits indefinitely.
    pub query_timeout: Option<Duration>,

    /// Counting rule for the branch listing.
    pub branch_count_policy: BranchCountPolicy,

    /// The git executable to invoke.
    pub git_program: PathBuf,
}

impl Default for ScanConfig {
    /// Sorted output, a 30 second timeout per query, blank lines ignored,
    /// `git` from `PATH`.
    fn default() -> Self {
        Self {
            sort_by_name: true,
            query_timeout: Some(Duration::from_secs(30)),
            branch_count_policy: BranchCountPolicy::default(),
            git_program: PathBuf::from("git"),
        }
    }
}

/// A cloneable flag used to stop a running scan from another thread.
///
/// All clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Per-call context passed explicitly into a scan.
///
/// Carries the cancellation token and an optional timeout that overrides
/// [`ScanConfig::query_timeout`] for this call only.
#[derive(Debug, Clone, Default)]
pub struct ScanContext {
    cancellation: CancellationToken,
    timeout: Option<Duration>,
}

impl ScanContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the given token, typically a clone kept by the caller.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Overrides the configured per-query timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// The timeout to apply: this context's override, else `fallback`.
    pub fn effective_timeout(&self, fallback: Option<Duration>) -> Option<Duration> {
        self.timeout.or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_repository_info_serialization() {
        let info = RepositoryInfo {
            name: "alpha".to_string(),
            last_commit_date: "2024-01-01".to_string(),
            branch_count: 2,
        };

        let json = serde_json::to_string(&info).unwrap();
        assert_eq!(
            json,
            r#"{"name":"alpha","last_commit_date":"2024-01-01","branch_count":2}"#
        );

        let deserialized: RepositoryInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, info);
    }

    #[test]
    fn test_new_uses_fallbacks() {
        let info = RepositoryInfo::new("empty");
        assert_eq!(info.name, "empty");
        assert_eq!(info.last_commit_date, NOT_AVAILABLE);
        assert_eq!(info.branch_count, 0);
        assert!(!info.has_commit_date());
        assert!(info.parsed_commit_date().is_none());
    }

    #[test]
    fn test_parse_git_default_date() {
        let info = RepositoryInfo {
            last_commit_date: "Mon Jan 1 12:30:00 2024 +0100".to_string(),
            ..RepositoryInfo::new("alpha")
        };

        let parsed = info.parsed_commit_date().unwrap();
        assert_eq!(parsed.year(), 2024);
        assert_eq!(parsed.day(), 1);
        assert_eq!(parsed.hour(), 12);
        assert_eq!(parsed.offset().local_minus_utc(), 3600);
    }

    #[test]
    fn test_parse_iso_dates() {
        let info = RepositoryInfo {
            last_commit_date: "2024-03-05T10:00:00+00:00".to_string(),
            ..RepositoryInfo::new("alpha")
        };
        assert_eq!(info.parsed_commit_date().unwrap().month(), 3);

        let info = RepositoryInfo {
            last_commit_date: "2024-01-01".to_string(),
            ..RepositoryInfo::new("alpha")
        };
        let parsed = info.parsed_commit_date().unwrap();
        assert_eq!((parsed.year(), parsed.month(), parsed.day()), (2024, 1, 1));
    }

    #[test]
    fn test_parse_garbage_date() {
        let info = RepositoryInfo {
            last_commit_date: "yesterday-ish".to_string(),
            ..RepositoryInfo::new("alpha")
        };
        assert!(info.has_commit_date());
        assert!(info.parsed_commit_date().is_none());
    }

    #[test]
    fn test_branch_count_policy_serialization() {
        let json = serde_json::to_string(&BranchCountPolicy::NonEmptyLines).unwrap();
        assert_eq!(json, "\"non_empty_lines\"");
        assert_eq!(BranchCountPolicy::default(), BranchCountPolicy::NonEmptyLines);
    }

    #[test]
    fn test_scan_config_default() {
        let config = ScanConfig::default();
        assert!(config.sort_by_name);
        assert_eq!(config.query_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.git_program, PathBuf::from("git"));
    }

    #[test]
    fn test_scan_config_partial_json() {
        let config: ScanConfig = serde_json::from_str(r#"{"sort_by_name": false}"#).unwrap();
        assert!(!config.sort_by_name);
        assert_eq!(config.branch_count_policy, BranchCountPolicy::NonEmptyLines);
    }

    #[test]
    fn test_cancellation_is_shared_between_clones() {
        let token = CancellationToken::new();
        let ctx = ScanContext::new().with_cancellation(token.clone());
        assert!(!ctx.is_cancelled());

        token.cancel();
        assert!(ctx.is_cancelled());
        assert!(ctx.cancellation().is_cancelled());
    }

    #[test]
    fn test_effective_timeout() {
        let fallback = Some(Duration::from_secs(30));
        assert_eq!(ScanContext::new().effective_timeout(fallback), fallback);
        assert_eq!(ScanContext::new().effective_timeout(None), None);

        let ctx = ScanContext::new().with_timeout(Duration::from_secs(1));
        assert_eq!(ctx.effective_timeout(fallback), Some(Duration::from_secs(1)));
    }
}
