//! End-to-end tests against the installed `git` executable.
//!
//! Every test returns early when git can't be run on this machine.

use git_repos_core::{
    DefaultScanner, Error, GitManager, RepositoryScanner, ScanConfig, ScanContext, SetupStatus,
    NOT_AVAILABLE,
};
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

/// Runs git in `dir` with a throwaway identity, panicking on failure.
fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args([
            "-c",
            "user.name=Test User",
            "-c",
            "user.email=test@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_DATE", "2024-01-01T00:00:00+0000")
        .env("GIT_COMMITTER_DATE", "2024-01-01T00:00:00+0000")
        .output()
        .expect("failed to run git");
    assert!(
        status.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&status.stderr)
    );
}

/// Creates `parent/name` as a repository with no commits on branch `main`.
fn init_repo(parent: &Path, name: &str) -> std::path::PathBuf {
    let dir = parent.join(name);
    fs::create_dir_all(&dir).unwrap();
    git(&dir, &["init", "-q"]);
    git(&dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    dir
}

/// Creates a repository with one commit on `main` and a remote-tracking
/// `origin/main` branch.
fn init_repo_with_commit(parent: &Path, name: &str) -> std::path::PathBuf {
    let dir = init_repo(parent, name);
    git(&dir, &["commit", "-q", "--allow-empty", "-m", "initial"]);
    git(&dir, &["update-ref", "refs/remotes/origin/main", "HEAD"]);
    dir
}

#[test]
fn test_repository_with_commit_and_two_branches() {
    if !git_available() {
        return;
    }

    let temp = TempDir::new().unwrap();
    init_repo_with_commit(temp.path(), "alpha");

    let repos = DefaultScanner::new()
        .scan(temp.path(), &ScanContext::new())
        .unwrap();

    assert_eq!(repos.len(), 1);
    assert_eq!(repos[0].name, "alpha");
    assert!(repos[0].last_commit_date.contains("2024"));
    assert_eq!(repos[0].branch_count, 2);
}

#[test]
fn test_repository_without_commits() {
    if !git_available() {
        return;
    }

    let temp = TempDir::new().unwrap();
    init_repo(temp.path(), "fresh");

    let repos = DefaultScanner::new()
        .scan(temp.path(), &ScanContext::new())
        .unwrap();

    assert_eq!(repos.len(), 1);
    assert_eq!(repos[0].name, "fresh");
    assert_eq!(repos[0].last_commit_date, NOT_AVAILABLE);
    assert_eq!(repos[0].branch_count, 0);
}

#[test]
fn test_mixed_parent_directory() {
    if !git_available() {
        return;
    }

    let temp = TempDir::new().unwrap();
    init_repo_with_commit(temp.path(), "alpha");
    init_repo(temp.path(), "gamma");
    fs::create_dir(temp.path().join("beta")).unwrap();
    fs::write(temp.path().join("notes.txt"), "not a repo").unwrap();

    let repos = DefaultScanner::new()
        .scan(temp.path(), &ScanContext::new())
        .unwrap();

    let names: Vec<_> = repos.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "gamma"]);
}

#[test]
fn test_scan_is_repeatable() {
    if !git_available() {
        return;
    }

    let temp = TempDir::new().unwrap();
    init_repo_with_commit(temp.path(), "one");
    init_repo_with_commit(temp.path(), "two");

    let scanner = DefaultScanner::with_config(ScanConfig {
        sort_by_name: false,
        ..ScanConfig::default()
    });
    let mut first = scanner.scan(temp.path(), &ScanContext::new()).unwrap();
    let mut second = scanner.scan(temp.path(), &ScanContext::new()).unwrap();

    first.sort_by(|a, b| a.name.cmp(&b.name));
    second.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(first, second);
}

#[test]
fn test_missing_git_degrades_every_repository() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("alpha").join(".git")).unwrap();

    let scanner = DefaultScanner::with_config(ScanConfig {
        git_program: "no-such-git-executable-for-tests".into(),
        ..ScanConfig::default()
    });
    let repos = scanner.scan(temp.path(), &ScanContext::new()).unwrap();

    assert_eq!(repos.len(), 1);
    assert_eq!(repos[0].last_commit_date, NOT_AVAILABLE);
    assert_eq!(repos[0].branch_count, 0);
}

#[test]
fn test_setup_clone_then_list() {
    if !git_available() {
        return;
    }

    let sources = TempDir::new().unwrap();
    let source = init_repo_with_commit(sources.path(), "upstream");

    let temp = TempDir::new().unwrap();
    let workspace = temp.path().join("workspace");
    let manager = GitManager::new();

    assert!(matches!(
        manager.setup(&workspace).unwrap(),
        SetupStatus::Created(_)
    ));

    let target = workspace.join("copy");
    let url = source.to_string_lossy().into_owned();
    let status = manager
        .git_clone(&url, &target, &ScanContext::new())
        .unwrap();
    assert_eq!(status.target, target);

    let repos = manager
        .list_repositories(&workspace, &ScanContext::new())
        .unwrap();
    assert_eq!(repos.len(), 1);
    assert_eq!(repos[0].name, "copy");
    assert!(repos[0].has_commit_date());
    // Local main plus origin/main (and usually origin/HEAD)
    assert!(repos[0].branch_count >= 2);
}

#[test]
fn test_clone_failure_reports_git_output() {
    if !git_available() {
        return;
    }

    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("does-not-exist");
    let manager = GitManager::new();

    let err = manager
        .git_clone(
            &missing.to_string_lossy(),
            &temp.path().join("target"),
            &ScanContext::new(),
        )
        .unwrap_err();

    match err {
        Error::GitFailed { output, .. } => assert!(!output.is_empty()),
        other => panic!("expected GitFailed, got {:?}", other),
    }
}
