//! Command-line interface for git-repos.
//!
//! Lists the Git repositories inside a directory, creates workspace
//! directories and clones repositories into them.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use git_repos_core::{
    l10n::{Localizer, DEFAULT_LOCALE},
    BranchCountPolicy, GitManager, RepositoryInfo, ScanConfig, ScanContext,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// git-repos - Keep track of the Git repositories in a directory
#[derive(Parser, Debug)]
#[command(
    name = "repos-cli",
    version,
    about = "List, set up and clone Git repositories in a workspace directory",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show detailed progress (debug logging)
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    /// Locale for messages (e.g., en, de, pt)
    #[arg(short = 'l', long = "locale", value_name = "LOCALE", global = true)]
    locale: Option<String>,

    /// Git executable to invoke
    #[arg(long = "git", value_name = "PROGRAM", global = true, default_value = "git")]
    git: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the Git repositories directly inside a directory
    List {
        /// Directory whose subdirectories are inspected
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Output as JSON instead of a table
        #[arg(short = 'j', long = "json")]
        json: bool,

        /// Sort results by: name, recent, branches, or none (listing order)
        #[arg(short = 's', long = "sort", value_enum, default_value_t = SortProfile::Name)]
        sort: SortProfile,

        /// Seconds to wait for each git query before giving up on it
        #[arg(short = 't', long = "timeout", value_name = "SECS")]
        timeout: Option<u64>,

        /// Count blank lines in the branch listing too
        #[arg(long = "count-all-lines")]
        count_all_lines: bool,
    },

    /// Create a directory (and its parents) if it doesn't exist
    Setup {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// Clone a repository into a target directory
    Clone {
        /// URL of the repository to clone
        #[arg(value_name = "URL")]
        url: String,

        /// Directory to clone into
        #[arg(value_name = "TARGET")]
        target: PathBuf,

        /// Seconds to wait for the clone before aborting it
        #[arg(short = 't', long = "timeout", value_name = "SECS")]
        timeout: Option<u64>,
    },
}

/// Sorting profiles for organizing results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SortProfile {
    /// Sort alphabetically by repository name
    Name,
    /// Most recently committed first
    Recent,
    /// Most branches first
    Branches,
    /// Keep the order the filesystem lists directories in
    #[value(name = "none")]
    Unsorted,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let localizer = match &cli.locale {
        Some(locale) => {
            Localizer::new(locale).with_context(|| format!("Failed to load locale: {}", locale))?
        }
        None => Localizer::from_system()
            .or_else(|_| Localizer::new(DEFAULT_LOCALE))
            .context("Failed to load default locale")?,
    };

    match &cli.command {
        Commands::List {
            path,
            json,
            sort,
            timeout,
            count_all_lines,
        } => {
            let config = build_scan_config(&cli.git, *sort, *timeout, *count_all_lines);
            run_list(&expand_tilde(path), config, *sort, *json, cli.verbose, &localizer)
        }
        Commands::Setup { path } => {
            let manager = GitManager::with_config(base_config(&cli.git));
            let path = expand_tilde(path);
            let status = manager
                .setup(&path)
                .with_context(|| format!("Failed to set up {}", path.display()))?;

            let path_str = status.path().display().to_string();
            println!(
                "{}",
                localizer.get(status.message_id(), Some(&[("path", path_str.as_str())]))
            );
            Ok(())
        }
        Commands::Clone {
            url,
            target,
            timeout,
        } => {
            let manager = GitManager::with_config(base_config(&cli.git));
            let target = expand_tilde(target);
            let target_str = target.display().to_string();

            if cli.verbose {
                eprintln!(
                    "{}",
                    localizer.get(
                        "clone-started",
                        Some(&[("url", url.as_str()), ("path", target_str.as_str())])
                    )
                );
            }

            let mut ctx = ScanContext::new();
            if let Some(secs) = timeout {
                ctx = ctx.with_timeout(Duration::from_secs(*secs));
            }

            let status = manager
                .git_clone(url, &target, &ctx)
                .with_context(|| localizer.get("clone-failed", None))?;

            println!(
                "{}",
                localizer.get(status.message_id(), Some(&[("path", target_str.as_str())]))
            );
            Ok(())
        }
    }
}

/// Sets up stderr logging. `RUST_LOG` wins unless `--verbose` is given.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn base_config(git: &Path) -> ScanConfig {
    ScanConfig {
        git_program: git.to_path_buf(),
        ..ScanConfig::default()
    }
}

/// Builds a ScanConfig from `list` arguments
fn build_scan_config(
    git: &Path,
    sort: SortProfile,
    timeout: Option<u64>,
    count_all_lines: bool,
) -> ScanConfig {
    let defaults = base_config(git);

    ScanConfig {
        sort_by_name: sort != SortProfile::Unsorted,
        query_timeout: timeout.map(Duration::from_secs).or(defaults.query_timeout),
        branch_count_policy: if count_all_lines {
            BranchCountPolicy::AllLines
        } else {
            BranchCountPolicy::NonEmptyLines
        },
        ..defaults
    }
}

fn run_list(
    path: &Path,
    config: ScanConfig,
    sort: SortProfile,
    json: bool,
    verbose: bool,
    localizer: &Localizer,
) -> Result<()> {
    if !json && verbose {
        let path_str = path.display().to_string();
        eprintln!(
            "{}",
            localizer.get("scan-started", Some(&[("path", path_str.as_str())]))
        );
    }

    let manager = GitManager::with_config(config);
    let mut repos = manager
        .list_repositories(path, &ScanContext::new())
        .with_context(|| format!("Failed to list repositories in {}", path.display()))?;

    sort_repositories(&mut repos, sort);

    if json {
        output_json(&repos)
    } else {
        output_table(&repos, localizer);
        Ok(())
    }
}

/// Expands a leading `~` to the home directory
fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// Sorts repositories according to the specified profile
fn sort_repositories(repos: &mut [RepositoryInfo], profile: SortProfile) {
    match profile {
        SortProfile::Name => {
            repos.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        }
        SortProfile::Recent => {
            // Unparseable dates sort last
            repos.sort_by(|a, b| b.parsed_commit_date().cmp(&a.parsed_commit_date()));
        }
        SortProfile::Branches => {
            repos.sort_by(|a, b| {
                b.branch_count
                    .cmp(&a.branch_count)
                    .then_with(|| a.name.cmp(&b.name))
            });
        }
        SortProfile::Unsorted => {}
    }
}

/// Outputs repositories as JSON to stdout
fn output_json(repos: &[RepositoryInfo]) -> Result<()> {
    let json =
        serde_json::to_string_pretty(repos).context("Failed to serialize repositories to JSON")?;
    println!("{}", json);
    Ok(())
}

/// Outputs repositories as a formatted table to stdout
fn output_table(repos: &[RepositoryInfo], localizer: &Localizer) {
    if repos.is_empty() {
        println!("{}", localizer.get("scan-no-results", None));
        return;
    }

    let header_name = localizer.get("header-name", None);
    let header_date = localizer.get("header-last-commit", None);
    let header_branches = localizer.get("header-branches", None);
    let no_commits = localizer.get("commit-none", None);

    let name_width = repos
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(10)
        .max(header_name.chars().count())
        .min(40); // Cap at 40 chars for readability

    let date_width = repos
        .iter()
        .map(|r| r.last_commit_date.chars().count())
        .max()
        .unwrap_or(10)
        .max(header_date.chars().count())
        .max(no_commits.chars().count());

    println!(
        "{:<name_width$}  {:<date_width$}  {}",
        header_name,
        header_date,
        header_branches,
        name_width = name_width,
        date_width = date_width,
    );
    println!(
        "{}",
        "=".repeat(name_width + date_width + header_branches.chars().count() + 4)
    );

    for repo in repos {
        let date = if repo.has_commit_date() {
            repo.last_commit_date.as_str()
        } else {
            no_commits.as_str()
        };

        println!(
            "{:<name_width$}  {:<date_width$}  {}",
            truncate(&repo.name, name_width),
            date,
            repo.branch_count,
            name_width = name_width,
            date_width = date_width,
        );
    }

    println!();
    let count = repos.len().to_string();
    println!(
        "{}",
        localizer.get("scan-complete", Some(&[("count", count.as_str())]))
    );
}

/// Truncates a string to a maximum width, adding "..." if truncated
/// Unicode-safe version that respects character boundaries
fn truncate(s: &str, max_width: usize) -> String {
    let char_count = s.chars().count();

    if char_count <= max_width {
        s.to_string()
    } else if max_width <= 3 {
        "...".to_string()
    } else {
        s.chars().take(max_width - 3).collect::<String>() + "..."
    }
}
