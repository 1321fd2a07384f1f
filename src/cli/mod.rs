//! CLI command definitions and handlers

mod collate;
mod report;
mod reports;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::collate::{Collator, RepoIdentity};
use crate::config::Credentials;
use crate::reports::ReportConfig;

/// Parse a compact YYYYMMDD date
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .map_err(|_| format!("'{}' is not a YYYYMMDD date", s))
}

/// Parse report options given as a JSON object
fn parse_report_config(s: &str) -> Result<ReportConfig, String> {
    serde_json::from_str::<serde_json::Value>(s)
        .map_err(|e| format!("invalid JSON: {e}"))?
        .as_object()
        .cloned()
        .ok_or_else(|| "config must be a JSON object".to_string())
}

/// Gleaner - temporal file retrieval from git repositories
#[derive(Parser, Debug)]
#[command(name = "gleaner")]
#[command(
    version,
    about = "Retrieve dated snapshots of files from git history and build reports over them",
    after_help = "\
Examples:
  gleaner collate https://github.com/foo/bar raw/data/config.json --start 20191101 --end 20191115
  gleaner collate local src/main.rs --repo-path ~/work/repo
  gleaner report https://github.com/foo/bar history --config '{\"filepath\":\"raw/data/config.json\"}'
  gleaner reports --detail freshness"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments shared by every command that touches a repository.
#[derive(Args, Debug)]
pub struct RepoArgs {
    /// Repository URL (scheme://host/org/name), or 'local' to work only
    /// against --repo-path
    #[arg(value_name = "REPO")]
    pub repo: String,

    /// Branch fetched when provisioning the working copy
    #[arg(long, default_value = "master", value_name = "BRANCH")]
    pub branch: String,

    /// An existing local git repository to use instead of cloning into the
    /// cache
    #[arg(long, value_name = "~/path/git-repo")]
    pub repo_path: Option<PathBuf>,

    /// Credentials file (default: ~/.config/gleaner/credentials.toml)
    #[arg(long, env = "GLEANER_CREDS", value_name = "~/path/creds")]
    pub creds: Option<PathBuf>,

    /// Root directory for cached working copies (default: system temp)
    #[arg(long, value_name = "DIR")]
    pub cache_root: Option<PathBuf>,

    /// Skip origin identity validation
    #[arg(long, hide = true)]
    pub no_validate: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Retrieve historical versions of a file from a git repository
    #[command(after_help = "\
Examples:
  gleaner collate https://github.com/foo/bar raw/data/config.json
  gleaner collate https://github.com/foo/bar raw/data/config.json --start 20191101 --end 20191115
  gleaner collate local raw/data/config.json --repo-path ~/work/bar --end 20191115")]
    Collate {
        #[command(flatten)]
        repo: RepoArgs,

        /// Relative path of the file to retrieve from the repository
        #[arg(value_name = "FILEPATH")]
        filepath: String,

        /// End of the date range (default: today)
        #[arg(long, value_name = "YYYYMMDD", value_parser = parse_date)]
        end: Option<NaiveDate>,

        /// Start of the date range (default: same as end)
        #[arg(long, value_name = "YYYYMMDD", value_parser = parse_date)]
        start: Option<NaiveDate>,

        /// Directory artifacts are written to
        #[arg(long, default_value = ".", value_name = "DIR")]
        out_dir: PathBuf,
    },

    /// Generate a report from file content in a git repository
    #[command(after_help = "\
Examples:
  gleaner report https://github.com/foo/bar history --config '{\"filepath\":\"raw/data/config.json\",\"start\":\"20191101\"}'
  gleaner report https://github.com/foo/bar freshness --config '{\"filepaths\":[\"a.json\",\"b.json\"]}'")]
    Report {
        #[command(flatten)]
        repo: RepoArgs,

        /// Name of the report to run (see `gleaner reports`)
        #[arg(value_name = "NAME")]
        name: String,

        /// Key/value options for the report, as a JSON object
        #[arg(long, default_value = "{}", value_name = "JSON", value_parser = parse_report_config)]
        config: ReportConfig,

        /// Directory the report artifact is written to
        #[arg(long, default_value = ".", value_name = "DIR")]
        out_dir: PathBuf,
    },

    /// Display details about available reports
    Reports {
        /// Show the full description for one report
        #[arg(long, value_name = "NAME")]
        detail: Option<String>,
    },
}

/// Build a collator session from the shared repository arguments.
fn build_collator(args: &RepoArgs) -> Result<Collator> {
    let identity = if args.repo == "local" {
        if args.repo_path.is_none() {
            anyhow::bail!("'local' requires --repo-path");
        }
        RepoIdentity::local()
    } else {
        RepoIdentity::parse(&args.repo)?
    };

    let creds = Credentials::load(args.creds.as_deref())?;
    // A local sentinel has no identity worth checking against origin.
    let validate = !args.no_validate && !identity.is_local();

    let mut collator =
        Collator::new(identity, Box::new(creds), &args.branch).with_validation(validate);
    if let Some(path) = &args.repo_path {
        collator = collator.with_repo_path(path);
    }
    if let Some(root) = &args.cache_root {
        collator = collator.with_cache_root(root);
    }
    Ok(collator)
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Collate {
            repo,
            filepath,
            end,
            start,
            out_dir,
        } => collate::run(&repo, &filepath, start, end, &out_dir),

        Commands::Report {
            repo,
            name,
            config,
            out_dir,
        } => report::run(&repo, &name, &config, &out_dir),

        Commands::Reports { detail } => reports::run(detail.as_deref()),
    }
}
