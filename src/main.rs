//! Gleaner - temporal file retrieval from git repositories
//!
//! Walks a repository's history backward to materialize dated snapshots of
//! a file across a date range, and builds small derived reports over them.

mod cli;
mod collate;
mod config;
mod reports;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    // Parse CLI args and run
    let cli = cli::Cli::parse();
    cli::run(cli)
}
