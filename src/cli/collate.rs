//! Collate command - write dated snapshots of one file

use anyhow::Result;
use chrono::{Local, NaiveDate};
use console::style;
use std::path::Path;

use super::{build_collator, RepoArgs};
use crate::collate::CollateError;

/// Run the collate command
pub fn run(
    repo: &RepoArgs,
    filepath: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    out_dir: &Path,
) -> Result<()> {
    let today = Local::now().date_naive();
    let end = end.unwrap_or(today);
    let start = start.unwrap_or(end);
    if start > today {
        anyhow::bail!("start date cannot be in the future");
    }
    if start > end {
        anyhow::bail!("start date cannot be after end date");
    }
    if end > today {
        anyhow::bail!("end date cannot be in the future");
    }

    let mut collator = build_collator(repo)?;
    println!(
        "Collating {} from {}",
        style(filepath).cyan(),
        style(collator.identity()).cyan()
    );

    let written = match collator.collate(filepath, start, end, out_dir) {
        Ok(written) => written,
        Err(e @ CollateError::FileMissing { .. }) => {
            eprintln!("{} {}", style("no data:").yellow(), e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    for path in &written {
        println!("{} {}", style("✓").green(), path.display());
    }
    println!(
        "\n{} snapshot{} written",
        written.len(),
        if written.len() == 1 { "" } else { "s" }
    );
    Ok(())
}
