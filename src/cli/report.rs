//! Report command - run one registered report and write its artifact

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use super::{build_collator, RepoArgs};
use crate::collate::CollateError;
use crate::reports::{lookup, ReportConfig};

/// Run the report command
pub fn run(repo: &RepoArgs, name: &str, config: &ReportConfig, out_dir: &Path) -> Result<()> {
    let Some(report) = lookup(name) else {
        anyhow::bail!("'{}' is not a known report", name);
    };

    let mut collator = build_collator(repo)?;
    let content = match report.generate(&mut collator, config) {
        Ok(content) => content,
        Err(e) => {
            if let Some(CollateError::FileMissing { .. }) = e.downcast_ref::<CollateError>() {
                eprintln!("{} {}", style("no data:").yellow(), e);
                return Ok(());
            }
            return Err(e);
        }
    };
    if content.is_empty() {
        eprintln!(
            "{} report '{}' produced no content",
            style("no data:").yellow(),
            name
        );
        return Ok(());
    }

    let out_path = out_dir.join(report.filename());
    std::fs::write(&out_path, &content)
        .with_context(|| format!("failed to write {}", out_path.display()))?;
    println!("{} {}", style("✓").green(), out_path.display());
    Ok(())
}
