//! Reports command - list and describe the registered reports

use anyhow::Result;
use console::style;

use crate::reports::{lookup, REGISTRY};

/// Run the reports command
pub fn run(detail: Option<&str>) -> Result<()> {
    match detail {
        None => {
            for entry in REGISTRY {
                let report = (entry.build)();
                println!("{}: {}", style(entry.name).cyan(), report.summary());
            }
        }
        Some(name) => {
            let Some(report) = lookup(name) else {
                anyhow::bail!("'{}' is not a known report", name);
            };
            let banner = "*".repeat(name.len());
            println!("{banner}");
            println!("{name}");
            println!("{banner}");
            println!("{}", report.details());
        }
    }
    Ok(())
}
