//! File inventory report
//!
//! Captures which of the requested files existed on the as-of day and how
//! large each one was, working from the content of the version in effect
//! that day.

use anyhow::{anyhow, Result};
use chrono::Local;
use serde_json::Value;

use super::{config_day, Report, ReportConfig};
use crate::collate::Collator;

pub(super) fn build() -> Box<dyn Report> {
    Box::new(Inventory)
}

struct Inventory;

impl Report for Inventory {
    fn filename(&self) -> &'static str {
        "inventory.txt"
    }

    fn details(&self) -> &'static str {
        "Presence and size of a set of files as of a day.\n\
         \n\
         Renders one row per file with the byte size of the version in\n\
         effect on the as-of day. Files with no commit by then read\n\
         `missing`.\n\
         \n\
         Config keys:\n\
           filepaths  array of relative file paths (required)\n\
           on         YYYYMMDD as-of day (default: today)"
    }

    fn generate(&self, collator: &mut Collator, config: &ReportConfig) -> Result<String> {
        let filepaths = config
            .get("filepaths")
            .and_then(Value::as_array)
            .ok_or_else(|| anyhow!("report config needs a 'filepaths' array"))?;
        let on = config_day(config, "on", Local::now().date_naive())?;

        let mut text = format!("inventory as of {}\n\n", on.format("%Y-%m-%d"));
        text.push_str(&format!("{:<40}  {:>10}\n", "file", "bytes"));
        for value in filepaths {
            let filepath = value
                .as_str()
                .ok_or_else(|| anyhow!("'filepaths' entries must be strings"))?;

            let row = match collator.file_content(filepath, on)? {
                Some(content) => format!("{:<40}  {:>10}\n", filepath, content.len()),
                None => format!("{:<40}  {:>10}\n", filepath, "missing"),
            };
            text.push_str(&row);
        }
        Ok(text)
    }
}
