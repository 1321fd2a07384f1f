//! Change history report
//!
//! Lists every distinct snapshot of one file across a date range as CSV,
//! newest first, matching the order collate writes artifacts in.

use anyhow::Result;
use chrono::Local;

use super::{config_day, config_str, Report, ReportConfig};
use crate::collate::Collator;

pub(super) fn build() -> Box<dyn Report> {
    Box::new(History)
}

struct History;

impl Report for History {
    fn filename(&self) -> &'static str {
        "history.csv"
    }

    fn details(&self) -> &'static str {
        "Change history of one file as CSV.\n\
         \n\
         Emits one row per distinct commit that changed the file across the\n\
         requested range, newest first, with columns date, commit, author\n\
         and summary.\n\
         \n\
         Config keys:\n\
           filepath  relative path of the file in the repository (required)\n\
           end       YYYYMMDD end of the range (default: today)\n\
           start     YYYYMMDD start of the range (default: same as end)"
    }

    fn generate(&self, collator: &mut Collator, config: &ReportConfig) -> Result<String> {
        let filepath = config_str(config, "filepath")?;
        let end = config_day(config, "end", Local::now().date_naive())?;
        let start = config_day(config, "start", end)?;

        let snapshots = collator.read(filepath, start, end)?;

        let mut csv = String::from("date,commit,author,summary\n");
        for snapshot in &snapshots {
            csv.push_str(&format!(
                "{},{},{},{}\n",
                snapshot.day().format("%Y-%m-%d"),
                snapshot.short_hash(),
                csv_field(&snapshot.author),
                csv_field(&snapshot.summary),
            ));
        }
        Ok(csv)
    }
}

/// Quote a CSV field when it holds a delimiter, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
