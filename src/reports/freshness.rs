//! File freshness report
//!
//! Shows when each requested file last changed and how stale it was on the
//! as-of day. Files with no commit at or before that day read `never`.

use anyhow::{anyhow, Result};
use chrono::Local;
use serde_json::Value;

use super::{config_day, Report, ReportConfig};
use crate::collate::{CollateError, Collator};

pub(super) fn build() -> Box<dyn Report> {
    Box::new(Freshness)
}

struct Freshness;

impl Report for Freshness {
    fn filename(&self) -> &'static str {
        "freshness.txt"
    }

    fn details(&self) -> &'static str {
        "Last-change dates and staleness for a set of files.\n\
         \n\
         Renders one row per file with the date of the last commit touching\n\
         it on or before the as-of day, plus its age in days. Files with no\n\
         commit by then read `never`.\n\
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

        let mut text = format!("freshness as of {}\n\n", on.format("%Y-%m-%d"));
        text.push_str(&format!("{:<40}  {:<11}  {}\n", "file", "last change", "age"));
        for value in filepaths {
            let filepath = value
                .as_str()
                .ok_or_else(|| anyhow!("'filepaths' entries must be strings"))?;

            let last_change = match collator.read(filepath, on, on) {
                Ok(snapshots) => snapshots.first().map(|s| s.day()),
                Err(CollateError::FileMissing { .. }) => None,
                Err(e) => return Err(e.into()),
            };
            let row = match last_change {
                Some(day) => format!(
                    "{:<40}  {:<11}  {} days\n",
                    filepath,
                    day.format("%Y-%m-%d"),
                    (on - day).num_days()
                ),
                None => format!("{:<40}  {:<11}  -\n", filepath, "never"),
            };
            text.push_str(&row);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::tests::{config_from, test_collator};
    use anyhow::Result;

    #[test]
    fn test_freshness_reports_age_per_file() -> Result<()> {
        let (_dir, mut collator) = test_collator()?;
        let report = build();
        let config = config_from(
            r#"{"filepaths": ["raw/foo/foo.json", "other.txt"], "on": "20191110"}"#,
        );

        let text = report.generate(&mut collator, &config)?;

        assert!(text.starts_with("freshness as of 2019-11-10\n"));
        let foo_row = text
            .lines()
            .find(|l| l.starts_with("raw/foo/foo.json"))
            .ok_or_else(|| anyhow!("missing foo row"))?;
        assert!(foo_row.contains("2019-11-06"));
        assert!(foo_row.contains("4 days"));
        let other_row = text
            .lines()
            .find(|l| l.starts_with("other.txt"))
            .ok_or_else(|| anyhow!("missing other row"))?;
        assert!(other_row.contains("2019-11-10"));
        assert!(other_row.contains("0 days"));
        Ok(())
    }

    #[test]
    fn test_freshness_marks_unknown_files_never() -> Result<()> {
        let (_dir, mut collator) = test_collator()?;
        let report = build();
        let config = config_from(r#"{"filepaths": ["no/such.txt"], "on": "20191110"}"#);

        let text = report.generate(&mut collator, &config)?;
        assert!(text.contains("never"));
        Ok(())
    }

    #[test]
    fn test_freshness_requires_filepaths_array() -> Result<()> {
        let (_dir, mut collator) = test_collator()?;
        let report = build();

        let config = config_from(r#"{"on": "20191110"}"#);
        let err = report.generate(&mut collator, &config).unwrap_err();
        assert!(err.to_string().contains("filepaths"));

        let config = config_from(r#"{"filepaths": "raw/foo/foo.json"}"#);
        assert!(report.generate(&mut collator, &config).is_err());
        Ok(())
    }

    #[test]
    fn test_freshness_rejects_non_string_entries() -> Result<()> {
        let (_dir, mut collator) = test_collator()?;
        let report = build();
        let config = config_from(r#"{"filepaths": [42], "on": "20191110"}"#);

        let err = report.generate(&mut collator, &config).unwrap_err();
        assert!(err.to_string().contains("must be strings"));
        Ok(())
    }
}
