//! Derived reports over collated repository content
//!
//! Each report reads file snapshots through a [`Collator`] session and
//! renders one small artifact. Reports are compiled in and registered in
//! [`REGISTRY`], a static name-to-factory table the CLI resolves against.

mod freshness;
mod history;
mod inventory;

use crate::collate::Collator;
use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate};
use serde_json::{Map, Value};

/// Key/value options passed to a report from the command line.
pub type ReportConfig = Map<String, Value>;

/// One report definition: what it is called on disk, what it says about
/// itself, and how it renders.
pub trait Report {
    /// Artifact filename, extension included
    fn filename(&self) -> &'static str;

    /// Full description shown by `gleaner reports --detail`
    fn details(&self) -> &'static str;

    /// First non-empty line of the details
    fn summary(&self) -> &'static str {
        self.details()
            .lines()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("N/A")
    }

    /// Render the report content. Empty content means no artifact.
    fn generate(&self, collator: &mut Collator, config: &ReportConfig) -> Result<String>;
}

pub struct ReportEntry {
    pub name: &'static str,
    pub build: fn() -> Box<dyn Report>,
}

/// Every report compiled into gleaner, in listing order.
pub static REGISTRY: &[ReportEntry] = &[
    ReportEntry {
        name: "history",
        build: history::build,
    },
    ReportEntry {
        name: "freshness",
        build: freshness::build,
    },
    ReportEntry {
        name: "inventory",
        build: inventory::build,
    },
];

/// Resolve a report by name.
pub fn lookup(name: &str) -> Option<Box<dyn Report>> {
    REGISTRY
        .iter()
        .find(|entry| entry.name == name)
        .map(|entry| (entry.build)())
}

/// Read a YYYYMMDD date from report config, falling back to `default` when
/// the key is absent. Dates past today are rejected the same way for every
/// report.
pub(crate) fn config_day(
    config: &ReportConfig,
    key: &str,
    default: NaiveDate,
) -> Result<NaiveDate> {
    let Some(value) = config.get(key) else {
        return Ok(default);
    };
    let text = value
        .as_str()
        .ok_or_else(|| anyhow!("config key '{key}' must be a string"))?;
    let day = NaiveDate::parse_from_str(text, "%Y%m%d")
        .map_err(|_| anyhow!("config key '{key}' is not a YYYYMMDD date: {text}"))?;
    if day > Local::now().date_naive() {
        return Err(anyhow!("{} is in the future", day.format("%Y-%m-%d")));
    }
    Ok(day)
}

/// Read a required string from report config.
pub(crate) fn config_str<'a>(config: &'a ReportConfig, key: &str) -> Result<&'a str> {
    config
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("report config needs a string '{key}' value"))
}
