//! Monitor file: which channels to poll and which terms to watch.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::normalize::normalize;
use crate::ConfigError;

/// Solar Hijri month names in calendar order.
pub const DEFAULT_MONTHS: [&str; 12] = [
    "فروردین",
    "اردیبهشت",
    "خرداد",
    "تیر",
    "مرداد",
    "شهریور",
    "مهر",
    "آبان",
    "آذر",
    "دی",
    "بهمن",
    "اسفند",
];

pub const DEFAULT_OLD_YEAR_MARKERS: [&str; 6] =
    ["۱۴۰۱", "۱۴۰۲", "1401", "1402", "پارسال", "سال گذشته"];

/// The three watched vocabularies. Categories must not share terms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternsConfig {
    #[serde(default)]
    pub incidents: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub status: Vec<String>,
}

/// Settings for the stale-content heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaleConfig {
    /// 1-based ordinal into `months`. `None` disables the month rule.
    #[serde(default)]
    pub current_month: Option<u8>,
    #[serde(default = "default_old_year_markers")]
    pub old_year_markers: Vec<String>,
    #[serde(default = "default_months")]
    pub months: Vec<String>,
}

impl Default for StaleConfig {
    fn default() -> Self {
        Self {
            current_month: None,
            old_year_markers: default_old_year_markers(),
            months: default_months(),
        }
    }
}

fn default_old_year_markers() -> Vec<String> {
    DEFAULT_OLD_YEAR_MARKERS
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}

fn default_months() -> Vec<String> {
    DEFAULT_MONTHS.iter().map(|s| (*s).to_string()).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorFile {
    pub nodes: Vec<String>,
    #[serde(default)]
    pub patterns: PatternsConfig,
    #[serde(default)]
    pub stale: StaleConfig,
}

/// Load and validate the monitor file.
///
/// The file is parsed as YAML, so a JSON document is accepted as well.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_monitor(path: &Path) -> Result<MonitorFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::MonitorFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_monitor(&content)
}

/// Parse and validate monitor file contents.
///
/// # Errors
///
/// Returns `ConfigError` if the content cannot be parsed or fails validation.
pub fn parse_monitor(content: &str) -> Result<MonitorFile, ConfigError> {
    let monitor: MonitorFile =
        serde_yaml::from_str(content).map_err(ConfigError::MonitorFileParse)?;
    validate_monitor(&monitor)?;
    Ok(monitor)
}

fn validate_monitor(monitor: &MonitorFile) -> Result<(), ConfigError> {
    let mut seen_nodes = HashSet::new();
    for node in &monitor.nodes {
        if node.trim().is_empty() {
            return Err(ConfigError::Validation(
                "node handle must be non-empty".to_string(),
            ));
        }
        if !seen_nodes.insert(node.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate node: '{node}'"
            )));
        }
    }

    let categories = [
        ("incidents", &monitor.patterns.incidents),
        ("locations", &monitor.patterns.locations),
        ("status", &monitor.patterns.status),
    ];

    // normalized term -> category it was first declared in
    let mut owners: HashMap<String, &str> = HashMap::new();
    for (category, terms) in categories {
        for term in terms {
            if term.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "empty term in patterns.{category}"
                )));
            }
            if let Some(owner) = owners.insert(normalize(term), category) {
                if owner != category {
                    return Err(ConfigError::Validation(format!(
                        "term '{term}' appears in both patterns.{owner} and patterns.{category}"
                    )));
                }
            }
        }
    }

    let stale = &monitor.stale;
    if stale
        .old_year_markers
        .iter()
        .chain(stale.months.iter())
        .any(|m| m.trim().is_empty())
    {
        return Err(ConfigError::Validation(
            "stale markers and month names must be non-empty".to_string(),
        ));
    }
    if let Some(month) = stale.current_month {
        if month == 0 || usize::from(month) > stale.months.len() {
            return Err(ConfigError::Validation(format!(
                "stale.current_month {month} is outside 1..={}",
                stale.months.len()
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "monitor_test.rs"]
mod tests;
