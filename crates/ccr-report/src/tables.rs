//! # Report Lookup Tables
//!
//! Static reference data consulted by the builder: severity tag → label,
//! and rule code → description. The tables are configuration, not code:
//! they are injected into [`ViolationReportBuilder`](crate::ViolationReportBuilder)
//! and can be loaded from a YAML or JSON file.
//!
//! The description table is separate from the live rule
//! catalog. Editing a rule's description in the catalog changes nothing
//! here.
//!
//! ## File format
//!
//! ```yaml
//! severity_labels:
//!   major: Major Defect
//! rule_descriptions:
//!   LO1001.06: Agent did not state their name
//! ```
//!
//! A file may omit either table; the omitted table keeps its default.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error loading tables from disk.
#[derive(Error, Debug)]
pub enum TablesError {
    #[error("failed to read tables file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse JSON tables file {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("failed to parse YAML tables file {path}: {source}")]
    Yaml {
        path: String,
        source: serde_yaml::Error,
    },
}

/// Lookup tables used to derive report labels and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTables {
    #[serde(default = "default_severity_labels")]
    pub severity_labels: BTreeMap<String, String>,
    #[serde(default = "default_rule_descriptions")]
    pub rule_descriptions: BTreeMap<String, String>,
}

impl Default for ReportTables {
    fn default() -> Self {
        Self {
            severity_labels: default_severity_labels(),
            rule_descriptions: default_rule_descriptions(),
        }
    }
}

impl ReportTables {
    /// Tables with no entries. Every severity is labelled verbatim and
    /// every rule is "Unknown violation".
    pub fn empty() -> Self {
        Self {
            severity_labels: BTreeMap::new(),
            rule_descriptions: BTreeMap::new(),
        }
    }

    /// Label for a raw severity tag, or `None` when the table has no entry.
    pub fn severity_label(&self, severity: &str) -> Option<&str> {
        self.severity_labels.get(severity).map(String::as_str)
    }

    /// Description for a rule code, or `None` when the table has no entry.
    pub fn rule_description(&self, rule_code: &str) -> Option<&str> {
        self.rule_descriptions.get(rule_code).map(String::as_str)
    }

    pub fn with_severity_label(mut self, severity: &str, label: &str) -> Self {
        self.severity_labels.insert(severity.to_string(), label.to_string());
        self
    }

    pub fn with_rule_description(mut self, rule_code: &str, description: &str) -> Self {
        self.rule_descriptions
            .insert(rule_code.to_string(), description.to_string());
        self
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Load tables from a file. `.json` files are parsed as JSON, anything
    /// else as YAML.
    pub fn from_path(path: &Path) -> Result<Self, TablesError> {
        let shown = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| TablesError::Io {
            path: shown.clone(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let tables = if is_json {
            Self::from_json_str(&raw).map_err(|source| TablesError::Json {
                path: shown.clone(),
                source,
            })?
        } else {
            Self::from_yaml_str(&raw).map_err(|source| TablesError::Yaml {
                path: shown.clone(),
                source,
            })?
        };

        tracing::debug!(
            path = %shown,
            severity_labels = tables.severity_labels.len(),
            rule_descriptions = tables.rule_descriptions.len(),
            "loaded report tables"
        );
        Ok(tables)
    }
}

fn default_severity_labels() -> BTreeMap<String, String> {
    [
        ("major", "Major Defect"),
        ("moderate", "Moderate Defect"),
        ("minor", "Minor Defect"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_rule_descriptions() -> BTreeMap<String, String> {
    [
        (
            "LO1001.03",
            "Agent did not provide first/last name in Massachusetts",
        ),
        (
            "LO1001.05",
            "Agent provided a name that cannot be traced back to them and is not on alias log",
        ),
        ("LO1001.06", "Agent did not state their name"),
        (
            "LO1001.08",
            "Agent did not use the customer's first and last name, including suffix, on the voicemail",
        ),
        (
            "LO1001.11",
            "Agent did not state \"AnyCompany Servicing\" at the beginning of call or when leaving a message",
        ),
        (
            "LO1005.02",
            "Disclosed account status or personal information with Third party",
        ),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
