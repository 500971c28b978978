//! Compliance rule as held in the catalog.

use serde::{Deserialize, Serialize};

use crate::severity::Severity;

/// A named compliance check.
///
/// `code` is the only identity: two rules with the same code are the same
/// rule regardless of description or severity. Serializes with the feed's
/// field names (`desc` for the description).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// Stable identifier, e.g. `LO1001.03`.
    pub code: String,
    /// Reviewer-editable text. Informational only.
    #[serde(rename = "desc", default)]
    pub description: String,
    pub severity: Severity,
    /// Validation configuration for the server-side analyzer. Never
    /// interpreted on this side.
    #[serde(default = "empty_logic")]
    pub logic: serde_json::Value,
}

fn empty_logic() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Rule {
    /// Create a rule with empty `logic`.
    pub fn new(code: impl Into<String>, description: impl Into<String>, severity: Severity) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            severity,
            logic: empty_logic(),
        }
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for Rule {}

impl std::hash::Hash for Rule {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}
