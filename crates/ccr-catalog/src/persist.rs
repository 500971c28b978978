//! # Activation Persistence
//!
//! The catalog produces one [`RuleActivation`] per rule; the rules service
//! receives one `PUT /rules/{code}` per activation. Each request succeeds
//! or fails on its own, and [`SaveReport`] records the outcome of every
//! unit so a failed rule never hides the others.
//!
//! An edited rule is sent as a [`RuleEdit`] instead: the same endpoint, but
//! carrying the full definition along with who changed it and when.

use ccr_core::Severity;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Desired activation state for one catalog rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleActivation {
    pub code: String,
    pub active: bool,
}

impl RuleActivation {
    /// Request body for `PUT /rules/{code}`.
    pub fn body(&self) -> serde_json::Value {
        serde_json::json!({ "active": self.active })
    }
}

/// Reviewer edit to one rule's description or severity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleEdit {
    pub code: String,
    pub description: String,
    pub severity: Severity,
    pub active: bool,
    pub modified_by: String,
    pub last_modified: DateTime<Utc>,
}

impl RuleEdit {
    /// Request body for `PUT /rules/{code}`.
    pub fn body(&self) -> serde_json::Value {
        serde_json::json!({
            "description": self.description,
            "severity": self.severity,
            "active": self.active,
            "last_modified": self.last_modified.to_rfc3339_opts(SecondsFormat::Millis, true),
            "modified_by": self.modified_by,
        })
    }
}

/// Result of persisting one activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSaveOutcome {
    pub code: String,
    pub active: bool,
    /// `None` on success, otherwise the error text.
    pub error: Option<String>,
}

impl RuleSaveOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of a whole save batch, one entry per activation in the order
/// the activations were supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub outcomes: Vec<RuleSaveOutcome>,
}

impl SaveReport {
    /// Rules requested active.
    pub fn active_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.active).count()
    }

    /// Rules requested inactive.
    pub fn inactive_count(&self) -> usize {
        self.outcomes.len() - self.active_count()
    }

    /// Units whose request failed.
    pub fn failed(&self) -> impl Iterator<Item = &RuleSaveOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }

    /// `true` when every unit succeeded (vacuously true for an empty batch).
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(RuleSaveOutcome::succeeded)
    }
}
