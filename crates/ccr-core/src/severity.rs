//! # Rule Severity
//!
//! The three severities a compliance rule can carry. The derived `Ord`
//! follows declaration order, so variants are declared least severe first:
//! `Minor < Moderate < Major`.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::CoreError;

/// Severity of a compliance rule.
///
/// This is the severity declared on a [`Rule`](crate::Rule) in the catalog.
/// A [`Violation`](crate::Violation) carries its own raw severity string,
/// which may disagree with the rule's and always takes precedence in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Moderate,
    Major,
}

impl Severity {
    /// All severities, most severe first.
    pub fn all() -> &'static [Severity] {
        &[Self::Major, Self::Moderate, Self::Minor]
    }

    /// Wire identifier, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Moderate => "moderate",
            Self::Minor => "minor",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "major" => Ok(Self::Major),
            "moderate" => Ok(Self::Moderate),
            "minor" => Ok(Self::Minor),
            other => Err(CoreError::UnknownSeverity(other.to_string())),
        }
    }
}
