//! # Rule Category — Closed Set
//!
//! Rules are grouped into exactly four categories. The set is not
//! extensible at runtime: the rules feed may only fill these four buckets,
//! and a key it sends under any other name is dropped by the parser.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::CoreError;

/// One of the four fixed rule groupings.
///
/// | Category | Code family | Scope |
/// |----------|-------------|-------|
/// | Identification | LO1001 | Agent and customer identification |
/// | Communication | LO1005 | DNC, third party, disclosures |
/// | Policy | LO1006–LO1007 | Cure period, threats, medical info |
/// | System | LO1009 | Documentation and activity codes |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Identification,
    Communication,
    Policy,
    System,
}

impl RuleCategory {
    /// Total number of categories.
    pub const COUNT: usize = 4;

    /// All categories in display order.
    pub fn all() -> &'static [RuleCategory] {
        &[
            Self::Identification,
            Self::Communication,
            Self::Policy,
            Self::System,
        ]
    }

    /// Wire identifier used as the key in the rules feed.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identification => "identification",
            Self::Communication => "communication",
            Self::Policy => "policy",
            Self::System => "system",
        }
    }

    /// Heading shown above the category's rules.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Identification => "Identification Rules (LO1001)",
            Self::Communication => "Communication Rules (LO1005)",
            Self::Policy => "Policy Rules (LO1006-LO1007)",
            Self::System => "System Rules (LO1009)",
        }
    }

    /// One-line summary of what the category's rules check.
    pub fn summary(&self) -> &'static str {
        match self {
            Self::Identification => "Agent & Customer ID",
            Self::Communication => "DNC, Third Party, Disclosures",
            Self::Policy => "Cure Period, Threats, Medical Info",
            Self::System => "Documentation & Activity Codes",
        }
    }
}

impl std::fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "identification" => Ok(Self::Identification),
            "communication" => Ok(Self::Communication),
            "policy" => Ok(Self::Policy),
            "system" => Ok(Self::System),
            other => Err(CoreError::UnknownCategory(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_has_count_entries() {
        assert_eq!(RuleCategory::all().len(), RuleCategory::COUNT);
    }

    #[test]
    fn roundtrip_through_str() {
        for c in RuleCategory::all() {
            assert_eq!(c.as_str().parse::<RuleCategory>().unwrap(), *c);
            assert_eq!(c.to_string(), c.as_str());
        }
    }

    #[test]
    fn unknown_category_rejected() {
        let err = "billing".parse::<RuleCategory>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownCategory(ref s) if s == "billing"));
    }

    #[test]
    fn serde_matches_as_str() {
        for c in RuleCategory::all() {
            let json = serde_json::to_string(c).unwrap();
            assert_eq!(json, format!("\"{}\"", c.as_str()));
        }
    }

    #[test]
    fn titles_carry_code_family() {
        assert!(RuleCategory::Identification.title().contains("LO1001"));
        assert!(RuleCategory::System.title().contains("LO1009"));
    }
}
