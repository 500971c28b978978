//! Typed client for entity-extraction metrics.
//!
//! Calls `GET /entity-metrics`. The service reports, per entity type, how
//! many entities were detected across processed calls and how many fell
//! below the confidence threshold.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Share of low-confidence detections above which a type needs review.
pub const REVIEW_THRESHOLD_PCT: f64 = 20.0;

/// Share of low-confidence detections above which a type is monitored.
pub const MONITOR_THRESHOLD_PCT: f64 = 10.0;

/// Recommended follow-up for one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionNeeded {
    Good,
    Monitor,
    Review,
    #[serde(rename = "No Data")]
    NoData,
    /// Forward-compatible catch-all.
    #[serde(other)]
    Unknown,
}

impl ActionNeeded {
    /// Classify a type from its detection count and low-confidence share.
    pub fn classify(total_detected: u64, low_confidence_pct: f64) -> Self {
        if total_detected == 0 {
            Self::NoData
        } else if low_confidence_pct > REVIEW_THRESHOLD_PCT {
            Self::Review
        } else if low_confidence_pct > MONITOR_THRESHOLD_PCT {
            Self::Monitor
        } else {
            Self::Good
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Monitor => "Monitor",
            Self::Review => "Review",
            Self::NoData => "No Data",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for ActionNeeded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detection statistics for one entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySummary {
    #[serde(default)]
    pub total_detected: u64,
    #[serde(default)]
    pub avg_confidence: f64,
    #[serde(default)]
    pub low_confidence_count: u64,
    #[serde(default)]
    pub low_confidence_pct: f64,
    #[serde(default = "unknown_action")]
    pub action_needed: ActionNeeded,
}

fn unknown_action() -> ActionNeeded {
    ActionNeeded::Unknown
}

impl EntitySummary {
    /// The server's recommendation, or one derived from the counts when the
    /// server sent none.
    pub fn action(&self) -> ActionNeeded {
        match self.action_needed {
            ActionNeeded::Unknown => ActionNeeded::classify(self.total_detected, self.low_confidence_pct),
            known => known,
        }
    }
}

/// Body of `GET /entity-metrics`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityMetrics {
    /// Informational message, e.g. when no calls have been processed yet.
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub total_calls: u64,
    #[serde(default)]
    pub total_entities: u64,
    #[serde(default)]
    pub overall_accuracy: f64,
    #[serde(default)]
    pub avg_confidence: f64,
    #[serde(default)]
    pub failed_calls: Option<u64>,
    #[serde(default)]
    pub entity_summary: BTreeMap<String, EntitySummary>,
}

/// Client for the entity-metrics resource.
#[derive(Debug, Clone)]
pub struct MetricsClient {
    http: reqwest::Client,
    base_url: url::Url,
}

impl MetricsClient {
    pub(crate) fn new(http: reqwest::Client, base_url: url::Url) -> Self {
        Self { http, base_url }
    }

    /// Fetch entity-extraction metrics.
    pub async fn fetch(&self) -> Result<EntityMetrics, ApiError> {
        let url = crate::endpoint_url(&self.base_url, &["entity-metrics"])?;
        crate::get_json(&self.http, "GET /entity-metrics", url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_thresholds() {
        assert_eq!(ActionNeeded::classify(0, 50.0), ActionNeeded::NoData);
        assert_eq!(ActionNeeded::classify(10, 20.1), ActionNeeded::Review);
        assert_eq!(ActionNeeded::classify(10, 20.0), ActionNeeded::Monitor);
        assert_eq!(ActionNeeded::classify(10, 10.0), ActionNeeded::Good);
    }

    #[test]
    fn action_needed_wire_names() {
        let parsed: ActionNeeded = serde_json::from_str("\"No Data\"").unwrap();
        assert_eq!(parsed, ActionNeeded::NoData);
        let parsed: ActionNeeded = serde_json::from_str("\"Escalate\"").unwrap();
        assert_eq!(parsed, ActionNeeded::Unknown);
        assert_eq!(serde_json::to_string(&ActionNeeded::NoData).unwrap(), "\"No Data\"");
    }

    #[test]
    fn missing_action_is_derived() {
        let s: EntitySummary = serde_json::from_value(serde_json::json!({
            "total_detected": 40,
            "avg_confidence": 0.91,
            "low_confidence_count": 6,
            "low_confidence_pct": 15.0
        }))
        .unwrap();
        assert_eq!(s.action_needed, ActionNeeded::Unknown);
        assert_eq!(s.action(), ActionNeeded::Monitor);
    }

    #[test]
    fn empty_metrics_message_only() {
        let m: EntityMetrics = serde_json::from_value(serde_json::json!({
            "message": "No processed calls found",
            "total_calls": 0
        }))
        .unwrap();
        assert_eq!(m.message.as_deref(), Some("No processed calls found"));
        assert!(m.entity_summary.is_empty());
    }
}
