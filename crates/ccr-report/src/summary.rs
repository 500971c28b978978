//! Headline figures for a results feed.
//!
//! Totals and the compliance rate are taken from the feed as the server
//! computed them. The per-severity breakdown is counted from the violations
//! actually present in `calls`.

use ccr_core::{ResultsFeed, Severity};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultsSummary {
    pub total_calls: u64,
    pub total_violations: u64,
    pub compliance_rate: f64,
    pub major: usize,
    pub moderate: usize,
    pub minor: usize,
    /// Violations whose severity tag is not one of the three known tags.
    pub other: usize,
}

impl ResultsSummary {
    pub fn from_feed(feed: &ResultsFeed) -> Self {
        let mut summary = Self {
            total_calls: feed.total_calls,
            total_violations: feed.total_violations,
            compliance_rate: feed.compliance_rate,
            ..Self::default()
        };

        for violation in feed.calls.iter().flat_map(|c| c.violations.iter()) {
            match violation.severity.parse::<Severity>() {
                Ok(Severity::Major) => summary.major += 1,
                Ok(Severity::Moderate) => summary.moderate += 1,
                Ok(Severity::Minor) => summary.minor += 1,
                Err(_) => summary.other += 1,
            }
        }
        summary
    }

    /// Violations counted from the calls, as opposed to the server total.
    pub fn counted_violations(&self) -> usize {
        self.major + self.moderate + self.minor + self.other
    }

    /// Calls in the feed with no violations.
    pub fn clean_calls(feed: &ResultsFeed) -> usize {
        feed.calls.iter().filter(|c| c.violations.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccr_core::{Call, Violation};

    fn feed() -> ResultsFeed {
        ResultsFeed {
            total_calls: 3,
            total_violations: 4,
            compliance_rate: 33.3,
            calls: vec![
                Call::new(Some("c1"), "a.wav")
                    .with_violation(Violation::new("LO1001.06", "major"))
                    .with_violation(Violation::new("LO1001.03", "minor")),
                Call::new(Some("c2"), "b.wav")
                    .with_violation(Violation::new("LO1005.02", "moderate"))
                    .with_violation(Violation::new("LO1005.02", "catastrophic")),
                Call::new(Some("c3"), "c.wav"),
            ],
        }
    }

    #[test]
    fn counts_by_actual_severity() {
        let s = ResultsSummary::from_feed(&feed());
        assert_eq!((s.major, s.moderate, s.minor, s.other), (1, 1, 1, 1));
        assert_eq!(s.counted_violations(), 4);
        assert_eq!(s.total_calls, 3);
        assert!((s.compliance_rate - 33.3).abs() < f64::EPSILON);
    }

    #[test]
    fn clean_calls_are_counted() {
        assert_eq!(ResultsSummary::clean_calls(&feed()), 1);
    }

    #[test]
    fn empty_feed_is_all_zero() {
        assert_eq!(ResultsSummary::from_feed(&ResultsFeed::default()), ResultsSummary::default());
    }
}
