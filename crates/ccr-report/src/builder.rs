//! # Violation Report Builder
//!
//! Flattens calls into one [`ReportRow`] per violation.
//!
//! ## Derivation rules
//!
//! | Field | Source |
//! |-------|--------|
//! | `record_date` | Build time, identical for every row of one build |
//! | `severity_label` | `severity_labels[violation.severity]`, else the raw tag |
//! | `test_code` | `violation.code` if non-empty, else `violation.rule_code` |
//! | `preset_comment` | `"<first word of label>-<rule description or Unknown violation>"` |
//! | `call_id` | `call.call_id` if non-empty, else [`PLACEHOLDER_CALL_ID`] |
//! | `filename`, `audio_url`, `transcript_url` | Copied from the call |
//!
//! `record_date` is the time the report was generated, not the time of the
//! call. The results feed carries no per-violation timestamp.

use ccr_core::{Call, Violation};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tables::ReportTables;

/// Call id used for every row whose call has no id. Always the same value.
pub const PLACEHOLDER_CALL_ID: Uuid = uuid::uuid!("d02cefbc-5911-4b71-9d9b-eb09c524ae6f");

/// Description used when a rule code has no entry in the description table.
pub const UNKNOWN_VIOLATION: &str = "Unknown violation";

/// One normalized report line derived from one violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub record_date: String,
    pub severity_label: String,
    pub test_code: String,
    pub preset_comment: String,
    pub call_id: String,
    pub filename: Option<String>,
    pub audio_url: Option<String>,
    pub transcript_url: Option<String>,
}

/// Format a build time the way report rows display it:
/// `M/D/YYYY, h:MM:SS AM`.
pub fn format_record_date(at: NaiveDateTime) -> String {
    at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

/// Builds report rows against a fixed set of lookup tables.
#[derive(Debug, Clone, Default)]
pub struct ViolationReportBuilder {
    tables: ReportTables,
}

impl ViolationReportBuilder {
    pub fn new(tables: ReportTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &ReportTables {
        &self.tables
    }

    /// Build rows stamped with the current local time.
    pub fn build(&self, calls: &[Call]) -> Vec<ReportRow> {
        self.build_at(calls, Local::now().naive_local())
    }

    /// Build rows stamped with `at`. Pure: the same input and `at` always
    /// give the same rows.
    pub fn build_at(&self, calls: &[Call], at: NaiveDateTime) -> Vec<ReportRow> {
        let record_date = format_record_date(at);
        let rows: Vec<ReportRow> = calls
            .iter()
            .flat_map(|call| {
                call.violations
                    .iter()
                    .map(|violation| self.row(call, violation, &record_date))
                    .collect::<Vec<_>>()
            })
            .collect();

        tracing::debug!(calls = calls.len(), rows = rows.len(), "built violation report");
        rows
    }

    /// Label for a raw severity tag; unknown tags are used verbatim.
    pub fn severity_label(&self, severity: &str) -> String {
        self.tables
            .severity_label(severity)
            .unwrap_or(severity)
            .to_string()
    }

    /// `"<first word of label>-<description>"`.
    pub fn preset_comment(&self, severity_label: &str, rule_code: Option<&str>) -> String {
        let prefix = severity_label.split(' ').next().unwrap_or_default();
        let description = rule_code
            .and_then(|code| self.tables.rule_description(code))
            .unwrap_or(UNKNOWN_VIOLATION);
        format!("{prefix}-{description}")
    }

    fn row(&self, call: &Call, violation: &Violation, record_date: &str) -> ReportRow {
        let severity_label = self.severity_label(&violation.severity);
        let preset_comment = self.preset_comment(&severity_label, violation.rule_code.as_deref());

        let test_code = non_empty(violation.code.as_deref())
            .or(violation.rule_code.as_deref())
            .unwrap_or_default()
            .to_string();

        let call_id = non_empty(call.call_id.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| PLACEHOLDER_CALL_ID.to_string());

        ReportRow {
            record_date: record_date.to_string(),
            severity_label,
            test_code,
            preset_comment,
            call_id,
            filename: call.filename.clone(),
            audio_url: call.audio_url.clone(),
            transcript_url: call.transcript_url.clone(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 7)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn builder() -> ViolationReportBuilder {
        ViolationReportBuilder::default()
    }

    #[test]
    fn record_date_uses_us_numeric_twelve_hour_format() {
        assert_eq!(format_record_date(at(15, 4, 5)), "3/7/2026, 3:04:05 PM");
        assert_eq!(format_record_date(at(0, 0, 9)), "3/7/2026, 12:00:09 AM");
        assert_eq!(format_record_date(at(12, 30, 0)), "3/7/2026, 12:30:00 PM");
    }

    #[test]
    fn empty_input_gives_no_rows() {
        assert!(builder().build(&[]).is_empty());
    }

    #[test]
    fn calls_without_violations_give_no_rows() {
        let calls = vec![Call::new(Some("c1"), "a.wav"), Call::new(None, "b.wav")];
        assert!(builder().build(&calls).is_empty());
    }

    #[test]
    fn known_rule_major_violation() {
        let calls = vec![Call::new(Some("c1"), "a.wav").with_violation(Violation::new("LO1001.06", "major"))];
        let rows = builder().build_at(&calls, at(9, 15, 0));
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.record_date, "3/7/2026, 9:15:00 AM");
        assert_eq!(row.severity_label, "Major Defect");
        assert_eq!(row.test_code, "LO1001.06");
        assert_eq!(row.preset_comment, "Major-Agent did not state their name");
        assert_eq!(row.call_id, "c1");
        assert_eq!(row.filename.as_deref(), Some("a.wav"));
    }

    #[test]
    fn unknown_rule_code_uses_fallback_description() {
        let calls = vec![Call::new(Some("c1"), "a.wav").with_violation(Violation::new("ZZ9999", "minor"))];
        let rows = builder().build(&calls);
        assert_eq!(rows[0].preset_comment, "Minor-Unknown violation");
        assert_eq!(rows[0].severity_label, "Minor Defect");
    }

    #[test]
    fn unknown_severity_is_used_verbatim() {
        let calls = vec![Call::new(Some("c1"), "a.wav").with_violation(Violation::new("LO1005.02", "critical high"))];
        let rows = builder().build(&calls);
        assert_eq!(rows[0].severity_label, "critical high");
        assert_eq!(
            rows[0].preset_comment,
            "critical-Disclosed account status or personal information with Third party"
        );
    }

    #[test]
    fn display_code_overrides_test_code_but_not_lookup() {
        let v = Violation::new("LO1001.06", "moderate").with_code("CUSTOM-7");
        let rows = builder().build(&[Call::new(Some("c1"), "a.wav").with_violation(v)]);
        assert_eq!(rows[0].test_code, "CUSTOM-7");
        assert_eq!(rows[0].preset_comment, "Moderate-Agent did not state their name");
    }

    #[test]
    fn empty_display_code_falls_back_to_rule_code() {
        let v = Violation::new("LO1001.03", "major").with_code("");
        let rows = builder().build(&[Call::new(Some("c1"), "a.wav").with_violation(v)]);
        assert_eq!(rows[0].test_code, "LO1001.03");
    }

    #[test]
    fn violation_without_any_code() {
        let v = Violation {
            rule_code: None,
            code: None,
            severity: "major".into(),
        };
        let rows = builder().build(&[Call::new(Some("c1"), "a.wav").with_violation(v)]);
        assert_eq!(rows[0].test_code, "");
        assert_eq!(rows[0].preset_comment, "Major-Unknown violation");
    }

    #[test]
    fn missing_call_id_uses_placeholder_every_time() {
        let calls = vec![
            Call::new(None, "a.wav").with_violation(Violation::new("LO1001.06", "major")),
            Call::new(Some(""), "b.wav").with_violation(Violation::new("LO1001.06", "minor")),
        ];
        let first = builder().build(&calls);
        let second = builder().build(&calls);
        let expected = PLACEHOLDER_CALL_ID.to_string();
        assert_eq!(expected, "d02cefbc-5911-4b71-9d9b-eb09c524ae6f");
        for row in first.iter().chain(second.iter()) {
            assert_eq!(row.call_id, expected);
        }
    }

    #[test]
    fn rows_preserve_call_then_violation_order() {
        let calls = vec![
            Call::new(Some("c1"), "a.wav")
                .with_violation(Violation::new("LO1001.03", "minor"))
                .with_violation(Violation::new("LO1001.05", "major")),
            Call::new(Some("c2"), "b.wav"),
            Call::new(Some("c3"), "c.wav").with_violation(Violation::new("LO1001.03", "minor")),
        ];
        let rows = builder().build(&calls);
        let keys: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.call_id.as_str(), r.test_code.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![("c1", "LO1001.03"), ("c1", "LO1001.05"), ("c3", "LO1001.03")]
        );
    }

    #[test]
    fn urls_are_copied_verbatim() {
        let mut call = Call::new(Some("c1"), "a.wav").with_violation(Violation::new("LO1001.06", "major"));
        call.audio_url = Some("https://audio/a.wav?sig=1".into());
        call.transcript_url = Some("https://transcripts/a.json".into());
        let rows = builder().build(&[call]);
        assert_eq!(rows[0].audio_url.as_deref(), Some("https://audio/a.wav?sig=1"));
        assert_eq!(rows[0].transcript_url.as_deref(), Some("https://transcripts/a.json"));
    }

    #[test]
    fn build_at_is_deterministic() {
        let calls = vec![Call::new(Some("c1"), "a.wav").with_violation(Violation::new("LO1001.06", "major"))];
        let b = builder();
        assert_eq!(b.build_at(&calls, at(1, 2, 3)), b.build_at(&calls, at(1, 2, 3)));
    }

    #[test]
    fn substitute_tables_change_labels_and_comments() {
        let tables = ReportTables::empty()
            .with_severity_label("major", "Severe Finding")
            .with_rule_description("LO1001.06", "No name given");
        let b = ViolationReportBuilder::new(tables);
        let rows = b.build(&[Call::new(Some("c1"), "a.wav").with_violation(Violation::new("LO1001.06", "major"))]);
        assert_eq!(rows[0].severity_label, "Severe Finding");
        assert_eq!(rows[0].preset_comment, "Severe-No name given");
    }

    #[test]
    fn row_serializes_camel_case() {
        let rows = builder().build_at(
            &[Call::new(Some("c1"), "a.wav").with_violation(Violation::new("LO1001.06", "major"))],
            at(9, 0, 0),
        );
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["recordDate"], "3/7/2026, 9:00:00 AM");
        assert_eq!(json["presetComment"], "Major-Agent did not state their name");
        assert_eq!(json["callId"], "c1");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn violation() -> impl Strategy<Value = Violation> {
        (
            prop::option::of("LO100[0-9]\\.0[0-9]"),
            prop::option::of("[A-Z0-9.]{0,6}"),
            prop::sample::select(vec!["major", "moderate", "minor", "weird", ""]),
        )
            .prop_map(|(rule_code, code, severity)| Violation {
                rule_code,
                code,
                severity: severity.to_string(),
            })
    }

    fn call() -> impl Strategy<Value = Call> {
        (
            prop::option::of("[a-f0-9]{0,8}"),
            prop::collection::vec(violation(), 0..5),
        )
            .prop_map(|(call_id, violations)| Call {
                call_id,
                filename: Some("f.wav".into()),
                audio_url: None,
                transcript_url: None,
                violations,
            })
    }

    proptest! {
        /// One row per violation, whatever the input.
        #[test]
        fn row_count_equals_violation_count(calls in prop::collection::vec(call(), 0..6)) {
            let expected: usize = calls.iter().map(|c| c.violations.len()).sum();
            let rows = ViolationReportBuilder::default().build(&calls);
            prop_assert_eq!(rows.len(), expected);
        }

        /// Every row of one build shares the same record date.
        #[test]
        fn record_date_is_uniform(calls in prop::collection::vec(call(), 0..6)) {
            let rows = ViolationReportBuilder::default().build(&calls);
            if let Some(first) = rows.first() {
                prop_assert!(rows.iter().all(|r| r.record_date == first.record_date));
            }
        }

        /// Comments always join a label prefix and a description with '-'.
        #[test]
        fn comment_has_prefix_and_description(calls in prop::collection::vec(call(), 1..4)) {
            let builder = ViolationReportBuilder::default();
            for row in builder.build(&calls) {
                let prefix = row.severity_label.split(' ').next().unwrap_or_default();
                let expected = format!("{}-", prefix);
                prop_assert!(row.preset_comment.starts_with(&expected));
                prop_assert!(!row.call_id.is_empty());
            }
        }
    }
}
