//! CSV rendering of report rows.
//!
//! Every field is wrapped in double quotes. Embedded quotes are written
//! as-is, without doubling; downstream spreadsheets that split on `","`
//! will mis-read such a field. Only `filename` is exported from the call
//! locators; `audio_url` and `transcript_url` stay in the on-screen table.

use crate::builder::ReportRow;

/// Fixed header line, first line of every export.
pub const CSV_HEADER: &str = "Record Date,Severity,Test Code,Preset Comment,Genesys Call ID,Audio File";

/// File name used when the caller does not choose one.
pub const DEFAULT_REPORT_FILENAME: &str = "anycompany_compliance_report.csv";

/// Filename written for rows whose call had none.
pub const UNKNOWN_FILENAME: &str = "unknown.wav";

/// Render rows as CSV text: header first, one line per row, `\n`
/// separated, no trailing newline.
pub fn to_csv(rows: &[ReportRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(CSV_HEADER.to_string());
    lines.extend(rows.iter().map(line));
    lines.join("\n")
}

fn line(row: &ReportRow) -> String {
    let filename = row
        .filename
        .as_deref()
        .filter(|f| !f.is_empty())
        .unwrap_or(UNKNOWN_FILENAME);

    [
        row.record_date.as_str(),
        row.severity_label.as_str(),
        row.test_code.as_str(),
        row.preset_comment.as_str(),
        row.call_id.as_str(),
        filename,
    ]
    .iter()
    .map(|field| format!("\"{field}\""))
    .collect::<Vec<_>>()
    .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ViolationReportBuilder;
    use ccr_core::{Call, ResultsFeed, Violation};
    use chrono::NaiveDate;

    fn row(filename: Option<&str>) -> ReportRow {
        ReportRow {
            record_date: "3/7/2026, 9:00:00 AM".into(),
            severity_label: "Major Defect".into(),
            test_code: "LO1001.06".into(),
            preset_comment: "Major-Agent did not state their name".into(),
            call_id: "c1".into(),
            filename: filename.map(str::to_string),
            audio_url: Some("https://audio".into()),
            transcript_url: None,
        }
    }

    #[test]
    fn empty_rows_give_header_only() {
        assert_eq!(to_csv(&[]), CSV_HEADER);
    }

    #[test]
    fn row_fields_are_quoted_in_column_order() {
        let csv = to_csv(&[row(Some("a.wav"))]);
        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            r#""3/7/2026, 9:00:00 AM","Major Defect","LO1001.06","Major-Agent did not state their name","c1","a.wav""#
        );
        assert!(!csv.contains("https://audio"));
    }

    #[test]
    fn missing_filename_falls_back() {
        for name in [None, Some("")] {
            let csv = to_csv(&[row(name)]);
            assert!(csv.ends_with(r#","c1","unknown.wav""#));
        }
    }

    #[test]
    fn quotes_are_not_escaped() {
        let mut r = row(Some("a.wav"));
        r.preset_comment = r#"Minor-Agent did not state "AnyCompany Servicing""#.into();
        let csv = to_csv(&[r]);
        assert!(csv.contains(r#""Minor-Agent did not state "AnyCompany Servicing"""#));
    }

    #[test]
    fn no_trailing_newline() {
        let csv = to_csv(&[row(Some("a.wav")), row(Some("b.wav"))]);
        assert!(!csv.ends_with('\n'));
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn malformed_violation_still_gets_a_line() {
        let feed = ResultsFeed::from_value(serde_json::json!({
            "total_calls": "1",
            "calls": [{"call_id": "c1", "filename": "a.wav", "violations": [
                {"rule_code": "LO1001.06", "severity": "major"},
                {"rule_code": "LO1001.03", "severity": null}
            ]}]
        }));
        let rows = ViolationReportBuilder::default().build(&feed.calls);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].severity_label, "");
        assert_eq!(
            rows[1].preset_comment,
            "-Agent did not provide first/last name in Massachusetts"
        );
        assert_eq!(to_csv(&rows).split('\n').count(), 3);
    }

    #[test]
    fn only_date_varies_between_builds() {
        let calls = vec![Call::new(Some("c1"), "a.wav").with_violation(Violation::new("LO1001.06", "major"))];
        let builder = ViolationReportBuilder::default();
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let first = to_csv(&builder.build_at(&calls, day.and_hms_opt(8, 0, 0).unwrap()));
        let second = to_csv(&builder.build_at(&calls, day.and_hms_opt(20, 0, 1).unwrap()));

        let tail = r#","Major Defect","LO1001.06","Major-Agent did not state their name","c1","a.wav""#;
        let first_line = first.lines().nth(1).unwrap();
        let second_line = second.lines().nth(1).unwrap();
        assert_eq!(first_line, format!("\"10/19/2026, 8:00:00 AM\"{tail}"));
        assert_eq!(second_line, format!("\"10/19/2026, 8:00:01 PM\"{tail}"));
    }
}
