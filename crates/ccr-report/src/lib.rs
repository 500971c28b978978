//! # ccr-report — Violation Report Engine
//!
//! Turns the calls returned by the results service into flat report rows
//! and serializes those rows to CSV.
//!
//! ```text
//! ResultsFeed.calls ──> ViolationReportBuilder::build ──> Vec<ReportRow> ──> csv::to_csv
//!                              ^
//!                        ReportTables (severity labels, rule descriptions)
//! ```
//!
//! Rows are values: every build produces a fresh `Vec`, and nothing here
//! mutates its input. The only impure input is the wall clock, read once
//! per build; [`ViolationReportBuilder::build_at`] takes it explicitly.

pub mod builder;
pub mod csv;
pub mod summary;
pub mod tables;

pub use builder::{format_record_date, ReportRow, ViolationReportBuilder, PLACEHOLDER_CALL_ID};
pub use csv::{to_csv, CSV_HEADER, DEFAULT_REPORT_FILENAME};
pub use summary::ResultsSummary;
pub use tables::{ReportTables, TablesError};
