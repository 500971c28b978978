//! # Results Subcommand
//!
//! Fetches analysis results, prints the headline figures and one line per
//! violation, and optionally writes the violation report as CSV.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use ccr_core::{ResultsFeed, SessionStore};
use ccr_report::{to_csv, ReportRow, ReportTables, ResultsSummary, ViolationReportBuilder, DEFAULT_REPORT_FILENAME};
use clap::Args;

use crate::session::ReviewSession;
use crate::{block_on, sign_out_if_unauthorized, Context};

/// Arguments for `ccr results`.
#[derive(Args, Debug)]
pub struct ResultsArgs {
    /// Write the violation report as CSV. Without a value the report is
    /// written to `anycompany_compliance_report.csv`.
    #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_REPORT_FILENAME)]
    pub csv: Option<PathBuf>,

    /// YAML or JSON file with severity labels and rule descriptions.
    #[arg(long)]
    pub tables: Option<PathBuf>,
}

/// Execute `ccr results`.
pub fn run_results(args: &ResultsArgs, ctx: &Context) -> Result<u8> {
    let tables = match &args.tables {
        Some(path) => ReportTables::from_path(path)?,
        None => ReportTables::default(),
    };

    let mut session = ctx.open_session()?;
    let client = ctx.client(&session)?;

    let feed = block_on(async { client.results().fetch().await })?;
    let feed = match feed {
        Ok(feed) => feed,
        Err(e) => return Err(sign_out_if_unauthorized(&mut session, e)),
    };
    session.set_results(feed);

    report(&session, &ViolationReportBuilder::new(tables), args.csv.as_deref())
}

fn report<S: SessionStore>(
    session: &ReviewSession<S>,
    builder: &ViolationReportBuilder,
    csv: Option<&Path>,
) -> Result<u8> {
    let empty = ResultsFeed::default();
    let feed = session.results().unwrap_or(&empty);
    let summary = ResultsSummary::from_feed(feed);
    let rows = builder.build(&feed.calls);

    print_summary(&summary, ResultsSummary::clean_calls(feed));
    print_rows(&rows);

    if let Some(path) = csv {
        write_csv(path, &rows)?;
        println!("OK: wrote {} rows to {}", rows.len(), path.display());
    }
    Ok(0)
}

fn print_summary(summary: &ResultsSummary, clean_calls: usize) {
    println!(
        "Analysis complete: {} calls processed, {} violations found",
        summary.total_calls, summary.total_violations
    );
    println!("  Compliance rate: {:.1}%", summary.compliance_rate);
    println!(
        "  Major: {}  Moderate: {}  Minor: {}",
        summary.major, summary.moderate, summary.minor
    );
    if summary.other > 0 {
        println!("  Unclassified: {}", summary.other);
    }
    println!("  Calls without violations: {clean_calls}");
}

fn print_rows(rows: &[ReportRow]) {
    if rows.is_empty() {
        println!("No violations.");
        return;
    }
    for row in rows {
        println!(
            "{} | {} | {} | {} | {} | {}",
            row.record_date,
            row.severity_label,
            row.test_code,
            row.preset_comment,
            row.call_id,
            row.filename.as_deref().unwrap_or("-")
        );
    }
}

fn write_csv(path: &Path, rows: &[ReportRow]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, to_csv(rows)).with_context(|| format!("failed to write {}", path.display()))
}
