//! # ccr CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ccr_cli::auth::{run_login, run_logout, LoginArgs};
use ccr_cli::metrics::{run_metrics, MetricsArgs};
use ccr_cli::results::{run_results, ResultsArgs};
use ccr_cli::rules::{run_rules, RulesArgs};
use ccr_cli::upload::{run_upload, UploadArgs};
use ccr_cli::Context;

/// Call compliance review console.
///
/// Configure which compliance rules are checked, upload reference data and
/// call recordings for analysis, and export the resulting violation report.
#[derive(Parser, Debug)]
#[command(name = "ccr", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory holding the session between invocations.
    #[arg(long, global = true, default_value = ".ccr")]
    state_dir: PathBuf,

    /// Review API base URL. Overrides `CCR_API_ENDPOINT`.
    #[arg(long, global = true)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in with a bearer token.
    Login(LoginArgs),

    /// Forget the stored token and selection.
    Logout,

    /// List, toggle, edit and save compliance rules.
    Rules(RulesArgs),

    /// Upload reference data or call recordings.
    Upload(UploadArgs),

    /// Show analysis results and export the violation report.
    Results(ResultsArgs),

    /// Show entity-extraction quality metrics.
    Metrics(MetricsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let ctx = Context {
        state_dir: cli.state_dir,
        endpoint: cli.endpoint,
    };
    tracing::debug!(state_dir = %ctx.state_dir.display(), "ccr starting");

    let result = match cli.command {
        Commands::Login(args) => run_login(&args, &ctx),
        Commands::Logout => run_logout(&ctx),
        Commands::Rules(args) => run_rules(&args, &ctx),
        Commands::Upload(args) => run_upload(&args, &ctx),
        Commands::Results(args) => run_results(&args, &ctx),
        Commands::Metrics(args) => run_metrics(&args, &ctx),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
