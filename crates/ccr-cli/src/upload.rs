//! # Upload Subcommand
//!
//! - `reference` — Upload one reference data file (JSON or CSV).
//! - `audio` — Upload `.wav` call recordings for processing.
//!
//! Audio processing requires reference data: `audio` refuses to start until
//! at least one reference upload has been recorded in the session.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use ccr_client::uploads::{ensure_ready, select_audio, UploadStatus};
use ccr_client::ReviewClient;
use ccr_core::SessionStore;
use clap::{Args, Subcommand};

use crate::session::ReviewSession;
use crate::{block_on, sign_out_if_unauthorized, Context, EXIT_PARTIAL_FAILURE};

/// Arguments for the `ccr upload` subcommand.
#[derive(Args, Debug)]
pub struct UploadArgs {
    #[command(subcommand)]
    pub command: UploadCommand,
}

/// Upload subcommands.
#[derive(Subcommand, Debug)]
pub enum UploadCommand {
    /// Upload a reference data file used for rule validation.
    Reference {
        /// JSON or CSV file.
        file: PathBuf,
    },

    /// Upload call recordings. Files other than `.wav` are skipped.
    Audio {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

/// Execute the upload subcommand.
pub fn run_upload(args: &UploadArgs, ctx: &Context) -> Result<u8> {
    let mut session = ctx.open_session()?;
    let client = ctx.client(&session)?;

    block_on(async {
        match &args.command {
            UploadCommand::Reference { file } => cmd_reference(&client, &mut session, file).await,
            UploadCommand::Audio { files } => cmd_audio(&client, &mut session, files).await,
        }
    })?
}

async fn cmd_reference<S: SessionStore>(
    client: &ReviewClient,
    session: &mut ReviewSession<S>,
    file: &Path,
) -> Result<u8> {
    if !file.is_file() {
        bail!("reference file not found: {}", file.display());
    }

    let target = match client.uploads().upload_reference(file).await {
        Ok(target) => target,
        Err(e) => return Err(sign_out_if_unauthorized(session, e)),
    };

    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    session.record_reference_upload(&name, chrono::Utc::now())?;

    println!("OK: uploaded reference data {name} as {}", target.key);
    Ok(0)
}

async fn cmd_audio<S: SessionStore>(
    client: &ReviewClient,
    session: &mut ReviewSession<S>,
    files: &[PathBuf],
) -> Result<u8> {
    let (mut jobs, skipped) = select_audio(files.iter().cloned());
    for name in &skipped {
        println!("SKIP: {name} (only .wav files are accepted)");
    }

    ensure_ready(jobs.len(), session.reference_files()?.len())?;

    client
        .uploads()
        .upload_audio_batch(&mut jobs, |job| match job.status {
            UploadStatus::Uploading => tracing::info!(file = %job.filename, "uploading"),
            UploadStatus::Completed => println!("OK: {}", job.filename),
            UploadStatus::Error => println!(
                "FAIL: {}: {}",
                job.filename,
                job.error.as_deref().unwrap_or_default()
            ),
            UploadStatus::Pending => {}
        })
        .await;

    let failed = jobs.iter().filter(|j| j.status == UploadStatus::Error).count();
    if failed == 0 {
        println!("OK: uploaded {} audio files; processing starts automatically", jobs.len());
        Ok(0)
    } else {
        println!("FAIL: {failed} of {} audio files were not uploaded", jobs.len());
        Ok(EXIT_PARTIAL_FAILURE)
    }
}
