//! # ccr-cli — Reviewer Console for Call Compliance Review
//!
//! Provides the `ccr` command-line interface over the review API.
//!
//! ## Subcommands
//!
//! - `ccr login` / `ccr logout` — Store or forget the bearer token.
//! - `ccr rules` — List, toggle, bulk-select, save and edit rules.
//! - `ccr upload` — Reference data and `.wav` audio uploads.
//! - `ccr results` — Violation report, optionally exported to CSV.
//! - `ccr metrics` — Entity-extraction quality metrics.
//!
//! Session state lives in `<state-dir>/session.json` between invocations.
//!
//! ## Exit codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | Error |
//! | 2 | A batch (rule save, audio upload) finished with failures |

pub mod auth;
pub mod metrics;
pub mod results;
pub mod rules;
pub mod session;
pub mod upload;

use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};
use ccr_client::{ApiConfig, ApiError, ReviewClient};
use ccr_core::{FileSessionStore, SessionStore};

use crate::session::ReviewSession;

/// Exit code for a batch that finished with at least one failed unit.
pub const EXIT_PARTIAL_FAILURE: u8 = 2;

/// File name of the session store inside the state directory.
pub const SESSION_FILE: &str = "session.json";

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Context {
    pub state_dir: PathBuf,
    pub endpoint: Option<String>,
}

impl Context {
    pub fn store(&self) -> FileSessionStore {
        FileSessionStore::new(self.state_dir.join(SESSION_FILE))
    }

    /// Open the stored session, resuming it if still valid.
    pub fn open_session(&self) -> Result<ReviewSession<FileSessionStore>> {
        let mut session = ReviewSession::new(self.store());
        session
            .restore(chrono::Utc::now())
            .context("failed to read session state")?;
        Ok(session)
    }

    /// Build an API client. The token comes from `CCR_API_TOKEN` when set,
    /// otherwise from the signed-in session.
    pub fn client(&self, session: &ReviewSession<FileSessionStore>) -> Result<ReviewClient> {
        let config = ApiConfig::from_env(self.endpoint.as_deref())
            .context("review API is not configured")?;

        let config = match (&config.api_token, session.token()) {
            (Some(_), _) => config,
            (None, Some(token)) => config.with_token(Some(token.to_string())),
            (None, None) => bail!("not signed in; run `ccr login` first"),
        };
        tracing::debug!(?config, "client configuration");

        Ok(ReviewClient::new(config)?)
    }
}

/// Run a future to completion on a fresh single-threaded runtime.
pub fn block_on<F: std::future::Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    Ok(runtime.block_on(future))
}

/// On a rejected token, sign the session out before reporting the error.
pub fn sign_out_if_unauthorized<S: SessionStore>(
    session: &mut ReviewSession<S>,
    err: ApiError,
) -> anyhow::Error {
    if err.is_unauthorized() {
        if let Err(e) = session.logout() {
            tracing::warn!(error = %e, "failed to clear session");
        }
    }
    err.into()
}
