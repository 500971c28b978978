//! # Sign-in Subcommands
//!
//! `ccr login` stores a bearer token issued by the identity provider
//! together with the reviewer's profile. `ccr logout` forgets the token,
//! the rule selection and the recorded reference uploads.

use anyhow::{bail, Context as _, Result};
use ccr_core::SessionStore;
use chrono::{DateTime, Duration, Utc};
use clap::Args;

use crate::session::{ReviewSession, UserProfile, DEFAULT_SESSION_SECS};
use crate::Context;

/// Arguments for `ccr login`.
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Bearer token issued by the identity provider.
    #[arg(long)]
    pub token: String,

    /// Reviewer user name.
    #[arg(long)]
    pub user: String,

    /// Reviewer e-mail address.
    #[arg(long)]
    pub email: Option<String>,

    /// Seconds until the token expires.
    #[arg(long, default_value_t = DEFAULT_SESSION_SECS)]
    pub expires_in: i64,
}

/// Execute `ccr login`.
pub fn run_login(args: &LoginArgs, ctx: &Context) -> Result<u8> {
    let mut session = ReviewSession::new(ctx.store());
    cmd_login(&mut session, args, Utc::now())
}

/// Execute `ccr logout`.
pub fn run_logout(ctx: &Context) -> Result<u8> {
    let mut session = ReviewSession::new(ctx.store());
    session.logout().context("failed to clear session state")?;
    println!("OK: signed out");
    Ok(0)
}

fn cmd_login<S: SessionStore>(
    session: &mut ReviewSession<S>,
    args: &LoginArgs,
    now: DateTime<Utc>,
) -> Result<u8> {
    if args.token.trim().is_empty() {
        bail!("token must not be empty");
    }
    if args.user.trim().is_empty() {
        bail!("user must not be empty");
    }

    let profile = UserProfile::new(
        args.user.trim(),
        args.email.clone(),
        now + Duration::seconds(args.expires_in),
    );
    if !profile.is_fresh(now) {
        bail!("token lifetime of {}s is too short to start a session", args.expires_in);
    }

    session
        .login(&args.token, profile)
        .context("failed to store session")?;
    println!("OK: signed in as {}", args.user.trim());
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccr_core::MemorySessionStore;

    fn args(token: &str, user: &str, expires_in: i64) -> LoginArgs {
        LoginArgs {
            token: token.into(),
            user: user.into(),
            email: None,
            expires_in,
        }
    }

    #[test]
    fn login_stores_session() {
        let mut session = ReviewSession::new(MemorySessionStore::new());
        let now = Utc::now();
        assert_eq!(cmd_login(&mut session, &args("tok", "qualityanalyst", 3600), now).unwrap(), 0);
        assert!(session.is_authenticated());
        assert!(session.restore(now).unwrap());
    }

    #[test]
    fn login_rejects_blank_fields() {
        let mut session = ReviewSession::new(MemorySessionStore::new());
        let err = cmd_login(&mut session, &args(" ", "u", 3600), Utc::now()).unwrap_err();
        assert!(err.to_string().contains("token"));
        let err = cmd_login(&mut session, &args("t", "", 3600), Utc::now()).unwrap_err();
        assert!(err.to_string().contains("user"));
    }

    #[test]
    fn login_rejects_short_lifetime() {
        let mut session = ReviewSession::new(MemorySessionStore::new());
        assert!(cmd_login(&mut session, &args("tok", "u", 60), Utc::now()).is_err());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn logout_removes_session_file() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context {
            state_dir: dir.path().to_path_buf(),
            endpoint: None,
        };
        let mut session = ReviewSession::new(ctx.store());
        cmd_login(&mut session, &args("tok", "u", 3600), Utc::now()).unwrap();
        assert!(dir.path().join(crate::SESSION_FILE).exists());

        assert_eq!(run_logout(&ctx).unwrap(), 0);
        assert!(!dir.path().join(crate::SESSION_FILE).exists());
    }
}
