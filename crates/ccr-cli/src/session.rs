//! # Review Session
//!
//! The single owner of the reviewer's state: the bearer token and profile,
//! the rule catalog with its selection set, the reference files uploaded so
//! far, and the last results fetched. Everything that must outlive one
//! command goes through an injected [`SessionStore`].
//!
//! ## Stored keys
//!
//! | Key | Value |
//! |-----|-------|
//! | `auth_token` | Bearer token, raw string |
//! | `user` | [`UserProfile`] as JSON |
//! | `selected_rules` | Selected rule codes as a JSON array |
//! | `reference_files` | [`ReferenceFile`] list as JSON |

use ccr_catalog::RuleCatalog;
use ccr_core::{ResultsFeed, SessionStore, StoreError};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const KEY_AUTH_TOKEN: &str = "auth_token";
pub const KEY_USER: &str = "user";
pub const KEY_SELECTED_RULES: &str = "selected_rules";
pub const KEY_REFERENCE_FILES: &str = "reference_files";

/// A stored session is only resumed if it stays valid this much longer.
pub const EXPIRY_BUFFER_SECS: i64 = 300;

/// Token lifetime used when the caller does not give one.
pub const DEFAULT_SESSION_SECS: i64 = 8 * 60 * 60;

/// Signed-in reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

impl UserProfile {
    pub fn new(username: impl Into<String>, email: Option<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            username: username.into(),
            email,
            exp: expires_at.timestamp(),
        }
    }

    /// `true` while the profile is valid for at least the expiry buffer.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.exp > (now + Duration::seconds(EXPIRY_BUFFER_SECS)).timestamp()
    }
}

/// A reference data file accepted by the upload service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceFile {
    pub name: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Session state over an injected store.
pub struct ReviewSession<S: SessionStore> {
    store: S,
    token: Option<String>,
    user: Option<UserProfile>,
    catalog: RuleCatalog,
    results: Option<ResultsFeed>,
}

impl<S: SessionStore> ReviewSession<S> {
    /// A signed-out session with an empty catalog.
    pub fn new(store: S) -> Self {
        Self {
            store,
            token: None,
            user: None,
            catalog: RuleCatalog::new(),
            results: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut RuleCatalog {
        &mut self.catalog
    }

    pub fn results(&self) -> Option<&ResultsFeed> {
        self.results.as_ref()
    }

    pub fn set_results(&mut self, feed: ResultsFeed) {
        self.results = Some(feed);
    }

    /// Store a fresh token and profile.
    pub fn login(&mut self, token: &str, user: UserProfile) -> Result<(), StoreError> {
        self.store.set(KEY_AUTH_TOKEN, token)?;
        self.store.set_json(KEY_USER, &user)?;
        tracing::info!(username = %user.username, "signed in");
        self.token = Some(token.to_string());
        self.user = Some(user);
        Ok(())
    }

    /// Resume a stored session. Returns whether the session is signed in.
    ///
    /// A missing, unreadable, or nearly expired profile logs the session out.
    pub fn restore(&mut self, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let token = self.store.get(KEY_AUTH_TOKEN)?;
        let user = match self.store.get_json::<UserProfile>(KEY_USER) {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "stored profile unreadable");
                None
            }
        };

        match (token, user) {
            (Some(token), Some(user)) if user.is_fresh(now) => {
                tracing::debug!(username = %user.username, "session restored");
                self.token = Some(token);
                self.user = Some(user);
                self.load_selection()?;
                Ok(true)
            }
            (Some(_), Some(user)) => {
                tracing::info!(username = %user.username, "stored session expired");
                self.logout()?;
                Ok(false)
            }
            _ => {
                self.logout()?;
                Ok(false)
            }
        }
    }

    /// Forget everything: stored keys, catalog, selection, results.
    pub fn logout(&mut self) -> Result<(), StoreError> {
        self.store.clear()?;
        self.token = None;
        self.user = None;
        self.catalog = RuleCatalog::new();
        self.results = None;
        Ok(())
    }

    /// Write the selection set to the store.
    pub fn persist_selection(&self) -> Result<(), StoreError> {
        let codes: Vec<&String> = self.catalog.selection().iter().collect();
        self.store.set_json(KEY_SELECTED_RULES, &codes)
    }

    fn load_selection(&mut self) -> Result<(), StoreError> {
        match self.store.get_json::<Vec<String>>(KEY_SELECTED_RULES) {
            Ok(Some(codes)) => self.catalog.set_selection(codes),
            Ok(None) => self.catalog.clear_selection(),
            Err(e) => {
                tracing::warn!(error = %e, "stored selection unreadable, starting empty");
                self.catalog.clear_selection();
            }
        }
        Ok(())
    }

    /// Reference files uploaded during this session.
    pub fn reference_files(&self) -> Result<Vec<ReferenceFile>, StoreError> {
        Ok(self
            .store
            .get_json::<Vec<ReferenceFile>>(KEY_REFERENCE_FILES)?
            .unwrap_or_default())
    }

    pub fn record_reference_upload(&self, name: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut files = self.reference_files()?;
        files.push(ReferenceFile {
            name: name.to_string(),
            uploaded_at: at,
        });
        self.store.set_json(KEY_REFERENCE_FILES, &files)
    }
}
