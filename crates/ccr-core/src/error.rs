//! # Error Types
//!
//! The catalog and report engine never fail; malformed input degrades to
//! documented defaults. Errors here cover parsing of closed vocabularies
//! and the session store, which touches the filesystem.

use thiserror::Error;

/// Top-level error type for the core crate.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A string did not name one of the four rule categories.
    #[error("unknown rule category: {0:?}")]
    UnknownCategory(String),

    /// A string did not name one of the three rule severities.
    #[error("unknown rule severity: {0:?}")]
    UnknownSeverity(String),

    /// Session store failure.
    #[error("session store error: {0}")]
    Store(#[from] StoreError),
}

/// Error raised by a [`SessionStore`](crate::SessionStore) implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("io error on {path}: {source}")]
    Io {
        /// File the store was operating on.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The backing file exists but is not a JSON object of strings.
    #[error("corrupt session file {path}: {source}")]
    Corrupt {
        /// File the store was reading.
        path: String,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// A stored value could not be encoded or decoded.
    #[error("value for key {key:?} is not valid JSON: {source}")]
    Value {
        /// Key whose value failed to (de)serialize.
        key: String,
        /// Underlying serde error.
        source: serde_json::Error,
    },
}
