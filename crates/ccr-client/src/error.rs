//! Review API client error types.

/// Errors from review API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The API rejected the bearer token. The session must log in again.
    #[error("authentication failed calling {endpoint}; log in again")]
    Unauthorized { endpoint: String },
    /// The API returned a non-2xx status.
    #[error("review API {endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// A local file could not be read for upload.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    /// A file was refused before any request was made.
    #[error("cannot upload {filename}: {reason}")]
    Rejected { filename: String, reason: String },
    /// A batch cannot start because a precondition is not met.
    #[error("not ready to process: {0}")]
    NotReady(String),
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}
