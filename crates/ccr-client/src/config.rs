//! Review API client configuration.
//!
//! The endpoint is checked against an allowlist of host suffixes before any
//! request is built, so a mistyped or hostile `CCR_API_ENDPOINT` cannot point
//! the client (and the bearer token it carries) at an arbitrary host.

use url::Url;

/// Host suffixes accepted when no allowlist is configured.
pub const DEFAULT_ALLOWED_DOMAINS: &[&str] =
    &["execute-api.amazonaws.com", "cognito-idp.amazonaws.com"];

/// Configuration for connecting to the review API.
///
/// Custom `Debug` implementation redacts the `api_token` field.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL of the review API, e.g. `https://abc.execute-api.amazonaws.com/prod`.
    pub endpoint: Url,
    /// Bearer token. `None` sends unauthenticated requests.
    pub api_token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `CCR_API_ENDPOINT` (required unless `endpoint_override` is given)
    /// - `CCR_API_TOKEN` (optional)
    /// - `CCR_TIMEOUT_SECS` (default: 30)
    /// - `CCR_ALLOWED_API_DOMAINS` (comma separated, default: [`DEFAULT_ALLOWED_DOMAINS`])
    pub fn from_env(endpoint_override: Option<&str>) -> Result<Self, ConfigError> {
        let raw = match endpoint_override {
            Some(e) => e.to_string(),
            None => std::env::var("CCR_API_ENDPOINT").map_err(|_| ConfigError::MissingEndpoint)?,
        };

        let allowed: Vec<String> = match std::env::var("CCR_ALLOWED_API_DOMAINS") {
            Ok(list) => list
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string)
                .collect(),
            Err(_) => DEFAULT_ALLOWED_DOMAINS.iter().map(|d| d.to_string()).collect(),
        };

        let endpoint = validate_endpoint(&raw, &allowed)?;

        Ok(Self {
            endpoint,
            api_token: std::env::var("CCR_API_TOKEN").ok().filter(|t| !t.is_empty()),
            timeout_secs: std::env::var("CCR_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        })
    }

    /// Create a configuration pointing at a local mock server (for testing).
    /// The allowlist is not applied.
    pub fn local_mock(uri: &str, token: &str) -> Result<Self, ConfigError> {
        let endpoint = Url::parse(uri)
            .map_err(|e| ConfigError::InvalidUrl(uri.to_string(), e.to_string()))?;
        Ok(Self {
            endpoint,
            api_token: Some(token.to_string()),
            timeout_secs: 5,
        })
    }

    /// Replace the token, keeping everything else.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.api_token = token;
        self
    }
}

/// Parse `raw` and require its host to end with one of `allowed`.
pub fn validate_endpoint(raw: &str, allowed: &[String]) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(raw.to_string(), e.to_string()))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(
            raw.to_string(),
            format!("unsupported scheme {}", url.scheme()),
        ));
    }

    let host = url.host_str().unwrap_or_default();
    if !allowed.iter().any(|domain| host.ends_with(domain.as_str())) {
        return Err(ConfigError::DisallowedHost(host.to_string()));
    }
    Ok(url)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("CCR_API_ENDPOINT environment variable is required")]
    MissingEndpoint,
    #[error("invalid URL {0}: {1}")]
    InvalidUrl(String, String),
    #[error("API host {0} is not in the allowed domain list")]
    DisallowedHost(String),
}
