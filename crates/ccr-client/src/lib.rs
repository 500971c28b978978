//! # ccr-client -- Typed client for the call compliance review API
//!
//! Sub-clients, one per service resource:
//! - **Rules** via `GET /rules` and `PUT /rules/{code}`
//! - **Results** via `GET /results`
//! - **Entity metrics** via `GET /entity-metrics`
//! - **Uploads** via `POST /upload-url` followed by a `PUT` to the returned
//!   presigned URL
//!
//! Every API request carries `Authorization: Bearer <token>` when a token is
//! configured. An HTTP 401 from any API endpoint surfaces as
//! [`ApiError::Unauthorized`]. Presigned storage URLs are called without the
//! bearer header.

pub mod config;
pub mod error;
pub mod metrics;
pub(crate) mod retry;
pub mod results;
pub mod rules;
pub mod uploads;

pub use config::{ApiConfig, ConfigError};
pub use error::ApiError;

use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

/// Top-level review API client. Holds one sub-client per resource.
#[derive(Debug, Clone)]
pub struct ReviewClient {
    rules: rules::RulesClient,
    results: results::ResultsClient,
    metrics: metrics::MetricsClient,
    uploads: uploads::UploadClient,
}

impl ReviewClient {
    /// Create a new client from configuration.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = &config.api_token {
            let value = reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| {
                    ApiError::Config(ConfigError::InvalidUrl(
                        "api_token".into(),
                        "token is not a valid header value".into(),
                    ))
                })?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;
        let storage = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        tracing::debug!(endpoint = %config.endpoint, "review API client ready");

        Ok(Self {
            rules: rules::RulesClient::new(http.clone(), config.endpoint.clone()),
            results: results::ResultsClient::new(http.clone(), config.endpoint.clone()),
            metrics: metrics::MetricsClient::new(http.clone(), config.endpoint.clone()),
            uploads: uploads::UploadClient::new(http, storage, config.endpoint),
        })
    }

    /// Access the rules client.
    pub fn rules(&self) -> &rules::RulesClient {
        &self.rules
    }

    /// Access the results client.
    pub fn results(&self) -> &results::ResultsClient {
        &self.results
    }

    /// Access the entity-metrics client.
    pub fn metrics(&self) -> &metrics::MetricsClient {
        &self.metrics
    }

    /// Access the upload client.
    pub fn uploads(&self) -> &uploads::UploadClient {
        &self.uploads
    }
}

/// `base` with `segments` appended as percent-encoded path segments.
pub(crate) fn endpoint_url(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| {
            ApiError::Config(ConfigError::InvalidUrl(
                base.to_string(),
                "URL cannot be a base".into(),
            ))
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Map 401 and other non-2xx statuses to errors.
pub(crate) async fn check_status(
    endpoint: &str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized {
            endpoint: endpoint.into(),
        });
    }
    if !status.is_success() {
        let body = resp
            .text()
            .await
            .unwrap_or_else(|e| format!("<failed to read response body: {e}>"));
        return Err(ApiError::Api {
            endpoint: endpoint.into(),
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp)
}

/// `GET url`, check status, decode JSON.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    endpoint: &str,
    url: Url,
) -> Result<T, ApiError> {
    tracing::debug!(%endpoint, "sending request");
    let resp = retry::retry_send(retry::RetryPolicy::Idempotent, endpoint, || {
        http.get(url.clone()).send()
    })
    .await
    .map_err(|e| ApiError::Http {
        endpoint: endpoint.into(),
        source: e,
    })?;

    check_status(endpoint, resp)
        .await?
        .json()
        .await
        .map_err(|e| ApiError::Deserialization {
            endpoint: endpoint.into(),
            source: e,
        })
}
