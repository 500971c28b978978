//! Typed client for the analysis results resource.
//!
//! Calls `GET /results`. The body is decoded leniently: missing totals read
//! as zero and a malformed `calls` or `violations` value contributes nothing.

use ccr_core::ResultsFeed;

use crate::error::ApiError;

/// Client for the results resource.
#[derive(Debug, Clone)]
pub struct ResultsClient {
    http: reqwest::Client,
    base_url: url::Url,
}

impl ResultsClient {
    pub(crate) fn new(http: reqwest::Client, base_url: url::Url) -> Self {
        Self { http, base_url }
    }

    /// Fetch the current results feed.
    pub async fn fetch(&self) -> Result<ResultsFeed, ApiError> {
        let url = crate::endpoint_url(&self.base_url, &["results"])?;
        let raw: serde_json::Value = crate::get_json(&self.http, "GET /results", url).await?;
        let feed = ResultsFeed::from_value(raw);
        tracing::info!(
            calls = feed.calls.len(),
            total_violations = feed.total_violations,
            "results fetched"
        );
        Ok(feed)
    }
}
