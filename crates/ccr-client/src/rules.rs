//! Typed client for the rules resource.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/rules` | Fetch the categorized rules feed |
//! | PUT    | `/rules/{code}` | Set one rule's activation (`{"active": bool}`) |
//! | PUT    | `/rules/{code}` | Replace an edited rule's definition ([`RuleEdit::body`]) |
//!
//! Saving a catalog issues one `PUT` per rule, all in flight at once. Each
//! request stands alone: a failure is recorded against its rule code in the
//! [`SaveReport`] and the others still complete.

use ccr_catalog::{RuleActivation, RuleCatalog, RuleEdit, RuleSaveOutcome, SaveReport};
use tokio::task::JoinSet;

use crate::error::ApiError;
use crate::retry::{retry_send, RetryPolicy};

/// Client for the rules resource.
#[derive(Debug, Clone)]
pub struct RulesClient {
    http: reqwest::Client,
    base_url: url::Url,
}

impl RulesClient {
    pub(crate) fn new(http: reqwest::Client, base_url: url::Url) -> Self {
        Self { http, base_url }
    }

    /// Fetch the raw rules feed.
    ///
    /// Calls `GET {base_url}/rules`.
    pub async fn fetch_feed(&self) -> Result<serde_json::Value, ApiError> {
        let url = crate::endpoint_url(&self.base_url, &["rules"])?;
        crate::get_json(&self.http, "GET /rules", url).await
    }

    /// Fetch the feed and rebuild `catalog` from it.
    ///
    /// Any failure other than [`ApiError::Unauthorized`] leaves the catalog
    /// with four empty categories and returns `Ok`. The selection set is
    /// never touched.
    pub async fn refresh(&self, catalog: &mut RuleCatalog) -> Result<(), ApiError> {
        match self.fetch_feed().await {
            Ok(feed) => {
                catalog.replace_from(&feed);
                tracing::info!(rules = catalog.count_total(), "rule catalog refreshed");
                Ok(())
            }
            Err(e) if e.is_unauthorized() => Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "rules feed unavailable, using empty catalog");
                catalog.clear_rules();
                Ok(())
            }
        }
    }

    /// Set one rule's activation.
    ///
    /// Calls `PUT {base_url}/rules/{code}`.
    pub async fn save_activation(&self, activation: &RuleActivation) -> Result<(), ApiError> {
        let endpoint = format!("PUT /rules/{}", activation.code);
        let url = crate::endpoint_url(&self.base_url, &["rules", &activation.code])?;
        let body = activation.body();

        let resp = retry_send(RetryPolicy::Idempotent, &endpoint, || {
            self.http.put(url.clone()).json(&body).send()
        })
        .await
        .map_err(|e| ApiError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;

        crate::check_status(&endpoint, resp).await?;
        tracing::debug!(code = %activation.code, active = activation.active, "rule activation saved");
        Ok(())
    }

    /// Send a reviewer's edit of one rule.
    ///
    /// Calls `PUT {base_url}/rules/{code}`.
    pub async fn update_rule(&self, edit: &RuleEdit) -> Result<(), ApiError> {
        let endpoint = format!("PUT /rules/{}", edit.code);
        let url = crate::endpoint_url(&self.base_url, &["rules", &edit.code])?;
        let body = edit.body();

        let resp = retry_send(RetryPolicy::Idempotent, &endpoint, || {
            self.http.put(url.clone()).json(&body).send()
        })
        .await
        .map_err(|e| ApiError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;

        crate::check_status(&endpoint, resp).await?;
        tracing::info!(
            code = %edit.code,
            severity = %edit.severity,
            modified_by = %edit.modified_by,
            "rule updated"
        );
        Ok(())
    }

    /// Save every activation concurrently and wait for all of them.
    ///
    /// Outcomes are reported in the order the activations were given.
    pub async fn save_batch(&self, activations: Vec<RuleActivation>) -> SaveReport {
        let mut outcomes: Vec<RuleSaveOutcome> = activations
            .iter()
            .map(|a| RuleSaveOutcome {
                code: a.code.clone(),
                active: a.active,
                error: Some("save task did not complete".into()),
            })
            .collect();

        let mut tasks = JoinSet::new();
        for (index, activation) in activations.into_iter().enumerate() {
            let client = self.clone();
            tasks.spawn(async move {
                let result = client.save_activation(&activation).await;
                (index, result.err().map(|e| e.to_string()))
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, error)) => {
                    if let Some(message) = &error {
                        tracing::warn!(code = %outcomes[index].code, error = %message, "rule save failed");
                    }
                    outcomes[index].error = error;
                }
                Err(e) => tracing::error!(error = %e, "rule save task aborted"),
            }
        }

        let report = SaveReport { outcomes };
        tracing::info!(
            active = report.active_count(),
            inactive = report.inactive_count(),
            failed = report.failed_count(),
            "rule configuration saved"
        );
        report
    }

    /// Push the catalog's activation snapshot.
    pub async fn save_catalog(&self, catalog: &RuleCatalog) -> SaveReport {
        self.save_batch(catalog.snapshot_for_persist()).await
    }
}
