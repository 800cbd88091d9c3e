//! Practicum status API client
//!
//! Fetches homework-status snapshots and maps the three failure kinds
//! (transport, HTTP status, body-level error indicator) to typed errors.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::{ReviewbotError, Result};

/// Body keys the remote service uses to signal its own failure
/// (rate-limiting, invalid from_date) inside an HTTP 200 response
const ERROR_INDICATOR_KEYS: [&str; 2] = ["error", "code"];

/// Abstraction over the status API for the poll loop
#[async_trait]
pub trait StatusApi: Send + Sync {
    /// Fetch the status snapshot for activity since `from_date`
    ///
    /// Returns the decoded body unmodified; shape validation is the
    /// caller's job.
    async fn fetch(&self, from_date: i64) -> Result<Value>;
}

/// HTTP client for the Practicum homework-status endpoint
pub struct PracticumClient {
    client: Client,
    endpoint: String,
    token: String,
}

impl PracticumClient {
    /// Create a client with an explicit request timeout
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReviewbotError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
        })
    }

    fn error_indicator(body: &Value) -> Option<(&'static str, &Value)> {
        ERROR_INDICATOR_KEYS
            .iter()
            .find_map(|key| body.get(key).map(|value| (*key, value)))
    }
}

#[async_trait]
impl StatusApi for PracticumClient {
    async fn fetch(&self, from_date: i64) -> Result<Value> {
        log::info!("Requesting homework statuses with from_date={}", from_date);

        let response = self
            .client
            .get(&self.endpoint)
            .header("Authorization", format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|source| ReviewbotError::Connectivity { from_date, source })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(ReviewbotError::StatusCode {
                status: status.as_u16(),
                from_date,
            });
        }

        let body: Value = response.json().await.map_err(|e| {
            ReviewbotError::ResponseProtocol(format!("failed to decode body: {}", e))
        })?;

        if let Some((key, value)) = Self::error_indicator(&body) {
            return Err(ReviewbotError::ResponseProtocol(format!(
                "API reported failure: {}={}",
                key, value
            )));
        }

        Ok(body)
    }
}

impl std::fmt::Debug for PracticumClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PracticumClient")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
