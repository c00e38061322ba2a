//! HTTP client for the prediction service
//!
//! Endpoints:
//! - `POST /forecast` with a [`ForecastRequest`]
//! - `POST /fraud-detection` with a [`RiskRequest`]
//! - `GET /health`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;

use super::types::{ForecastRequest, ForecastResult, RiskAssessment, RiskRequest};
use super::Predictor;

#[derive(Clone)]
pub struct HttpPredictor {
    http_client: Client,
    base_url: String,
}

impl HttpPredictor {
    /// Create a client whose requests are cut off after `timeout`
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(
                    error = %e,
                    timeout_ms = timeout.as_millis() as u64,
                    "Failed to build prediction client, requests will not time out at the client"
                );
                Client::new()
            });
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Calling prediction service");

        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

#[async_trait]
impl Predictor for HttpPredictor {
    async fn forecast(&self, request: &ForecastRequest) -> Result<ForecastResult> {
        self.post_json("/forecast", request).await
    }

    async fn assess_risk(&self, request: &RiskRequest) -> Result<RiskAssessment> {
        self.post_json("/fraud-detection", request).await
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.http_client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
