//! Prediction service abstraction
//!
//! Forecasting and risk scoring are delegated to an external ML service.
//! This module defines the interface and its implementations:
//!
//! - `Predictor` trait: the operations callers rely on
//! - `PredictorClient` enum: concrete wrapper providing Clone + static dispatch
//! - `HttpPredictor`: talks to the service over HTTP
//! - `MockPredictor`: in-process stand-in for tests
//!
//! Callers never use a predictor directly for user-facing results; they go
//! through [`crate::resilience::ResilientCaller`] so that every failure ends
//! in a fallback.

mod http;
mod mock;
pub mod types;

pub use http::HttpPredictor;
pub use mock::{MockBehavior, MockPredictor};
pub use types::*;

use std::time::Duration;

use async_trait::async_trait;

use crate::config::PredictorConfig;
use crate::error::Result;

#[async_trait]
pub trait Predictor: Send + Sync {
    /// Forecast future monthly spending from historical expenses
    async fn forecast(&self, request: &ForecastRequest) -> Result<ForecastResult>;

    /// Score a candidate transaction against recent history
    async fn assess_risk(&self, request: &RiskRequest) -> Result<RiskAssessment>;

    /// Check if the service is reachable
    async fn health_check(&self) -> bool;

    /// Base URL (for logging)
    fn host(&self) -> &str;
}

#[derive(Clone)]
pub enum PredictorClient {
    Http(HttpPredictor),
    Mock(MockPredictor),
}

impl PredictorClient {
    pub fn from_config(config: &PredictorConfig) -> Self {
        PredictorClient::http(&config.base_url, config.timeout())
    }

    pub fn http(base_url: &str, timeout: Duration) -> Self {
        PredictorClient::Http(HttpPredictor::new(base_url, timeout))
    }

    pub fn mock() -> Self {
        PredictorClient::Mock(MockPredictor::new())
    }
}

#[async_trait]
impl Predictor for PredictorClient {
    async fn forecast(&self, request: &ForecastRequest) -> Result<ForecastResult> {
        match self {
            PredictorClient::Http(p) => p.forecast(request).await,
            PredictorClient::Mock(p) => p.forecast(request).await,
        }
    }

    async fn assess_risk(&self, request: &RiskRequest) -> Result<RiskAssessment> {
        match self {
            PredictorClient::Http(p) => p.assess_risk(request).await,
            PredictorClient::Mock(p) => p.assess_risk(request).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            PredictorClient::Http(p) => p.health_check().await,
            PredictorClient::Mock(p) => p.health_check().await,
        }
    }

    fn host(&self) -> &str {
        match self {
            PredictorClient::Http(p) => p.host(),
            PredictorClient::Mock(p) => p.host(),
        }
    }
}
