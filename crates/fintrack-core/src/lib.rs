//! FinTrack Core Library
//!
//! Analytics and forecasting engine for the FinTrack personal finance tracker:
//! - Time window resolution for symbolic ranges (`1month` … `1year`)
//! - Spending aggregation, health score and rule-based insights
//! - Spending forecasts and transaction risk scoring via an external
//!   prediction service, with deterministic local fallbacks
//! - SQLite transaction store and CSV import
//! - Layered configuration

pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod forecast;
pub mod import;
pub mod models;
pub mod predict;
pub mod resilience;
pub mod risk;
pub mod services;
pub mod store;
pub mod window;

/// Test utilities including a mock prediction service
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use analytics::{
    Aggregates, DashboardService, DashboardSummary, Insight, InsightKind,
    SpendingAnalyticsService, SpendingReport, SpendingSummary,
};
pub use config::{Config, PredictorConfig, ServerSettings, StoreConfig};
pub use db::{Database, TransactionInsertResult};
pub use error::{Error, Result};
pub use forecast::{fallback_forecast, ForecastService};
pub use import::{import_csv, parse_csv, ImportSummary};
pub use models::{CategoryInfo, NewTransaction, Transaction, TransactionKind, DEFAULT_CATEGORIES};
pub use predict::{
    Confidence, ForecastPoint, ForecastResult, HttpPredictor, MockPredictor, Predictor,
    PredictorClient, RiskAssessment, RiskLevel,
};
pub use resilience::{CallStats, ResilientCaller};
pub use risk::{fallback_assessment, RiskAssessmentService, RiskCandidate};
pub use services::Services;
pub use store::{MemoryStore, SharedStore, SortOrder, TransactionQuery, TransactionStore};
pub use window::{TimeRange, TimeWindow};
