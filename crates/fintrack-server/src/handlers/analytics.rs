//! Analytics handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Extension, Json,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use fintrack_core::{RiskCandidate, TimeRange};

use crate::{success, AppError, AppState, AuthUser};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingQuery {
    pub time_range: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastQuery {
    pub time_range: Option<String>,
}

/// Body of a risk assessment request
#[derive(Debug, Deserialize)]
pub struct FraudDetectionRequest {
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub merchant: Option<String>,
}

/// Absent means the default range; present but unknown is a validation error
fn parse_time_range(raw: Option<&str>) -> Result<TimeRange, AppError> {
    match raw {
        None | Some("") => Ok(TimeRange::default()),
        Some(token) => token
            .parse()
            .map_err(|e: String| AppError::validation(vec![e])),
    }
}

/// GET /api/analytics/spending - Spending trends, breakdown and insights
pub async fn spending_analytics(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Query(params): Query<SpendingQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let range = parse_time_range(params.time_range.as_deref())?;
    let category = params.category.as_deref().filter(|c| !c.trim().is_empty());

    let report = state
        .services
        .spending
        .spending_analytics(&user_id, range, category, Utc::now().date_naive())
        .await
        .map_err(AppError::from_core)?;

    Ok(success(report))
}

/// GET /api/analytics/dashboard - Current month at a glance
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<Json<serde_json::Value>, AppError> {
    let summary = state
        .services
        .dashboard
        .dashboard(&user_id, Utc::now().date_naive())
        .await
        .map_err(AppError::from_core)?;

    Ok(success(summary))
}

/// GET /api/analytics/forecast - Monthly spending forecast
pub async fn forecast(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Query(params): Query<ForecastQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let range = parse_time_range(params.time_range.as_deref())?;

    let result = state
        .services
        .forecast
        .forecast(&user_id, range)
        .await
        .map_err(AppError::from_core)?;

    Ok(success(result))
}

/// POST /api/analytics/fraud-detection - Risk score for a candidate transaction
pub async fn fraud_detection(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    body: Result<Json<FraudDetectionRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(body) = body.map_err(|e| {
        debug!(error = %e, "Rejected fraud-detection body");
        AppError::validation(vec![e.body_text()])
    })?;

    let mut errors = Vec::new();
    if body.amount.is_none() {
        errors.push("amount is required".to_string());
    }
    if body.category.is_none() {
        errors.push("category is required".to_string());
    }
    let (Some(amount), Some(category)) = (body.amount, body.category) else {
        return Err(AppError::validation(errors));
    };

    let candidate = RiskCandidate {
        amount,
        category,
        merchant: body.merchant,
    };

    let assessment = state
        .services
        .risk
        .assess(&user_id, &candidate, Utc::now())
        .await
        .map_err(AppError::from_core)?;

    Ok(success(assessment))
}
