//! Health probes

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use tracing::debug;

use fintrack_core::Predictor;

use crate::AppState;

/// GET /health - Liveness
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/health - Dependency status
pub async fn api_health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let db = state.db.clone();
    let database = tokio::task::spawn_blocking(move || db.health_check())
        .await
        .unwrap_or(false);
    let ml_service = state.services.predictor().health_check().await;

    let calls = state.services.call_stats();
    debug!(
        primary = calls.primary,
        fallback = calls.fallback,
        "Prediction call outcomes"
    );

    let label = |ok: bool| if ok { "healthy" } else { "unhealthy" };

    Json(json!({
        "status": if database && ml_service { "OK" } else { "DEGRADED" },
        "services": {
            "database": label(database),
            "ml_service": label(ml_service),
        },
    }))
}
