//! Test utilities for fintrack-core
//!
//! A mock prediction service that speaks the real HTTP contract, so the
//! `HttpPredictor` and the fallback paths around it can be exercised end to
//! end.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// How the mock service answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockMode {
    /// 200 with well-formed bodies
    Healthy,
    /// 500 on every endpoint
    Failing,
    /// 200 with a body that is not the expected JSON
    Malformed,
    /// Healthy answers after a delay
    Slow(Duration),
    /// 200 with fields and labels outside the documented contract
    Extended,
}

#[derive(Clone)]
struct ServerState {
    mode: MockMode,
    requests: Arc<Mutex<Vec<(String, Value)>>>,
}

/// Mock prediction service bound to an ephemeral local port
pub struct MockPredictorServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<(String, Value)>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockPredictorServer {
    /// Start a healthy mock server
    pub async fn start() -> Self {
        Self::start_with(MockMode::Healthy).await
    }

    pub async fn start_with(mode: MockMode) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = ServerState {
            mode,
            requests: requests.clone(),
        };

        let app = Router::new()
            .route("/health", get(handle_health))
            .route("/forecast", post(handle_forecast))
            .route("/fraud-detection", post(handle_fraud_detection))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            requests,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Bodies received so far, as `(path, json)`
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockPredictorServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_health(State(state): State<ServerState>) -> Response {
    match state.mode {
        MockMode::Failing => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => Json(json!({"status": "healthy", "service": "ml-service"})).into_response(),
    }
}

async fn handle_forecast(State(state): State<ServerState>, Json(body): Json<Value>) -> Response {
    record(&state, "/forecast", body);
    let response = match state.mode {
        MockMode::Extended => json!({
            "forecast": [
                {"month": "2024-05", "predicted": 1950.25, "lower": 1800.0, "upper": 2100.5}
            ],
            "accuracy": 82.1,
            "confidence": "very_high",
            "model": "rf-v2"
        }),
        _ => json!({
            "forecast": [
                {"month": "2024-04", "actual": 1800.0, "predicted": null},
                {"month": "2024-05", "actual": null, "predicted": 1950.25}
            ],
            "accuracy": 91.0,
            "confidence": "medium"
        }),
    };
    respond(state.mode, response).await
}

async fn handle_fraud_detection(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> Response {
    record(&state, "/fraud-detection", body);
    respond(
        state.mode,
        json!({
            "riskScore": 0.42,
            "riskLevel": "medium",
            "reasons": ["Amount above recent average"],
            "recommendation": "Monitor transaction"
        }),
    )
    .await
}

fn record(state: &ServerState, path: &str, body: Value) {
    state.requests.lock().unwrap().push((path.to_string(), body));
}

async fn respond(mode: MockMode, body: Value) -> Response {
    match mode {
        MockMode::Healthy | MockMode::Extended => Json(body).into_response(),
        MockMode::Failing => {
            (StatusCode::INTERNAL_SERVER_ERROR, "model not loaded").into_response()
        }
        MockMode::Malformed => (StatusCode::OK, "<html>not json</html>").into_response(),
        MockMode::Slow(delay) => {
            tokio::time::sleep(delay).await;
            Json(body).into_response()
        }
    }
}
