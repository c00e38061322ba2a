//! FinTrack Web Server
//!
//! Axum-based REST API over the FinTrack analytics engine.
//!
//! - Bearer JWT authentication on `/api/analytics` (use `--no-auth` for local dev)
//! - Restrictive CORS policy
//! - Security headers on every response
//! - Uniform `{success, data | message}` response envelope with sanitized
//!   internal errors

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{debug, error, info, warn};

use fintrack_core::{Config, Database, Predictor, Services};

mod handlers;

/// User id assigned to every request when authentication is disabled
pub const LOCAL_DEV_USER: &str = "local-dev";

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether authentication is required (secure by default)
    pub require_auth: bool,
    /// HS256 secret for bearer tokens
    pub jwt_secret: Option<String>,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            jwt_secret: None,
            allowed_origins: vec![],
        }
    }
}

impl ServerConfig {
    pub fn from_config(config: &Config, require_auth: bool) -> Self {
        Self {
            require_auth,
            jwt_secret: config.server.jwt_secret.clone(),
            allowed_origins: config.server.allowed_origins.clone(),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub services: Services,
    pub config: ServerConfig,
}

/// Authenticated caller, inserted into request extensions by the auth layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub String);

/// Bearer token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub exp: usize,
}

/// Authentication middleware
///
/// Missing bearer token is 401; a token that fails verification is 403.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    if !state.config.require_auth {
        request
            .extensions_mut()
            .insert(AuthUser(LOCAL_DEV_USER.to_string()));
        return next.run(request).await;
    }

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    let Some(token) = token else {
        debug!(path = %request.uri().path(), "Missing bearer token");
        return AppError::unauthorized("Access token required").into_response();
    };

    let Some(secret) = state.config.jwt_secret.as_deref() else {
        error!("Authentication required but no JWT secret configured");
        return AppError::forbidden("Invalid or expired token").into_response();
    };

    match decode::<Claims>(
        &token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => {
            debug!(user_id = %data.claims.user_id, path = %request.uri().path(), "Authenticated");
            request.extensions_mut().insert(AuthUser(data.claims.user_id));
            next.run(request).await
        }
        Err(e) => {
            warn!(error = %e, path = %request.uri().path(), "Invalid bearer token");
            AppError::forbidden("Invalid or expired token").into_response()
        }
    }
}

/// Create the router
pub fn create_router(db: Database, services: Services, config: ServerConfig) -> Router {
    let state = Arc::new(AppState {
        db,
        services,
        config: config.clone(),
    });

    let analytics_routes = Router::new()
        .route("/spending", get(handlers::spending_analytics))
        .route("/dashboard", get(handlers::dashboard))
        .route("/forecast", get(handlers::forecast))
        .route("/fraud-detection", post(handlers::fraud_detection))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = Router::new()
        .route("/health", get(handlers::api_health))
        .nest("/analytics", analytics_routes);

    let cors = {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        let layer = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
        if origins.is_empty() {
            layer
        } else {
            layer.allow_origin(origins)
        }
    };

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        ))
}

/// Start the server
pub async fn serve_with_config(
    db: Database,
    services: Services,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if config.require_auth && config.jwt_secret.is_none() {
        anyhow::bail!(
            "Authentication is enabled but no JWT secret is configured. \
             Set JWT_SECRET, add server.jwt_secret to the config file, or use --no-auth for local development."
        );
    }
    if !config.require_auth {
        warn!("Authentication disabled - do not expose to network!");
    }

    let predictor_host = services.predictor().host().to_string();
    let app = create_router(db, services, config);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, predictor = %predictor_host, "FinTrack API listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Successful response envelope
pub fn success<T: Serialize>(data: T) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "success": true, "data": data }))
}

/// Application error type
///
/// Internal causes are logged and never sent to the client.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    errors: Option<Vec<String>>,
    internal: Option<anyhow::Error>,
}

impl AppError {
    fn new(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            message: message.to_string(),
            errors: None,
            internal: None,
        }
    }

    pub fn validation(errors: Vec<String>) -> Self {
        Self {
            errors: Some(errors),
            ..Self::new(StatusCode::BAD_REQUEST, "Validation failed")
        }
    }

    pub fn unauthorized(msg: &str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, msg)
    }

    pub fn forbidden(msg: &str) -> Self {
        Self::new(StatusCode::FORBIDDEN, msg)
    }

    /// Map a core error: validation stays a 400, everything else is a 500
    pub fn from_core(err: fintrack_core::Error) -> Self {
        match err {
            fintrack_core::Error::Validation(errors) => Self::validation(errors),
            other => other.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let mut body = serde_json::json!({
            "success": false,
            "message": self.message,
        });
        if let Some(errors) = self.errors {
            body["errors"] = serde_json::json!(errors);
        }

        (self.status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "An internal error occurred".to_string(),
            errors: None,
            internal: Some(err.into()),
        }
    }
}
