//! Spendcast Web Server
//!
//! Axum-based JSON API in front of the forecasting pipeline.
//!
//! Routes are served at the root and mirrored under `/api`:
//! - `GET /health` - liveness check
//! - `POST /predict` - forecast from caller-supplied history
//! - `GET /test` - forecast for a built-in sample payload
//!
//! The server holds no per-request state. Every prediction fits a fresh model
//! on the blocking thread pool.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info};

use spendcast_core::{ForecastConfig, ForecastEngine, TrendSeasonalEngine};

mod handlers;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// Engine and pipeline settings
    pub forecast: ForecastConfig,
}

/// Shared application state
pub struct AppState {
    pub config: ServerConfig,
    pub engine: Arc<dyn ForecastEngine>,
}

/// Create the application router with the default engine
pub fn create_router(config: ServerConfig) -> Router {
    let engine = Arc::new(TrendSeasonalEngine::new(config.forecast.model.clone()));
    create_router_with_engine(config, engine)
}

/// Create the application router with a specific engine (for testing)
pub fn create_router_with_engine(config: ServerConfig, engine: Arc<dyn ForecastEngine>) -> Router {
    info!(
        engine = engine.name(),
        features = ?engine.features(),
        "Forecast engine configured"
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        engine,
    });

    let routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/predict", post(handlers::predict))
        .route("/test", get(handlers::run_sample));

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    };

    routes
        .clone()
        .nest("/api", routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
}

/// Start the server
pub async fn serve(host: &str, port: u16) -> anyhow::Result<()> {
    serve_with_config(host, port, ServerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(host: &str, port: u16, config: ServerConfig) -> anyhow::Result<()> {
    let app = create_router(config);
    let addr = format!("{}:{}", host, port);

    info!("Starting ML Budget Forecasting service at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    error: String,
    message: Option<String>,
    internal: Option<anyhow::Error>,
}

/// Message attached to every failed prediction
const PREDICTION_FAILED: &str = "ML prediction failed";

impl AppError {
    pub fn bad_request(error: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: error.to_string(),
            message: None,
            internal: None,
        }
    }

    /// A failed prediction; the error text is echoed to the caller
    pub fn prediction_failed(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: err.to_string(),
            message: Some(PREDICTION_FAILED.to_string()),
            internal: Some(err),
        }
    }

    fn with_message(mut self, message: String) -> Self {
        self.message = Some(message);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Prediction error");
        }

        let mut body = serde_json::json!({
            "success": false,
            "error": self.error,
        });
        if let Some(message) = self.message {
            body["message"] = serde_json::Value::String(message);
        }

        (self.status, Json(body)).into_response()
    }
}

impl From<spendcast_core::Error> for AppError {
    fn from(err: spendcast_core::Error) -> Self {
        use spendcast_core::Error;

        match err {
            Error::InsufficientHistory { required, .. } => {
                AppError::bad_request("Insufficient historical data").with_message(format!(
                    "Need at least {} months of data for ML prediction",
                    required
                ))
            }
            err if err.is_validation() => AppError::bad_request(&err.to_string()),
            err => AppError::prediction_failed(err.into()),
        }
    }
}
