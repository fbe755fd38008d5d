//! Health check handler

use axum::Json;
use serde::Serialize;

/// Service name reported by the health check
pub const SERVICE_NAME: &str = "ML Budget Forecasting";

/// Response for the health check
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// GET /health - Liveness check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
    })
}
