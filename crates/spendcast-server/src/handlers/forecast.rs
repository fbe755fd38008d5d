//! Forecast handlers

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::Utc;
use tracing::{debug, warn};

use crate::{AppError, AppState};
use spendcast_core::{forecast, ForecastRequest, ForecastResult};

/// POST /predict - Forecast future months and project the current one
///
/// A missing or unparseable body is treated the same as one without history.
/// Well-formed JSON with mistyped fields is reported as it is.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ForecastRequest>, JsonRejection>,
) -> Result<Json<ForecastResult>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Rejected forecast request body");
        match rejection {
            JsonRejection::JsonDataError(_) => AppError::bad_request(&rejection.body_text()),
            _ => AppError::from(spendcast_core::Error::MissingHistory),
        }
    })?;

    run_forecast(state, request).await
}

/// GET /test - Forecast the built-in six-month sample
pub async fn run_sample(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ForecastResult>, AppError> {
    run_forecast(state, ForecastRequest::sample()).await
}

/// Run the pipeline on the blocking pool; fitting is CPU-bound
async fn run_forecast(
    state: Arc<AppState>,
    request: ForecastRequest,
) -> Result<Json<ForecastResult>, AppError> {
    let months = request.historical_data.as_ref().map_or(0, Vec::len);
    debug!(
        months,
        forecast_months = request.forecast_months,
        "Forecast requested"
    );

    let today = Utc::now().date_naive();
    let result = tokio::task::spawn_blocking(move || {
        forecast(
            state.engine.as_ref(),
            &request,
            &state.config.forecast,
            today,
        )
    })
    .await
    .map_err(|e| AppError::prediction_failed(e.into()))??;

    Ok(Json(result))
}
