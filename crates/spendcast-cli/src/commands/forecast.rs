//! One-shot forecast commands

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use spendcast_core::{
    forecast, ForecastConfig, ForecastRequest, ForecastResult, TrendSeasonalEngine,
};

use super::load_config;

/// Read a request file and run the forecast
pub fn forecast_file(
    config: &ForecastConfig,
    file: &Path,
    today: NaiveDate,
) -> Result<ForecastResult> {
    let content =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let request: ForecastRequest = serde_json::from_str(&content)
        .with_context(|| format!("Invalid forecast request in {}", file.display()))?;

    run(config, &request, today)
}

fn run(
    config: &ForecastConfig,
    request: &ForecastRequest,
    today: NaiveDate,
) -> Result<ForecastResult> {
    let engine = TrendSeasonalEngine::new(config.model.clone());
    tracing::debug!(
        months = request.historical_data.as_ref().map_or(0, Vec::len),
        %today,
        "Running forecast"
    );
    let result = forecast(&engine, request, config, today).context("Forecast failed")?;
    Ok(result)
}

pub fn cmd_predict(
    config_path: Option<&Path>,
    file: &Path,
    today: Option<NaiveDate>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let today = today.unwrap_or_else(|| Utc::now().date_naive());

    let result = forecast_file(&config, file, today)?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}

pub fn cmd_sample(config_path: Option<&Path>, today: Option<NaiveDate>) -> Result<()> {
    let config = load_config(config_path)?;
    let today = today.unwrap_or_else(|| Utc::now().date_naive());

    let result = run(&config, &ForecastRequest::sample(), today)?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
