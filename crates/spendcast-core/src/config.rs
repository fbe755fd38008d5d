//! Forecast configuration
//!
//! Engine and pipeline settings, loaded with a three-step resolution:
//! 1. An explicit path, when given and present
//! 2. The per-user override (~/.local/share/spendcast/config/forecast.toml)
//! 3. Embedded defaults (compiled into binary)
//!
//! Keys missing from an override keep their default values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/forecast.toml");

/// Settings for the trend + seasonality engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSettings {
    pub yearly_seasonality: bool,
    pub weekly_seasonality: bool,
    /// Prior scale on trend changepoint deltas (lower = stiffer trend)
    pub changepoint_prior_scale: f64,
    /// Prior scale on seasonal coefficients
    pub seasonality_prior_scale: f64,
    /// Width of the prediction interval, e.g. 0.8 for 80%
    pub interval_width: f64,
    pub n_changepoints: usize,
    /// Fraction of history in which changepoints may be placed
    pub changepoint_range: f64,
    pub yearly_fourier_order: usize,
    pub weekly_fourier_order: usize,
    /// Daily points required before the engine will fit
    pub min_training_points: usize,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            yearly_seasonality: true,
            weekly_seasonality: false,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            interval_width: 0.8,
            n_changepoints: 25,
            changepoint_range: 0.8,
            yearly_fourier_order: 10,
            weekly_fourier_order: 3,
            min_training_points: 10,
        }
    }
}

/// Settings for the surrounding pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineSettings {
    /// Months of history required before a request is accepted
    pub min_history_months: usize,
    /// Extra days predicted beyond `forecastMonths * 30`
    pub forecast_pad_days: i64,
    pub max_forecast_months: u32,
    /// Weight of the model projection in the current-month blend
    pub model_weight: f64,
    pub currency_symbol: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            min_history_months: 2,
            forecast_pad_days: 15,
            max_forecast_months: 36,
            model_weight: 0.7,
            currency_symbol: "₹".to_string(),
        }
    }
}

/// Complete forecast configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ForecastConfig {
    pub model: ModelSettings,
    pub pipeline: PipelineSettings,
}

impl ForecastConfig {
    /// Load configuration, preferring `path` when it exists
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(path) if path.exists() => read_config(path)?,
            Some(path) => {
                tracing::warn!(path = %path.display(), "Config file not found, using defaults");
                DEFAULT_CONFIG.to_string()
            }
            None => match default_config_path() {
                Some(default_path) if default_path.exists() => read_config(&default_path)?,
                _ => DEFAULT_CONFIG.to_string(),
            },
        };

        parse_config(&content)
    }

    /// Parse configuration from TOML text layered over the defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }

    /// Check that settings are usable by the engine and pipeline
    pub fn validate(&self) -> Result<()> {
        let model = &self.model;
        if !(model.interval_width > 0.0 && model.interval_width < 1.0) {
            return Err(Error::Config(format!(
                "interval_width must be between 0 and 1, got {}",
                model.interval_width
            )));
        }
        if model.changepoint_prior_scale <= 0.0 || model.seasonality_prior_scale <= 0.0 {
            return Err(Error::Config("prior scales must be positive".to_string()));
        }
        if !(model.changepoint_range > 0.0 && model.changepoint_range <= 1.0) {
            return Err(Error::Config(format!(
                "changepoint_range must be in (0, 1], got {}",
                model.changepoint_range
            )));
        }

        let pipeline = &self.pipeline;
        if !(0.0..=1.0).contains(&pipeline.model_weight) {
            return Err(Error::Config(format!(
                "model_weight must be between 0 and 1, got {}",
                pipeline.model_weight
            )));
        }
        if model.min_training_points < 2 {
            return Err(Error::Config(
                "min_training_points must be at least 2".to_string(),
            ));
        }
        if pipeline.min_history_months < 2 {
            return Err(Error::Config(format!(
                "min_history_months must be at least 2, got {}",
                pipeline.min_history_months
            )));
        }
        if pipeline.forecast_pad_days < 0 {
            return Err(Error::Config(
                "forecast_pad_days must not be negative".to_string(),
            ));
        }

        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("spendcast").join("config").join("forecast.toml"))
}

fn read_config(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    model: Option<RawModel>,
    pipeline: Option<RawPipeline>,
}

#[derive(Debug, Deserialize)]
struct RawModel {
    yearly_seasonality: Option<bool>,
    weekly_seasonality: Option<bool>,
    changepoint_prior_scale: Option<f64>,
    seasonality_prior_scale: Option<f64>,
    interval_width: Option<f64>,
    n_changepoints: Option<usize>,
    changepoint_range: Option<f64>,
    yearly_fourier_order: Option<usize>,
    weekly_fourier_order: Option<usize>,
    min_training_points: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawPipeline {
    min_history_months: Option<usize>,
    forecast_pad_days: Option<i64>,
    max_forecast_months: Option<u32>,
    model_weight: Option<f64>,
    currency_symbol: Option<String>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<ForecastConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = ForecastConfig::default();

    if let Some(model) = raw.model {
        let m = &mut config.model;
        if let Some(v) = model.yearly_seasonality {
            m.yearly_seasonality = v;
        }
        if let Some(v) = model.weekly_seasonality {
            m.weekly_seasonality = v;
        }
        if let Some(v) = model.changepoint_prior_scale {
            m.changepoint_prior_scale = v;
        }
        if let Some(v) = model.seasonality_prior_scale {
            m.seasonality_prior_scale = v;
        }
        if let Some(v) = model.interval_width {
            m.interval_width = v;
        }
        if let Some(v) = model.n_changepoints {
            m.n_changepoints = v;
        }
        if let Some(v) = model.changepoint_range {
            m.changepoint_range = v;
        }
        if let Some(v) = model.yearly_fourier_order {
            m.yearly_fourier_order = v;
        }
        if let Some(v) = model.weekly_fourier_order {
            m.weekly_fourier_order = v;
        }
        if let Some(v) = model.min_training_points {
            m.min_training_points = v;
        }
    }

    if let Some(pipeline) = raw.pipeline {
        let p = &mut config.pipeline;
        if let Some(v) = pipeline.min_history_months {
            p.min_history_months = v;
        }
        if let Some(v) = pipeline.forecast_pad_days {
            p.forecast_pad_days = v;
        }
        if let Some(v) = pipeline.max_forecast_months {
            p.max_forecast_months = v;
        }
        if let Some(v) = pipeline.model_weight {
            p.model_weight = v;
        }
        if let Some(v) = pipeline.currency_symbol {
            p.currency_symbol = v;
        }
    }

    config.validate()?;
    Ok(config)
}
