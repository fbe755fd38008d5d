//! Spendcast Core Library
//!
//! Budget forecasting from monthly spending history:
//! - Daily expansion of sparse monthly totals
//! - Pluggable forecast engines (trend + seasonality, mock)
//! - Monthly aggregation with confidence scoring
//! - Trend detection
//! - Current-month projection blending model and naive rate
//! - Forecast configuration with embedded defaults

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod expansion;
pub mod models;
pub mod pipeline;
pub mod projection;
pub mod scoring;

pub use config::{ForecastConfig, ModelSettings, PipelineSettings};
pub use engine::{FittedModel, ForecastEngine, MockEngine, TrendSeasonalEngine};
pub use error::{Error, Result};
pub use models::{
    Confidence, CurrentMonthProjection, ForecastRequest, ForecastResult, HistoricalEntry,
    ModelInfo, MonthlyPrediction, Trend,
};
pub use pipeline::forecast;

/// Round a money amount to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
