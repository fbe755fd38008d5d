//! Mock engine for testing
//!
//! Predicts the same value for every date with a fixed relative band, so
//! aggregation and projection results can be checked exactly.

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::models::{DailyForecast, DailyPoint};

use super::{FittedModel, ForecastEngine};

/// Mock forecasting engine
#[derive(Debug, Clone)]
pub struct MockEngine {
    /// Value predicted for every day
    pub daily_value: f64,
    /// Half-width of the interval relative to `daily_value`
    pub relative_band: f64,
    /// Minimum series length accepted by `fit`
    pub min_points: usize,
}

impl MockEngine {
    pub fn new(daily_value: f64) -> Self {
        Self {
            daily_value,
            relative_band: 0.05,
            min_points: 10,
        }
    }

    pub fn with_band(mut self, relative_band: f64) -> Self {
        self.relative_band = relative_band;
        self
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl ForecastEngine for MockEngine {
    fn name(&self) -> &str {
        "Mock"
    }

    fn features(&self) -> Vec<String> {
        vec!["trend".to_string()]
    }

    fn fit(&self, series: &[DailyPoint]) -> Result<Box<dyn FittedModel>> {
        if series.len() < self.min_points {
            return Err(Error::InsufficientTrainingData {
                required: self.min_points,
                actual: series.len(),
            });
        }

        Ok(Box::new(MockModel {
            daily_value: self.daily_value,
            relative_band: self.relative_band,
        }))
    }
}

struct MockModel {
    daily_value: f64,
    relative_band: f64,
}

impl FittedModel for MockModel {
    fn predict(&self, dates: &[NaiveDate]) -> Vec<DailyForecast> {
        let half_width = self.daily_value.abs() * self.relative_band;
        dates
            .iter()
            .map(|&date| DailyForecast {
                date,
                yhat: self.daily_value,
                yhat_lower: self.daily_value - half_width,
                yhat_upper: self.daily_value + half_width,
            })
            .collect()
    }
}
