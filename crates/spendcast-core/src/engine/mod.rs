//! Forecast engine abstraction
//!
//! The pipeline only needs two things from a time-series model: fit it on a
//! daily series, then ask it for point and interval predictions on arbitrary
//! dates. Any engine that can do both plugs in here.
//!
//! # Architecture
//!
//! - `ForecastEngine` trait: configured, stateless factory that fits a model
//! - `FittedModel` trait: the result of one fit, used for predictions
//! - Implementations: `TrendSeasonalEngine` (default), `MockEngine` (tests)
//!
//! A new `FittedModel` is produced for every request; nothing is shared
//! between fits.

mod mock;
mod trend_seasonal;

pub use mock::MockEngine;
pub use trend_seasonal::{TrendSeasonalEngine, TrendSeasonalModel};

use chrono::{Duration, NaiveDate};

use crate::error::Result;
use crate::models::{DailyForecast, DailyPoint};

/// A configured forecasting engine
///
/// Engines must be Send + Sync so one instance can serve concurrent requests.
pub trait ForecastEngine: Send + Sync {
    /// Human-readable algorithm name (reported in results)
    fn name(&self) -> &str;

    /// Model components, e.g. `trend`, `yearly_seasonality`
    fn features(&self) -> Vec<String>;

    /// Fit a fresh model on a daily series
    fn fit(&self, series: &[DailyPoint]) -> Result<Box<dyn FittedModel>>;
}

/// A model fitted on one series
pub trait FittedModel: Send {
    /// Predict each date, returning forecasts in the same order
    fn predict(&self, dates: &[NaiveDate]) -> Vec<DailyForecast>;
}

/// `days` consecutive dates starting at `start`
///
/// Stops early at the end of the representable calendar.
pub fn date_range(start: NaiveDate, days: i64) -> Vec<NaiveDate> {
    (0..days.max(0))
        .map_while(|i| start.checked_add_signed(Duration::days(i)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_range() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();
        let dates = date_range(start, 4);
        assert_eq!(dates.len(), 4);
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(dates[3], NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn test_date_range_non_positive() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();
        assert!(date_range(start, 0).is_empty());
        assert!(date_range(start, -5).is_empty());
    }

    #[test]
    fn test_date_range_stops_at_calendar_end() {
        let start = NaiveDate::MAX - Duration::days(2);
        let dates = date_range(start, 200_000_000);
        assert_eq!(dates.len(), 3);
        assert_eq!(dates[2], NaiveDate::MAX);
    }
}
