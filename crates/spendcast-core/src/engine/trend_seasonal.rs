//! Piecewise-linear trend with Fourier seasonality
//!
//! An additive model `y(t) = g(t) + s(t) + noise`:
//! - `g(t)` is a linear trend whose slope may change at evenly spaced
//!   changepoints over the early part of the history
//! - `s(t)` is a sum of Fourier terms for each enabled seasonality whose
//!   period fits inside the history
//!
//! Coefficients are the MAP estimate under zero-mean Gaussian priors, which is
//! ridge regression with a per-column penalty of `1 / prior_scale^2`. The
//! changepoint prior is kept tight so one unusual month does not bend the
//! trend. Prediction intervals combine the in-sample residual spread, the
//! coefficient uncertainty of the fit, and the uncertainty of future trend
//! changes, which grows with the horizon.
//!
//! Fitting is deterministic: the same series always yields the same model.

use std::f64::consts::PI;

use chrono::{Datelike, NaiveDate};
use nalgebra::{DMatrix, DVector};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::config::ModelSettings;
use crate::error::{Error, Result};
use crate::models::{DailyForecast, DailyPoint};

use super::{FittedModel, ForecastEngine};

const YEARLY_PERIOD_DAYS: f64 = 365.25;
const WEEKLY_PERIOD_DAYS: f64 = 7.0;

/// Prior scale for the base trend (intercept and initial slope)
const TREND_PRIOR_SCALE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Seasonality {
    period: f64,
    order: usize,
}

impl Seasonality {
    fn columns(&self) -> usize {
        self.order * 2
    }

    fn push_features(&self, day: f64, row: &mut Vec<f64>) {
        for k in 1..=self.order {
            let angle = 2.0 * PI * k as f64 * day / self.period;
            row.push(angle.sin());
            row.push(angle.cos());
        }
    }
}

/// Default engine: trend + seasonality regression
#[derive(Debug, Clone, Default)]
pub struct TrendSeasonalEngine {
    settings: ModelSettings,
}

impl TrendSeasonalEngine {
    pub fn new(settings: ModelSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// Seasonalities enabled in the settings, before any span check
    fn seasonalities(&self) -> Vec<Seasonality> {
        let mut seasonalities = Vec::new();
        if self.settings.yearly_seasonality && self.settings.yearly_fourier_order > 0 {
            seasonalities.push(Seasonality {
                period: YEARLY_PERIOD_DAYS,
                order: self.settings.yearly_fourier_order,
            });
        }
        if self.settings.weekly_seasonality && self.settings.weekly_fourier_order > 0 {
            seasonalities.push(Seasonality {
                period: WEEKLY_PERIOD_DAYS,
                order: self.settings.weekly_fourier_order,
            });
        }
        seasonalities
    }

    /// Fit and return the concrete model type
    pub fn fit_model(&self, series: &[DailyPoint]) -> Result<TrendSeasonalModel> {
        let n = series.len();
        let required = self.settings.min_training_points.max(2);
        if n < required {
            return Err(Error::InsufficientTrainingData {
                required,
                actual: n,
            });
        }

        if let Some(bad) = series.iter().find(|p| !p.value.is_finite()) {
            return Err(Error::InvalidData(format!(
                "non-finite value on {}",
                bad.date
            )));
        }

        let mut sorted = series.to_vec();
        sorted.sort_by_key(|p| p.date);

        let start = sorted[0].date;
        let end = sorted[n - 1].date;
        let span_days = ((end - start).num_days() as f64).max(1.0);

        let y_max = sorted.iter().fold(0.0_f64, |m, p| m.max(p.value.abs()));
        let y_scale = if y_max > 0.0 { y_max } else { 1.0 };

        let times: Vec<f64> = sorted
            .iter()
            .map(|p| (p.date - start).num_days() as f64 / span_days)
            .collect();

        let changepoints = place_changepoints(
            &times,
            self.settings.n_changepoints,
            self.settings.changepoint_range,
        );

        // A seasonal cycle longer than the history cannot be told apart from
        // the trend, and its Fourier terms swing wildly out of sample.
        let (seasonalities, skipped): (Vec<_>, Vec<_>) = self
            .seasonalities()
            .into_iter()
            .partition(|s| span_days >= s.period);
        for seasonality in &skipped {
            tracing::debug!(
                period = seasonality.period,
                span_days,
                "History shorter than seasonal period, skipping"
            );
        }

        let n_changepoints = changepoints.len();
        let width = 2
            + n_changepoints
            + seasonalities.iter().map(Seasonality::columns).sum::<usize>();

        let design: Vec<f64> = sorted
            .iter()
            .zip(&times)
            .flat_map(|(p, &t)| {
                design_row(t, absolute_day(p.date), &changepoints, &seasonalities)
            })
            .collect();
        let x = DMatrix::from_row_slice(n, width, &design);
        let y = DVector::from_iterator(n, sorted.iter().map(|p| p.value / y_scale));

        let trend_penalty = 1.0 / TREND_PRIOR_SCALE.powi(2);
        let changepoint_penalty = 1.0 / self.settings.changepoint_prior_scale.powi(2);
        let seasonal_penalty = 1.0 / self.settings.seasonality_prior_scale.powi(2);
        let penalties = DVector::from_fn(width, |i, _| {
            if i < 2 {
                trend_penalty
            } else if i < 2 + n_changepoints {
                changepoint_penalty
            } else {
                seasonal_penalty
            }
        });

        let normal = x.transpose() * &x + DMatrix::from_diagonal(&penalties);
        let cholesky = normal.cholesky().ok_or_else(|| {
            Error::Model("normal equations are not positive definite".to_string())
        })?;
        let coefficients = cholesky.solve(&(x.transpose() * &y));

        let residuals = &y - &x * &coefficients;
        let sigma_obs = (residuals.norm_squared() / n as f64).sqrt();

        // Approximate posterior covariance of the coefficients
        let covariance = cholesky.inverse() * sigma_obs.powi(2);

        let delta_scale = if n_changepoints > 0 {
            coefficients
                .rows(2, n_changepoints)
                .iter()
                .map(|d| d.abs())
                .sum::<f64>()
                / n_changepoints as f64
        } else {
            0.0
        };
        let changepoint_rate = if n_changepoints > 0 {
            n_changepoints as f64 / self.settings.changepoint_range
        } else {
            0.0
        };

        let z = Normal::new(0.0, 1.0)
            .map_err(|e| Error::Model(e.to_string()))?
            .inverse_cdf(0.5 + self.settings.interval_width / 2.0);

        tracing::debug!(
            points = n,
            changepoints = n_changepoints,
            columns = width,
            seasonalities = seasonalities.len(),
            sigma = sigma_obs * y_scale,
            "Fitted trend/seasonality model"
        );

        Ok(TrendSeasonalModel {
            start,
            end,
            span_days,
            y_scale,
            changepoints,
            seasonalities,
            coefficients,
            covariance,
            sigma_obs,
            delta_scale,
            changepoint_rate,
            z,
        })
    }
}

impl ForecastEngine for TrendSeasonalEngine {
    fn name(&self) -> &str {
        "Piecewise Linear Trend + Fourier Seasonality"
    }

    fn features(&self) -> Vec<String> {
        let mut features = vec!["trend".to_string()];
        if self.settings.yearly_seasonality {
            features.push("yearly_seasonality".to_string());
        }
        if self.settings.weekly_seasonality {
            features.push("weekly_seasonality".to_string());
        }
        features
    }

    fn fit(&self, series: &[DailyPoint]) -> Result<Box<dyn FittedModel>> {
        Ok(Box::new(self.fit_model(series)?))
    }
}

/// A fitted trend/seasonality model
#[derive(Debug, Clone)]
pub struct TrendSeasonalModel {
    start: NaiveDate,
    end: NaiveDate,
    span_days: f64,
    y_scale: f64,
    changepoints: Vec<f64>,
    seasonalities: Vec<Seasonality>,
    coefficients: DVector<f64>,
    /// Coefficient covariance, in scaled units
    covariance: DMatrix<f64>,
    /// Residual standard deviation, in scaled units
    sigma_obs: f64,
    /// Mean absolute changepoint delta, in scaled units
    delta_scale: f64,
    /// Changepoints per unit of scaled time
    changepoint_rate: f64,
    z: f64,
}

impl TrendSeasonalModel {
    /// Last date in the training series
    pub fn last_date(&self) -> NaiveDate {
        self.end
    }

    /// Residual standard deviation in the series' own units
    pub fn residual_sd(&self) -> f64 {
        self.sigma_obs * self.y_scale
    }

    pub fn changepoint_count(&self) -> usize {
        self.changepoints.len()
    }

    /// Number of seasonal components that made it into the fit
    pub fn seasonality_count(&self) -> usize {
        self.seasonalities.len()
    }

    fn scaled_time(&self, date: NaiveDate) -> f64 {
        (date - self.start).num_days() as f64 / self.span_days
    }

    /// Spread of the trend at `t` from changepoints that may occur after the
    /// end of history. Each future changepoint shifts the trend by
    /// `delta * (t - s)`; integrating the variance over `s` in `(1, t)` gives
    /// `2 b^2 r h^3 / 3` for Laplace deltas with scale `b`.
    fn trend_sd(&self, t: f64) -> f64 {
        let horizon = t - 1.0;
        if horizon <= 0.0 {
            return 0.0;
        }
        self.delta_scale * (2.0 * self.changepoint_rate * horizon.powi(3) / 3.0).sqrt()
    }
}

impl FittedModel for TrendSeasonalModel {
    fn predict(&self, dates: &[NaiveDate]) -> Vec<DailyForecast> {
        dates
            .iter()
            .map(|&date| {
                let t = self.scaled_time(date);
                let row = DVector::from_vec(design_row(
                    t,
                    absolute_day(date),
                    &self.changepoints,
                    &self.seasonalities,
                ));
                let yhat = row.dot(&self.coefficients);
                let fit_variance = row.dot(&(&self.covariance * &row)).max(0.0);
                let sd =
                    (self.sigma_obs.powi(2) + fit_variance + self.trend_sd(t).powi(2)).sqrt();
                let half_width = self.z * sd;

                DailyForecast {
                    date,
                    yhat: yhat * self.y_scale,
                    yhat_lower: (yhat - half_width) * self.y_scale,
                    yhat_upper: (yhat + half_width) * self.y_scale,
                }
            })
            .collect()
    }
}

/// Evenly spaced changepoints over the first `range` of the (sorted) history
fn place_changepoints(times: &[f64], requested: usize, range: f64) -> Vec<f64> {
    let history = (times.len() as f64 * range).floor() as usize;
    let count = requested.min(history.saturating_sub(1));
    if count == 0 {
        return Vec::new();
    }

    let mut changepoints: Vec<f64> = (1..=count)
        .map(|i| {
            let index = (i as f64 * (history - 1) as f64 / count as f64).round() as usize;
            times[index.min(times.len() - 1)]
        })
        .collect();
    changepoints.dedup_by(|a, b| (*a - *b).abs() < f64::EPSILON);
    changepoints
}

fn design_row(
    t: f64,
    day: f64,
    changepoints: &[f64],
    seasonalities: &[Seasonality],
) -> Vec<f64> {
    let mut row = Vec::with_capacity(
        2 + changepoints.len() + seasonalities.iter().map(Seasonality::columns).sum::<usize>(),
    );
    row.push(1.0);
    row.push(t);
    for &cp in changepoints {
        row.push((t - cp).max(0.0));
    }
    for seasonality in seasonalities {
        seasonality.push_features(day, &mut row);
    }
    row
}

/// Day number used as the seasonal phase
fn absolute_day(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::date_range;
    use chrono::Duration;

    fn series(start: NaiveDate, values: impl IntoIterator<Item = f64>) -> Vec<DailyPoint> {
        values
            .into_iter()
            .enumerate()
            .map(|(i, value)| DailyPoint {
                date: start + Duration::days(i as i64),
                value,
            })
            .collect()
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    fn no_seasonality() -> ModelSettings {
        ModelSettings {
            yearly_seasonality: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_insufficient_points() {
        let engine = TrendSeasonalEngine::default();
        let err = engine
            .fit_model(&series(start(), vec![1.0; 9]))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientTrainingData {
                required: 10,
                actual: 9
            }
        ));
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let engine = TrendSeasonalEngine::default();
        let mut points = series(start(), vec![1.0; 20]);
        points[5].value = f64::NAN;
        assert!(matches!(
            engine.fit_model(&points).unwrap_err(),
            Error::InvalidData(_)
        ));
    }

    #[test]
    fn test_constant_series() {
        let engine = TrendSeasonalEngine::default();
        let model = engine.fit_model(&series(start(), vec![5.0; 90])).unwrap();

        let future = date_range(model.last_date() + Duration::days(1), 30);
        for forecast in model.predict(&future) {
            assert!((forecast.yhat - 5.0).abs() < 0.1, "yhat = {}", forecast.yhat);
            assert!(forecast.yhat_lower <= forecast.yhat);
            assert!(forecast.yhat_upper >= forecast.yhat);
        }
    }

    #[test]
    fn test_all_zero_series() {
        let engine = TrendSeasonalEngine::default();
        let model = engine.fit_model(&series(start(), vec![0.0; 40])).unwrap();
        let forecast = model.predict(&[model.last_date() + Duration::days(1)]);
        assert!(forecast[0].yhat.abs() < 1e-9);
    }

    #[test]
    fn test_linear_trend_extrapolates() {
        let engine = TrendSeasonalEngine::new(no_seasonality());
        let model = engine
            .fit_model(&series(start(), (0..120).map(|i| 100.0 + i as f64)))
            .unwrap();

        let last = model.last_date();
        let forecasts = model.predict(&[last + Duration::days(1), last + Duration::days(30)]);

        assert!(forecasts[1].yhat > forecasts[0].yhat);
        assert!((forecasts[0].yhat - 220.0).abs() < 5.0, "yhat = {}", forecasts[0].yhat);
    }

    #[test]
    fn test_interval_widens_with_horizon() {
        let engine = TrendSeasonalEngine::new(no_seasonality());
        let values = (0..180).map(|i| {
            let noise = if i % 2 == 0 { 1.0 } else { -1.0 };
            50.0 + (i / 30) as f64 * 4.0 + noise
        });
        let model = engine.fit_model(&series(start(), values)).unwrap();

        let last = model.last_date();
        let forecasts = model.predict(&[last + Duration::days(1), last + Duration::days(150)]);
        let near = forecasts[0].yhat_upper - forecasts[0].yhat_lower;
        let far = forecasts[1].yhat_upper - forecasts[1].yhat_lower;

        assert!(near > 0.0);
        assert!(far >= near);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let engine = TrendSeasonalEngine::default();
        let values: Vec<f64> = (0..200).map(|i| 400.0 + ((i * 37) % 11) as f64).collect();
        let points = series(start(), values);

        let dates = date_range(start() + Duration::days(200), 60);
        let first = engine.fit_model(&points).unwrap().predict(&dates);
        let second = engine.fit_model(&points).unwrap().predict(&dates);

        assert_eq!(first, second);
    }

    #[test]
    fn test_unsorted_input() {
        let engine = TrendSeasonalEngine::new(no_seasonality());
        let mut points = series(start(), (0..60).map(|i| i as f64));
        points.reverse();

        let model = engine.fit_model(&points).unwrap();
        assert_eq!(model.last_date(), start() + Duration::days(59));
    }

    #[test]
    fn test_changepoint_placement() {
        let times: Vec<f64> = (0..100).map(|i| i as f64 / 99.0).collect();
        let changepoints = place_changepoints(&times, 25, 0.8);

        assert_eq!(changepoints.len(), 25);
        assert!(changepoints[0] > 0.0);
        assert!(*changepoints.last().unwrap() <= 0.8);
        assert!(changepoints.windows(2).all(|w| w[0] < w[1]));

        assert_eq!(place_changepoints(&times[..1], 25, 0.8).len(), 0);
        assert_eq!(place_changepoints(&times[..10], 25, 0.8).len(), 7);
    }

    #[test]
    fn test_short_history_skips_yearly_terms() {
        // Six months of month-level spending spread evenly over each month
        let months = [
            (6, 30, 17000.0),
            (7, 31, 15500.0),
            (8, 31, 16000.0),
            (9, 30, 14500.0),
            (10, 31, 18000.0),
            (11, 30, 15000.0),
        ];
        let points: Vec<DailyPoint> = months
            .iter()
            .flat_map(|&(month, days, total)| {
                let first = NaiveDate::from_ymd_opt(2025, month, 1).unwrap();
                date_range(first, days).into_iter().map(move |date| DailyPoint {
                    date,
                    value: total / days as f64,
                })
            })
            .collect();

        let model = TrendSeasonalEngine::default().fit_model(&points).unwrap();
        assert_eq!(model.seasonality_count(), 0);

        let future = date_range(model.last_date() + Duration::days(1), 90);
        for forecast in model.predict(&future) {
            assert!(
                (300.0..800.0).contains(&forecast.yhat),
                "{}: yhat = {}",
                forecast.date,
                forecast.yhat
            );
            assert!(forecast.yhat_lower > 0.0, "{}: {:?}", forecast.date, forecast);
        }
    }

    #[test]
    fn test_long_history_keeps_yearly_terms() {
        let phase = |date: NaiveDate| 2.0 * PI * absolute_day(date) / YEARLY_PERIOD_DAYS;
        let first = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let points: Vec<DailyPoint> = date_range(first, 730)
            .into_iter()
            .map(|date| DailyPoint {
                date,
                value: 100.0 + 20.0 * phase(date).sin(),
            })
            .collect();

        let model = TrendSeasonalEngine::default().fit_model(&points).unwrap();
        assert_eq!(model.seasonality_count(), 1);

        let future = date_range(model.last_date() + Duration::days(1), 365);
        let peak = future
            .iter()
            .copied()
            .max_by(|a, b| phase(*a).sin().total_cmp(&phase(*b).sin()))
            .unwrap();
        let trough = future
            .iter()
            .copied()
            .min_by(|a, b| phase(*a).sin().total_cmp(&phase(*b).sin()))
            .unwrap();

        let forecasts = model.predict(&[peak, trough]);
        assert!(
            forecasts[0].yhat > forecasts[1].yhat + 20.0,
            "peak {} vs trough {}",
            forecasts[0].yhat,
            forecasts[1].yhat
        );
    }

    #[test]
    fn test_interval_covers_fit_uncertainty() {
        // A noisy flat series: the interval must be at least as wide as the
        // residual spread alone, even one day past the history
        let values = (0..60).map(|i| if i % 2 == 0 { 110.0 } else { 90.0 });
        let model = TrendSeasonalEngine::new(no_seasonality())
            .fit_model(&series(start(), values))
            .unwrap();

        let forecast = &model.predict(&[model.last_date() + Duration::days(1)])[0];
        let residual_only = 2.0 * model.z * model.residual_sd();
        assert!(forecast.yhat_upper - forecast.yhat_lower > residual_only);
    }

    #[test]
    fn test_features_follow_settings() {
        let engine = TrendSeasonalEngine::default();
        assert_eq!(engine.features(), vec!["trend", "yearly_seasonality"]);

        let engine = TrendSeasonalEngine::new(ModelSettings {
            yearly_seasonality: false,
            weekly_seasonality: true,
            ..Default::default()
        });
        assert_eq!(engine.features(), vec!["trend", "weekly_seasonality"]);
    }
}
