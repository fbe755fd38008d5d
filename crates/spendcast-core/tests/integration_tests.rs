//! Integration tests for spendcast-core
//!
//! These tests exercise the full request → expand → fit → aggregate → project
//! workflow with the shipped engine.

use chrono::NaiveDate;
use spendcast_core::{
    expansion::expand_daily, forecast, Confidence, Error, ForecastConfig, ForecastEngine,
    ForecastRequest, HistoricalEntry, MockEngine, Trend, TrendSeasonalEngine,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 16).unwrap()
}

fn default_engine(config: &ForecastConfig) -> TrendSeasonalEngine {
    TrendSeasonalEngine::new(config.model.clone())
}

/// Twelve months of history with a mild upward drift, most recent first
fn year_of_history() -> Vec<HistoricalEntry> {
    (0..12)
        .map(|i| {
            let month = if i < 11 {
                format!("2025-{:02}", 11 - i)
            } else {
                "2024-12".to_string()
            };
            HistoricalEntry::new(&month, 20000.0 - 250.0 * i as f64)
        })
        .collect()
}

// =============================================================================
// Full pipeline with the shipped engine
// =============================================================================

#[test]
fn test_sample_payload() {
    let config = ForecastConfig::default();
    let engine = default_engine(&config);

    let result = forecast(&engine, &ForecastRequest::sample(), &config, today())
        .expect("sample forecast should succeed");

    assert!(result.success);
    assert_eq!(result.predictions.len(), 3);
    let labels: Vec<&str> = result.predictions.iter().map(|p| p.month.as_str()).collect();
    assert_eq!(labels, vec!["2025-12", "2026-01", "2026-02"]);
    assert_eq!(result.confidence, Confidence::High);
    assert_eq!(result.trend, Trend::Stable);
    assert_eq!(result.average_spending, 16000.0);
    for p in &result.predictions {
        let ratio = p.predicted_amount / result.average_spending;
        assert!((0.5..1.5).contains(&ratio), "{}: {:?}", p.month, p);
        assert!(p.lower_bound > 0.0, "{}: {:?}", p.month, p);
    }
    assert_eq!(result.model_info.training_months, 6);
    assert_eq!(
        result.model_info.features,
        vec!["trend".to_string(), "yearly_seasonality".to_string()]
    );
    assert_eq!(result.current_month_projection.days_remaining, 15);
    assert_eq!(result.current_month_projection.current_spent, 12000.0);
    assert!(result.explanation.starts_with("ML model trained on 6 months of data."));
}

#[test]
fn test_prediction_bounds_are_ordered() {
    let config = ForecastConfig::default();
    let engine = default_engine(&config);

    let requests = [
        ForecastRequest::sample(),
        ForecastRequest {
            forecast_months: 12,
            ..ForecastRequest::with_history(year_of_history())
        },
        ForecastRequest::with_history(vec![
            HistoricalEntry::new("2025-11", 0.0),
            HistoricalEntry::new("2025-10", 9000.0),
            HistoricalEntry::new("2025-09", 20000.0),
        ]),
    ];

    for request in &requests {
        let result = forecast(&engine, request, &config, today()).unwrap();
        for p in &result.predictions {
            assert!(p.lower_bound >= 0.0, "{}: {:?}", p.month, p);
            assert!(p.lower_bound <= p.predicted_amount, "{}: {:?}", p.month, p);
            assert!(p.predicted_amount <= p.upper_bound, "{}: {:?}", p.month, p);
        }
    }
}

#[test]
fn test_twelve_month_horizon() {
    let config = ForecastConfig::default();
    let engine = default_engine(&config);
    let request = ForecastRequest {
        forecast_months: 12,
        ..ForecastRequest::with_history(year_of_history())
    };

    let result = forecast(&engine, &request, &config, today()).unwrap();

    assert_eq!(result.predictions.len(), 12);
    assert_eq!(result.predictions[0].month, "2025-12");
    assert_eq!(result.predictions[11].month, "2026-11");
    assert_eq!(result.confidence, Confidence::High);
}

#[test]
fn test_no_budget_never_over() {
    let config = ForecastConfig::default();
    let engine = default_engine(&config);
    let request = ForecastRequest {
        monthly_budget: 0.0,
        current_month_spent: 1_000_000.0,
        ..ForecastRequest::sample()
    };

    let result = forecast(&engine, &request, &config, today()).unwrap();

    assert!(!result.is_likely_over_budget);
    assert_eq!(result.budget_difference, 0.0);
    assert_eq!(result.current_month_projection.daily_budget_remaining, 0.0);
}

#[test]
fn test_identical_inputs_identical_outputs() {
    let config = ForecastConfig::default();
    let engine = default_engine(&config);
    let request = ForecastRequest::sample();

    let first = forecast(&engine, &request, &config, today()).unwrap();
    let second = forecast(&engine, &request, &config, today()).unwrap();

    assert_eq!(first, second);
}

// =============================================================================
// Validation and failure paths
// =============================================================================

#[test]
fn test_single_month_rejected() {
    let config = ForecastConfig::default();
    let engine = default_engine(&config);
    let request = ForecastRequest::with_history(vec![HistoricalEntry::new("2025-11", 15000.0)]);

    let err = forecast(&engine, &request, &config, today()).unwrap_err();

    assert!(matches!(err, Error::InsufficientHistory { actual: 1, .. }));
    assert!(err.is_validation());
}

#[test]
fn test_training_gate_is_separate_from_history_gate() {
    // Two months pass the history gate but not a stricter training gate
    let config = ForecastConfig::from_toml("[model]\nmin_training_points = 90").unwrap();
    let engine = default_engine(&config);
    let request = ForecastRequest::with_history(vec![
        HistoricalEntry::new("2025-02", 100.0),
        HistoricalEntry::new("2025-01", 100.0),
    ]);

    let err = forecast(&engine, &request, &config, today()).unwrap_err();

    assert!(matches!(
        err,
        Error::InsufficientTrainingData {
            required: 90,
            actual: 59
        }
    ));
    assert!(!err.is_validation());
}

// =============================================================================
// Configuration flowing through the engine
// =============================================================================

#[test]
fn test_config_controls_engine_features() {
    let config =
        ForecastConfig::from_toml("[model]\nyearly_seasonality = false\nweekly_seasonality = true")
            .unwrap();
    let engine = default_engine(&config);

    assert_eq!(
        engine.features(),
        vec!["trend".to_string(), "weekly_seasonality".to_string()]
    );

    let result = forecast(&engine, &ForecastRequest::sample(), &config, today()).unwrap();
    assert_eq!(result.model_info.features, engine.features());
}

#[test]
fn test_daily_expansion_preserves_totals() {
    let history = year_of_history();
    let series = expand_daily(&history).unwrap().unwrap();

    let total: f64 = series.iter().map(|p| p.value).sum();
    let expected: f64 = history.iter().map(|e| e.spent).sum();
    assert!((total - expected).abs() < 1e-6);
    assert_eq!(series.len(), 365);
}

#[test]
fn test_mock_engine_through_pipeline() {
    let config = ForecastConfig::default();
    let engine = MockEngine::new(500.0).with_band(0.05);

    let result = forecast(&engine, &ForecastRequest::sample(), &config, today()).unwrap();

    // December: 31 days at 500 with a 5% band
    let december = &result.predictions[0];
    assert_eq!(december.predicted_amount, 15500.0);
    assert_eq!(december.lower_bound, 14725.0);
    assert_eq!(december.upper_bound, 16275.0);
    assert_eq!(december.confidence, Confidence::High);
    assert_eq!(result.model_info.algorithm, "Mock");
}
