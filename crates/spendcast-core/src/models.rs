//! Domain models for Spendcast
//!
//! Everything here is constructed per request and serialized with camelCase
//! field names to match the JSON API.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One month of historical spending, as supplied by the caller
///
/// Order matters: index 0 is the most recent month, the last index the oldest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalEntry {
    /// Month in `YYYY-MM` form
    pub month: String,
    /// Total spent in that month
    pub spent: f64,
}

impl HistoricalEntry {
    pub fn new(month: &str, spent: f64) -> Self {
        Self {
            month: month.to_string(),
            spent,
        }
    }
}

/// A synthetic daily observation produced by spreading a monthly total
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Model output for a single day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

/// Reliability label for a prediction or for a whole result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Confidence::High),
            "medium" => Ok(Confidence::Medium),
            "low" => Ok(Confidence::Low),
            _ => Err(format!("Unknown confidence: {}", s)),
        }
    }
}

/// Direction of spending between the oldest and most recent month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Trend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "increasing" => Ok(Trend::Increasing),
            "decreasing" => Ok(Trend::Decreasing),
            "stable" => Ok(Trend::Stable),
            _ => Err(format!("Unknown trend: {}", s)),
        }
    }
}

/// Forecast for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPrediction {
    /// Month in `YYYY-MM` form
    pub month: String,
    pub predicted_amount: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub confidence: Confidence,
}

/// End-of-month estimate for the month in progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentMonthProjection {
    pub projected_total: f64,
    pub current_spent: f64,
    pub projected_remaining: f64,
    pub days_remaining: i64,
    pub daily_budget_remaining: f64,
}

/// Description of the model that produced a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub algorithm: String,
    pub training_months: usize,
    pub features: Vec<String>,
}

/// Full response for a forecast request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    pub success: bool,
    pub predictions: Vec<MonthlyPrediction>,
    pub next_month_prediction: Option<MonthlyPrediction>,
    pub current_month_projection: CurrentMonthProjection,
    pub is_likely_over_budget: bool,
    pub budget_difference: f64,
    pub confidence: Confidence,
    pub trend: Trend,
    pub average_spending: f64,
    pub explanation: String,
    pub model_info: ModelInfo,
}

/// Input to the forecasting pipeline
///
/// Every field except `historicalData` is optional on the wire and falls back
/// to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRequest {
    #[serde(default)]
    pub historical_data: Option<Vec<HistoricalEntry>>,
    #[serde(default)]
    pub current_month_spent: f64,
    #[serde(default = "default_days_passed")]
    pub days_passed_in_month: i64,
    #[serde(default = "default_total_days")]
    pub total_days_in_month: i64,
    #[serde(default)]
    pub monthly_budget: f64,
    #[serde(default = "default_forecast_months")]
    pub forecast_months: u32,
}

fn default_days_passed() -> i64 {
    1
}

fn default_total_days() -> i64 {
    30
}

fn default_forecast_months() -> u32 {
    3
}

impl Default for ForecastRequest {
    fn default() -> Self {
        Self {
            historical_data: None,
            current_month_spent: 0.0,
            days_passed_in_month: default_days_passed(),
            total_days_in_month: default_total_days(),
            monthly_budget: 0.0,
            forecast_months: default_forecast_months(),
        }
    }
}

impl ForecastRequest {
    /// Build a request from history with every other field defaulted
    pub fn with_history(history: Vec<HistoricalEntry>) -> Self {
        Self {
            historical_data: Some(history),
            ..Default::default()
        }
    }

    /// Fixed six-month payload used by the smoke-test endpoint
    pub fn sample() -> Self {
        Self {
            historical_data: Some(vec![
                HistoricalEntry::new("2025-11", 15000.0),
                HistoricalEntry::new("2025-10", 18000.0),
                HistoricalEntry::new("2025-09", 14500.0),
                HistoricalEntry::new("2025-08", 16000.0),
                HistoricalEntry::new("2025-07", 15500.0),
                HistoricalEntry::new("2025-06", 17000.0),
            ]),
            current_month_spent: 12000.0,
            days_passed_in_month: 15,
            total_days_in_month: 30,
            monthly_budget: 20000.0,
            forecast_months: 3,
        }
    }
}
