//! Forecast pipeline
//!
//! Turns a request into a [`ForecastResult`]:
//! 1. Validate the request
//! 2. Spread monthly history into a daily series
//! 3. Fit the engine and predict the future window
//! 4. Aggregate back into calendar months and score each
//! 5. Project the current month from the remaining-days window
//! 6. Derive trend, average spend and the explanation text
//!
//! The pipeline is a pure function of its inputs plus `today`; the caller
//! decides what "today" is.

use chrono::{Duration, NaiveDate};
use tracing::{debug, info};

use crate::aggregate::aggregate_monthly;
use crate::config::ForecastConfig;
use crate::engine::{date_range, ForecastEngine};
use crate::error::{Error, Result};
use crate::expansion::{expand_daily, parse_month};
use crate::models::{
    ForecastRequest, ForecastResult, HistoricalEntry, ModelInfo, MonthlyPrediction, Trend,
};
use crate::projection::{project_current_month, BudgetOutlook, MonthProgress};
use crate::round2;
use crate::scoring::{detect_trend, overall_confidence};

/// Longest calendar month, bounding the current-month day counts
const MAX_DAYS_IN_MONTH: i64 = 31;

/// Run the full forecast for one request
pub fn forecast(
    engine: &dyn ForecastEngine,
    request: &ForecastRequest,
    config: &ForecastConfig,
    today: NaiveDate,
) -> Result<ForecastResult> {
    let history = validate(request, config)?;
    let settings = &config.pipeline;

    let series = expand_daily(history)?.ok_or(Error::DataPreparation)?;
    let last_date = series
        .iter()
        .map(|p| p.date)
        .max()
        .ok_or(Error::DataPreparation)?;

    let model = engine.fit(&series)?;

    // Pad past forecast_months * 30 so the last requested month is complete
    let horizon = i64::from(request.forecast_months) * 30 + settings.forecast_pad_days;
    let future = model.predict(&date_range(last_date + Duration::days(1), horizon));

    let predictions: Vec<MonthlyPrediction> =
        aggregate_monthly(&future, last_date, request.forecast_months as usize)
            .into_iter()
            .map(|month| month.into_prediction())
            .collect();
    let next_month_prediction = predictions.first().cloned();

    let progress = MonthProgress {
        current_spent: request.current_month_spent,
        days_passed: request.days_passed_in_month,
        total_days: request.total_days_in_month,
        monthly_budget: request.monthly_budget,
    };
    let remaining = model.predict(&date_range(today, progress.days_remaining()));
    let outlook = project_current_month(&progress, &remaining, settings.model_weight);

    let trend = detect_trend(history);
    let average_spending = history.iter().map(|e| e.spent).sum::<f64>() / history.len() as f64;

    let explanation = Explanation {
        currency: &settings.currency_symbol,
        training_months: history.len(),
        average_spending,
        trend,
        next_month: next_month_prediction.as_ref(),
        outlook: &outlook,
        progress: &progress,
    }
    .render();

    info!(
        months = history.len(),
        predictions = predictions.len(),
        over_budget = outlook.is_likely_over_budget,
        "Forecast complete"
    );

    Ok(ForecastResult {
        success: true,
        predictions,
        next_month_prediction,
        current_month_projection: outlook.projection.clone(),
        is_likely_over_budget: outlook.is_likely_over_budget,
        budget_difference: round2(outlook.budget_difference),
        confidence: overall_confidence(history.len()),
        trend,
        average_spending: round2(average_spending),
        explanation,
        model_info: ModelInfo {
            algorithm: engine.name().to_string(),
            training_months: history.len(),
            features: engine.features(),
        },
    })
}

/// Reject requests the pipeline cannot work with, returning the history
fn validate<'a>(
    request: &'a ForecastRequest,
    config: &ForecastConfig,
) -> Result<&'a [HistoricalEntry]> {
    let history = request
        .historical_data
        .as_deref()
        .ok_or(Error::MissingHistory)?;

    let required = config.pipeline.min_history_months;
    if history.len() < required {
        return Err(Error::InsufficientHistory {
            required,
            actual: history.len(),
        });
    }

    for entry in history {
        parse_month(&entry.month)?;
        if !entry.spent.is_finite() || entry.spent < 0.0 {
            return Err(Error::InvalidData(format!(
                "spent for {} must be a non-negative number",
                entry.month
            )));
        }
    }

    if !request.current_month_spent.is_finite() || request.current_month_spent < 0.0 {
        return Err(Error::InvalidData(
            "currentMonthSpent must be a non-negative number".to_string(),
        ));
    }
    if !request.monthly_budget.is_finite() || request.monthly_budget < 0.0 {
        return Err(Error::InvalidData(
            "monthlyBudget must be a non-negative number".to_string(),
        ));
    }
    if !(0..=MAX_DAYS_IN_MONTH).contains(&request.days_passed_in_month) {
        return Err(Error::InvalidData(format!(
            "daysPassedInMonth must be between 0 and {}, got {}",
            MAX_DAYS_IN_MONTH, request.days_passed_in_month
        )));
    }
    if !(1..=MAX_DAYS_IN_MONTH).contains(&request.total_days_in_month) {
        return Err(Error::InvalidData(format!(
            "totalDaysInMonth must be between 1 and {}, got {}",
            MAX_DAYS_IN_MONTH, request.total_days_in_month
        )));
    }

    let max_months = config.pipeline.max_forecast_months;
    if request.forecast_months > max_months {
        return Err(Error::InvalidData(format!(
            "forecastMonths must be at most {}, got {}",
            max_months, request.forecast_months
        )));
    }

    debug!(months = history.len(), "Request validated");
    Ok(history)
}

/// Human-readable summary of a forecast
struct Explanation<'a> {
    currency: &'a str,
    training_months: usize,
    average_spending: f64,
    trend: Trend,
    next_month: Option<&'a MonthlyPrediction>,
    outlook: &'a BudgetOutlook,
    progress: &'a MonthProgress,
}

impl Explanation<'_> {
    fn render(&self) -> String {
        let cur = self.currency;
        let mut text = format!(
            "ML model trained on {} months of data. Average historical spending: {}{}. Trend detected: {}. ",
            self.training_months,
            cur,
            whole(self.average_spending),
            self.trend
        );

        if let Some(next) = self.next_month {
            text.push_str(&format!(
                "Next month prediction: {}{} (range: {}{} - {}{}). ",
                cur,
                whole(next.predicted_amount),
                cur,
                whole(next.lower_bound),
                cur,
                whole(next.upper_bound)
            ));
        }

        if self.outlook.is_likely_over_budget {
            text.push_str(&format!(
                "⚠️ Warning: Current spending pace suggests you'll exceed budget by {}{}.",
                cur,
                whole(self.outlook.budget_difference)
            ));
        } else {
            text.push_str(&format!(
                "✅ On track to stay within budget with {}{} to spare.",
                cur,
                whole(self.outlook.spare(self.progress))
            ));
        }

        text
    }
}

/// Round to whole currency units for display, halves to even
fn whole(amount: f64) -> i64 {
    amount.round_ties_even() as i64
}
