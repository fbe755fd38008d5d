//! Current-month projection
//!
//! Blends two estimates of where this month will end up:
//! - a naive linear extrapolation of the daily spending rate so far
//! - the amount spent so far plus the model's prediction for the days left
//!
//! The model leads the blend; the naive rate smooths out a misfiring model.

use crate::models::{CurrentMonthProjection, DailyForecast};
use crate::round2;

/// Progress through the month in flight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthProgress {
    pub current_spent: f64,
    pub days_passed: i64,
    pub total_days: i64,
    /// Zero means no budget is tracked
    pub monthly_budget: f64,
}

impl MonthProgress {
    /// Days left in the month, never negative
    pub fn days_remaining(&self) -> i64 {
        (self.total_days - self.days_passed).max(0)
    }

    pub fn has_budget(&self) -> bool {
        self.monthly_budget > 0.0
    }
}

/// Outcome of the current-month projection
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetOutlook {
    pub projection: CurrentMonthProjection,
    /// Unrounded blended total
    pub final_projection: f64,
    pub is_likely_over_budget: bool,
    /// `final_projection - budget` when a budget is set, otherwise zero
    pub budget_difference: f64,
}

impl BudgetOutlook {
    /// Budget left over at the projected total (zero without a budget)
    pub fn spare(&self, progress: &MonthProgress) -> f64 {
        if progress.has_budget() {
            progress.monthly_budget - self.final_projection
        } else {
            0.0
        }
    }
}

/// Linear extrapolation of the spending rate so far
pub fn simple_projection(progress: &MonthProgress) -> f64 {
    let daily_rate = progress.current_spent / progress.days_passed.max(1) as f64;
    daily_rate * progress.total_days as f64
}

/// Spent so far plus the model's (non-negative) total for the remaining days
pub fn model_projection(progress: &MonthProgress, remaining: &[DailyForecast]) -> f64 {
    let remaining_spend: f64 = remaining.iter().map(|f| f.yhat).sum();
    progress.current_spent + remaining_spend.max(0.0)
}

/// Blend both projections and derive the budget figures
pub fn project_current_month(
    progress: &MonthProgress,
    remaining: &[DailyForecast],
    model_weight: f64,
) -> BudgetOutlook {
    let simple = simple_projection(progress);
    let model = model_projection(progress, remaining);
    let final_projection = model_weight * model + (1.0 - model_weight) * simple;

    let (is_likely_over_budget, budget_difference) = if progress.has_budget() {
        (
            final_projection > progress.monthly_budget,
            final_projection - progress.monthly_budget,
        )
    } else {
        (false, 0.0)
    };

    let days_remaining = progress.days_remaining();
    let daily_budget_remaining = if progress.has_budget() {
        round2((progress.monthly_budget - progress.current_spent) / days_remaining.max(1) as f64)
    } else {
        0.0
    };

    tracing::debug!(
        simple,
        model,
        final_projection,
        days_remaining,
        "Projected current month"
    );

    BudgetOutlook {
        projection: CurrentMonthProjection {
            projected_total: round2(final_projection),
            current_spent: progress.current_spent,
            projected_remaining: round2(final_projection - progress.current_spent).max(0.0),
            days_remaining,
            daily_budget_remaining,
        },
        final_projection,
        is_likely_over_budget,
        budget_difference,
    }
}
