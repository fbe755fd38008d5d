//! Monthly aggregation of daily forecasts

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::models::{DailyForecast, MonthlyPrediction};
use crate::round2;
use crate::scoring::prediction_confidence;

/// Summed forecast for one calendar month
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyTotal {
    pub year: i32,
    pub month: u32,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

impl MonthlyTotal {
    /// `YYYY-MM` label
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// Convert to a reported prediction
    ///
    /// Confidence is scored on the raw sums. Spending cannot be negative, so
    /// the point estimate and lower bound are floored at zero; the upper bound
    /// is only raised if it would otherwise sit below the point estimate.
    pub fn into_prediction(self) -> MonthlyPrediction {
        let confidence = prediction_confidence(self.yhat, self.yhat_lower, self.yhat_upper);

        let predicted_amount = round2(self.yhat).max(0.0);
        let lower_bound = round2(self.yhat_lower).max(0.0).min(predicted_amount);
        let upper_bound = round2(self.yhat_upper).max(predicted_amount);

        MonthlyPrediction {
            month: self.label(),
            predicted_amount,
            lower_bound,
            upper_bound,
            confidence,
        }
    }
}

/// Sum daily forecasts strictly after `after` into calendar months
///
/// Months come back in chronological order, at most `limit` of them.
pub fn aggregate_monthly(
    forecasts: &[DailyForecast],
    after: NaiveDate,
    limit: usize,
) -> Vec<MonthlyTotal> {
    let mut months: BTreeMap<(i32, u32), MonthlyTotal> = BTreeMap::new();

    for forecast in forecasts.iter().filter(|f| f.date > after) {
        let key = (forecast.date.year(), forecast.date.month());
        let total = months.entry(key).or_insert(MonthlyTotal {
            year: key.0,
            month: key.1,
            yhat: 0.0,
            yhat_lower: 0.0,
            yhat_upper: 0.0,
        });
        total.yhat += forecast.yhat;
        total.yhat_lower += forecast.yhat_lower;
        total.yhat_upper += forecast.yhat_upper;
    }

    months.into_values().take(limit).collect()
}
