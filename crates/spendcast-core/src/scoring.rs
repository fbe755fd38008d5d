//! Confidence scoring and trend detection

use crate::models::{Confidence, HistoricalEntry, Trend};

/// Interval width ratio below which a prediction is high confidence
const HIGH_CONFIDENCE_WIDTH: f64 = 0.2;
/// Interval width ratio below which a prediction is medium confidence
const MEDIUM_CONFIDENCE_WIDTH: f64 = 0.4;

/// Percentage change beyond which spending counts as trending
const TREND_THRESHOLD_PERCENT: f64 = 15.0;

/// Confidence of one prediction from the relative width of its interval
///
/// A zero or negative point estimate makes the ratio meaningless, so it is
/// scored low.
pub fn prediction_confidence(predicted: f64, lower: f64, upper: f64) -> Confidence {
    if predicted <= 0.0 {
        return Confidence::Low;
    }

    let width = (upper - lower) / predicted;
    if !width.is_finite() {
        Confidence::Low
    } else if width < HIGH_CONFIDENCE_WIDTH {
        Confidence::High
    } else if width < MEDIUM_CONFIDENCE_WIDTH {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

/// Overall confidence from the number of months of history supplied
pub fn overall_confidence(history_months: usize) -> Confidence {
    match history_months {
        n if n >= 6 => Confidence::High,
        n if n >= 3 => Confidence::Medium,
        _ => Confidence::Low,
    }
}

/// Compare the most recent month (first entry) against the oldest (last entry)
pub fn detect_trend(history: &[HistoricalEntry]) -> Trend {
    let (Some(recent), Some(older)) = (history.first(), history.last()) else {
        return Trend::Stable;
    };
    if history.len() < 2 || older.spent == 0.0 {
        return Trend::Stable;
    }

    let change_percent = (recent.spent - older.spent) / older.spent * 100.0;
    if change_percent > TREND_THRESHOLD_PERCENT {
        Trend::Increasing
    } else if change_percent < -TREND_THRESHOLD_PERCENT {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}
