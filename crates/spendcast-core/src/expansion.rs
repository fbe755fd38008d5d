//! Daily expansion of monthly totals
//!
//! The forecasting engine works far better on a dense daily series than on a
//! handful of monthly points, so each month's total is spread evenly over the
//! days of that month.

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::{Error, Result};
use crate::models::{DailyPoint, HistoricalEntry};

/// Parse a `YYYY-MM` month into the first day of that month
pub fn parse_month(month: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", month.trim()), "%Y-%m-%d")
        .map_err(|_| Error::InvalidData(format!("Invalid month '{}', expected YYYY-MM", month)))
}

/// Number of days in the month containing `date`
pub fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };

    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

/// Spread each entry's `spent` across the days of its month
///
/// Returns `Ok(None)` for empty input. Points are emitted in entry order, one
/// run of days per entry, without re-sorting.
pub fn expand_daily(history: &[HistoricalEntry]) -> Result<Option<Vec<DailyPoint>>> {
    if history.is_empty() {
        return Ok(None);
    }

    let mut points = Vec::new();
    for entry in history {
        let first = parse_month(&entry.month)?;
        let days = days_in_month(first);
        let daily_amount = entry.spent / days as f64;

        for day in 0..days {
            points.push(DailyPoint {
                date: first + Duration::days(day as i64),
                value: daily_amount,
            });
        }
    }

    tracing::debug!(
        months = history.len(),
        points = points.len(),
        "Expanded monthly history to daily series"
    );

    Ok(Some(points))
}
