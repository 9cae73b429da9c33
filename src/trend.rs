//! Trend series
//!
//! Builds the fixed-length daily series behind the consistency chart: one
//! point per calendar day for the week ending at the reference date.

use crate::metrics::friction_value;
use crate::types::{Habit, TrendPoint};
use chrono::{Duration, NaiveDate};

/// Number of days in the series
pub const TREND_DAYS: i64 = 7;

/// Build the series, oldest day first, ending at and including `reference_date`
pub fn trend_series(habits: &[Habit], reference_date: NaiveDate) -> Vec<TrendPoint> {
    (0..TREND_DAYS)
        .rev()
        .map(|offset| trend_point(habits, reference_date - Duration::days(offset)))
        .collect()
}

/// Unrated completions count as the neutral 3, not 0, so the chart agrees
/// with impact scoring
fn trend_point(habits: &[Habit], date: NaiveDate) -> TrendPoint {
    let mut completions = 0usize;
    let mut friction_sum = 0.0;

    for completion in habits.iter().filter_map(|h| h.completion_on(date)) {
        completions += 1;
        friction_sum += friction_value(completion);
    }

    // A zero denominator is replaced by 1 so empty days report 0
    let friction = friction_sum / completions.max(1) as f64;

    TrendPoint {
        date,
        label: date.format("%a").to_string(),
        completions,
        friction,
    }
}
