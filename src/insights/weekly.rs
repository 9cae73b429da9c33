//! Weekly pattern rule
//!
//! Buckets every completion by weekday and reports the strongest and weakest
//! days.

use super::{InsightContext, InsightRule};
use crate::types::{Insight, InsightKind, RenderHint};
use chrono::{Datelike, NaiveDate};

/// Weekday names, Sunday first
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Full weekday name of a calendar day
pub fn weekday_name(date: NaiveDate) -> &'static str {
    WEEKDAY_NAMES[date.weekday().num_days_from_sunday() as usize]
}

/// Emitted whenever at least one habit exists, even with no completions
pub struct WeeklyPatternRule;

impl InsightRule for WeeklyPatternRule {
    fn name(&self) -> &'static str {
        "weekly_pattern"
    }

    fn evaluate(&self, ctx: &InsightContext<'_>) -> Option<Insight> {
        if ctx.habits.is_empty() {
            return None;
        }

        let buckets = weekday_buckets(ctx);
        let (strongest, weakest) = strongest_and_weakest(&buckets);

        Some(Insight {
            kind: InsightKind::Pattern,
            title: "Weekly Pattern Detected".to_string(),
            description: format!(
                "You're most consistent on {}s and struggle on {}s. Consider scheduling important habits on your strongest days.",
                WEEKDAY_NAMES[strongest], WEEKDAY_NAMES[weakest]
            ),
            hint: RenderHint::new("calendar", "#F97316"),
        })
    }
}

fn weekday_buckets(ctx: &InsightContext<'_>) -> [usize; 7] {
    let mut buckets = [0usize; 7];
    for completion in ctx.habits.iter().flat_map(|h| h.completions.iter()) {
        buckets[completion.date.weekday().num_days_from_sunday() as usize] += 1;
    }
    buckets
}

/// Indices of the strongest and weakest weekdays
///
/// Both scans start from Sunday and only move on a strict improvement, so ties
/// resolve to the earliest day in the week. With all buckets at zero both
/// resolve to Sunday.
fn strongest_and_weakest(buckets: &[usize; 7]) -> (usize, usize) {
    let mut strongest = (0usize, 0usize);
    let mut weakest = (0usize, usize::MAX);

    for (idx, &count) in buckets.iter().enumerate() {
        if count > strongest.1 {
            strongest = (idx, count);
        }
        if count < weakest.1 {
            weakest = (idx, count);
        }
    }

    (strongest.0, weakest.0)
}
