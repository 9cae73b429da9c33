//! Optimal timing rule
//!
//! Fixed advice; not derived from completion data.

use super::{InsightContext, InsightRule};
use crate::types::{Insight, InsightKind, RenderHint};

/// Always emitted, always last among the standard rules
pub struct OptimalTimingRule;

impl InsightRule for OptimalTimingRule {
    fn name(&self) -> &'static str {
        "optimal_timing"
    }

    fn evaluate(&self, _ctx: &InsightContext<'_>) -> Option<Insight> {
        Some(Insight {
            kind: InsightKind::Timing,
            title: "Optimal Timing".to_string(),
            description: "Habits anchored to a fixed time of day are easier to keep. Try scheduling new habits before noon.".to_string(),
            hint: RenderHint::new("clock", "#14B8A6"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::day;
    use super::*;

    #[test]
    fn test_always_emitted() {
        let ctx = InsightContext {
            habits: &[],
            reference_date: day("2024-01-15"),
        };
        let insight = OptimalTimingRule.evaluate(&ctx).unwrap();
        assert_eq!(insight.kind, InsightKind::Timing);
        assert_eq!(insight.hint.icon, "clock");
    }
}
