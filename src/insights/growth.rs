//! Growth momentum rule

use super::{InsightContext, InsightRule};
use crate::metrics::streak_count;
use crate::types::{HabitType, Insight, InsightKind, RenderHint};

/// Total completions across growth habits; silent when there are none
pub struct GrowthMomentumRule;

impl InsightRule for GrowthMomentumRule {
    fn name(&self) -> &'static str {
        "growth_momentum"
    }

    fn evaluate(&self, ctx: &InsightContext<'_>) -> Option<Insight> {
        let mut growth = ctx
            .habits
            .iter()
            .filter(|h| h.habit_type == HabitType::Growth)
            .peekable();
        growth.peek()?;

        let total: usize = growth.map(streak_count).sum();

        Some(Insight {
            kind: InsightKind::Growth,
            title: "Growth Momentum".to_string(),
            description: format!("You've completed {total} growth-focused activities."),
            hint: RenderHint::new("trending-up", "#10B981"),
        })
    }
}
