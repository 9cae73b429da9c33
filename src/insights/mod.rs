//! Insight generation
//!
//! Insights are produced by an ordered list of independent rules. Each rule
//! inspects the snapshot and contributes at most one insight; output order is
//! rule order. New rules are appended with [`InsightGenerator::with_rule`].

mod friction;
mod growth;
mod timing;
mod weekly;

pub use friction::{FrictionAlertRule, HIGH_FRICTION_THRESHOLD};
pub use growth::GrowthMomentumRule;
pub use timing::OptimalTimingRule;
pub use weekly::{weekday_name, WeeklyPatternRule, WEEKDAY_NAMES};

use crate::types::{Habit, Insight};
use chrono::NaiveDate;
use tracing::debug;

/// Read-only view handed to every rule
#[derive(Debug, Clone, Copy)]
pub struct InsightContext<'a> {
    /// Habits in snapshot order
    pub habits: &'a [Habit],
    pub reference_date: NaiveDate,
}

/// Trait for insight rules
pub trait InsightRule {
    /// Stable identifier used in logs
    fn name(&self) -> &'static str;

    /// Evaluate the rule, returning an insight when its gate passes
    fn evaluate(&self, ctx: &InsightContext<'_>) -> Option<Insight>;
}

/// Ordered set of insight rules
pub struct InsightGenerator {
    rules: Vec<Box<dyn InsightRule>>,
}

impl Default for InsightGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightGenerator {
    /// Generator with the standard rules: weekly pattern, friction alert,
    /// growth momentum, optimal timing
    pub fn new() -> Self {
        Self::empty()
            .with_rule(WeeklyPatternRule)
            .with_rule(FrictionAlertRule::default())
            .with_rule(GrowthMomentumRule)
            .with_rule(OptimalTimingRule)
    }

    /// Generator with no rules
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule after the existing ones
    pub fn with_rule(mut self, rule: impl InsightRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Run every rule in order
    pub fn generate(&self, habits: &[Habit], reference_date: NaiveDate) -> Vec<Insight> {
        let ctx = InsightContext {
            habits,
            reference_date,
        };

        let insights: Vec<Insight> = self
            .rules
            .iter()
            .filter_map(|rule| {
                let insight = rule.evaluate(&ctx);
                if insight.is_none() {
                    debug!(rule = rule.name(), "insight rule gated out");
                }
                insight
            })
            .collect();

        debug!(
            habits = habits.len(),
            insights = insights.len(),
            "generated insights"
        );
        insights
    }
}

/// Generate insights with the standard rules
pub fn generate_insights(habits: &[Habit], reference_date: NaiveDate) -> Vec<Insight> {
    InsightGenerator::new().generate(habits, reference_date)
}
