//! High friction alert rule

use super::{InsightContext, InsightRule};
use crate::metrics::{mean_friction, trailing_window};
use crate::types::{Habit, Insight, InsightKind, RenderHint};

/// Mean trailing friction above which a habit is flagged
pub const HIGH_FRICTION_THRESHOLD: f64 = 3.5;

/// Names the first habit, in snapshot order, whose recent friction is high
///
/// Habits without completions have no mean and never qualify.
#[derive(Debug, Clone, Copy)]
pub struct FrictionAlertRule {
    threshold: f64,
}

impl Default for FrictionAlertRule {
    fn default() -> Self {
        Self::with_threshold(HIGH_FRICTION_THRESHOLD)
    }
}

impl FrictionAlertRule {
    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }

    fn qualifies(&self, habit: &Habit) -> bool {
        mean_friction(trailing_window(&habit.completions))
            .map(|avg| avg > self.threshold)
            .unwrap_or(false)
    }
}

impl InsightRule for FrictionAlertRule {
    fn name(&self) -> &'static str {
        "friction_alert"
    }

    fn evaluate(&self, ctx: &InsightContext<'_>) -> Option<Insight> {
        let habit = ctx.habits.iter().find(|h| self.qualifies(h))?;

        Some(Insight {
            kind: InsightKind::Friction,
            title: "High Friction Alert".to_string(),
            description: format!(
                "\"{}\" has been challenging lately. Your notes suggest breaking it into smaller steps might help.",
                habit.name
            ),
            hint: RenderHint::new("trending-down", "#EF4444"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{day, habit};
    use super::*;
    use crate::types::{Completion, HabitType};

    fn evaluate(habits: &[Habit]) -> Option<Insight> {
        let ctx = InsightContext {
            habits,
            reference_date: day("2024-01-15"),
        };
        FrictionAlertRule::default().evaluate(&ctx)
    }

    #[test]
    fn test_single_hard_completion_qualifies() {
        let habits = vec![habit(
            "Deep work",
            HabitType::Growth,
            vec![Completion::new(day("2024-01-15"), 5)],
        )];

        let insight = evaluate(&habits).unwrap();
        assert_eq!(insight.kind, InsightKind::Friction);
        assert!(insight.description.starts_with("\"Deep work\""));
    }

    #[test]
    fn test_first_qualifier_in_snapshot_order() {
        let habits = vec![
            habit("Empty", HabitType::Growth, vec![]),
            habit(
                "Easy",
                HabitType::Growth,
                vec![Completion::new(day("2024-01-15"), 2)],
            ),
            habit(
                "Hard",
                HabitType::Growth,
                vec![Completion::new(day("2024-01-15"), 4)],
            ),
            habit(
                "Harder",
                HabitType::Growth,
                vec![Completion::new(day("2024-01-15"), 5)],
            ),
        ];

        let insight = evaluate(&habits).unwrap();
        assert!(insight.description.contains("\"Hard\""));
        assert!(!insight.description.contains("Harder"));
    }

    #[test]
    fn test_threshold_is_strict() {
        // Mean exactly 3.5 does not qualify
        let habits = vec![habit(
            "Borderline",
            HabitType::Growth,
            vec![
                Completion::new(day("2024-01-14"), 3),
                Completion::new(day("2024-01-15"), 4),
            ],
        )];
        assert!(evaluate(&habits).is_none());
    }

    #[test]
    fn test_missing_friction_counts_as_neutral() {
        let mut unrated = Completion::new(day("2024-01-14"), 3);
        unrated.friction = None;
        let habits = vec![habit(
            "Mixed",
            HabitType::Growth,
            vec![unrated, Completion::new(day("2024-01-15"), 5)],
        )];

        // (3 + 5) / 2 = 4
        assert!(evaluate(&habits).is_some());
    }

    #[test]
    fn test_out_of_range_values_are_averaged_as_is() {
        let mut huge = Completion::new(day("2024-01-15"), 3);
        huge.friction = Some(9.0);
        let flagged = vec![habit("Huge", HabitType::Growth, vec![huge])];
        assert!(evaluate(&flagged).is_some());

        // (-1 + 5 + 0) / 3 = 1.33
        let mut negative = Completion::new(day("2024-01-13"), 3);
        negative.friction = Some(-1.0);
        let mut zero = Completion::new(day("2024-01-15"), 3);
        zero.friction = Some(0.0);
        let calm = vec![habit(
            "Calm",
            HabitType::Growth,
            vec![negative, Completion::new(day("2024-01-14"), 5), zero],
        )];
        assert!(evaluate(&calm).is_none());
    }

    #[test]
    fn test_only_trailing_window_counts() {
        let mut completions = vec![Completion::new(day("2024-01-01"), 5)];
        completions.extend((2..9).map(|d| Completion::new(day(&format!("2024-01-{d:02}")), 3)));
        let habits = vec![habit("Old pain", HabitType::Growth, completions)];

        assert!(evaluate(&habits).is_none());
    }

    #[test]
    fn test_no_completions_anywhere() {
        let habits = vec![
            habit("A", HabitType::Growth, vec![]),
            habit("B", HabitType::Maintenance, vec![]),
        ];
        assert!(evaluate(&habits).is_none());
    }
}
