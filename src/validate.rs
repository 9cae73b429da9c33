//! Snapshot integrity checks
//!
//! The engine accepts any well-typed snapshot. These checks exist for the
//! shell and tooling: they report data that violates the model's invariants
//! without rejecting it.

use crate::types::Snapshot;
use chrono::NaiveDate;
use std::collections::HashSet;

/// Valid friction ratings
pub const FRICTION_RANGE: std::ops::RangeInclusive<f64> = 1.0..=5.0;

/// Integrity problems found in a snapshot
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SnapshotIssue {
    #[error("Duplicate goal id: {0}")]
    DuplicateGoalId(String),

    #[error("Duplicate habit id: {0}")]
    DuplicateHabitId(String),

    #[error("Habit {habit_id} references missing goal {goal_id}")]
    OrphanHabit { habit_id: String, goal_id: String },

    #[error("Habit {habit_id} has more than one completion on {date}")]
    DuplicateCompletionDate { habit_id: String, date: NaiveDate },

    #[error("Habit {habit_id} has friction {friction} on {date}, expected 1-5")]
    FrictionOutOfRange {
        habit_id: String,
        date: NaiveDate,
        friction: f64,
    },
}

/// Report every integrity issue, in snapshot order
pub fn validate_snapshot(snapshot: &Snapshot) -> Vec<SnapshotIssue> {
    let mut issues = Vec::new();

    let mut goal_ids = HashSet::new();
    for goal in &snapshot.goals {
        if !goal_ids.insert(goal.id.as_str()) {
            issues.push(SnapshotIssue::DuplicateGoalId(goal.id.clone()));
        }
    }

    let mut habit_ids = HashSet::new();
    for habit in &snapshot.habits {
        if !habit_ids.insert(habit.id.as_str()) {
            issues.push(SnapshotIssue::DuplicateHabitId(habit.id.clone()));
        }

        if !goal_ids.contains(habit.goal_id.as_str()) {
            issues.push(SnapshotIssue::OrphanHabit {
                habit_id: habit.id.clone(),
                goal_id: habit.goal_id.clone(),
            });
        }

        let mut dates = HashSet::new();
        for completion in &habit.completions {
            if !dates.insert(completion.date) {
                issues.push(SnapshotIssue::DuplicateCompletionDate {
                    habit_id: habit.id.clone(),
                    date: completion.date,
                });
            }

            if let Some(friction) = completion.friction {
                if !FRICTION_RANGE.contains(&friction) {
                    issues.push(SnapshotIssue::FrictionOutOfRange {
                        habit_id: habit.id.clone(),
                        date: completion.date,
                        friction,
                    });
                }
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Completion, Goal, Habit, HabitType};
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn goal(id: &str) -> Goal {
        Goal {
            id: id.to_string(),
            name: id.to_string(),
            description: None,
            created_at: Utc::now(),
        }
    }

    fn habit(id: &str, goal_id: &str, completions: Vec<Completion>) -> Habit {
        Habit {
            id: id.to_string(),
            goal_id: goal_id.to_string(),
            name: id.to_string(),
            habit_type: HabitType::Growth,
            completions,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_clean_snapshot() {
        let snapshot = Snapshot::new(
            vec![goal("g1")],
            vec![habit(
                "h1",
                "g1",
                vec![
                    Completion::new(day("2024-01-14"), 1),
                    Completion::new(day("2024-01-15"), 5),
                ],
            )],
        );
        assert!(validate_snapshot(&snapshot).is_empty());
        assert!(validate_snapshot(&Snapshot::default()).is_empty());
    }

    #[test]
    fn test_reports_every_issue() {
        let mut unrated = Completion::new(day("2024-01-13"), 3);
        unrated.friction = None;

        let snapshot = Snapshot::new(
            vec![goal("g1"), goal("g1")],
            vec![
                habit(
                    "h1",
                    "g1",
                    vec![
                        unrated,
                        Completion::new(day("2024-01-15"), 3),
                        Completion::new(day("2024-01-15"), 0),
                    ],
                ),
                habit("h1", "missing", vec![]),
            ],
        );

        let issues = validate_snapshot(&snapshot);
        assert_eq!(
            issues,
            vec![
                SnapshotIssue::DuplicateGoalId("g1".to_string()),
                SnapshotIssue::DuplicateCompletionDate {
                    habit_id: "h1".to_string(),
                    date: day("2024-01-15"),
                },
                SnapshotIssue::FrictionOutOfRange {
                    habit_id: "h1".to_string(),
                    date: day("2024-01-15"),
                    friction: 0.0,
                },
                SnapshotIssue::DuplicateHabitId("h1".to_string()),
                SnapshotIssue::OrphanHabit {
                    habit_id: "h1".to_string(),
                    goal_id: "missing".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_fractional_friction_in_range_is_clean() {
        let mut half = Completion::new(day("2024-01-14"), 3);
        half.friction = Some(2.5);
        let mut negative = Completion::new(day("2024-01-15"), 3);
        negative.friction = Some(-1.0);

        let snapshot = Snapshot::new(
            vec![goal("g1")],
            vec![habit("h1", "g1", vec![half, negative])],
        );
        assert_eq!(
            validate_snapshot(&snapshot),
            vec![SnapshotIssue::FrictionOutOfRange {
                habit_id: "h1".to_string(),
                date: day("2024-01-15"),
                friction: -1.0,
            }]
        );
    }

    #[test]
    fn test_issue_messages() {
        let issue = SnapshotIssue::FrictionOutOfRange {
            habit_id: "h1".to_string(),
            date: day("2024-01-15"),
            friction: 9.0,
        };
        assert_eq!(
            issue.to_string(),
            "Habit h1 has friction 9 on 2024-01-15, expected 1-5"
        );
    }
}
