//! Metrics engine
//!
//! Pure functions deriving numeric signals from a snapshot:
//! - Daily completion status and goal progress
//! - Habit and goal impact scores
//! - Lifetime completion counts and consecutive-day streaks
//!
//! Nothing here reads the clock. Functions that depend on "today" take the
//! reference date explicitly.

use crate::types::{Completion, Goal, GoalProgress, Habit, OverallProgress};
use chrono::{Duration, NaiveDate};

/// Number of most recent completions considered "recent"
pub const IMPACT_WINDOW: usize = 7;

/// Friction assumed when a completion carries no rating
pub const NEUTRAL_FRICTION: f64 = 3.0;

/// Upper bound used when rendering impact as a ring
pub const IMPACT_DISPLAY_MAX: u32 = 100;

/// True iff the habit has a completion on the given day
pub fn is_completed_on(habit: &Habit, date: NaiveDate) -> bool {
    habit.completions.iter().any(|c| c.date == date)
}

/// Completed/total/percentage for the habits of one goal on one day
pub fn goal_progress(goal: &Goal, habits: &[Habit], date: NaiveDate) -> GoalProgress {
    let mut total = 0;
    let mut completed = 0;

    for habit in habits.iter().filter(|h| h.goal_id == goal.id) {
        total += 1;
        if is_completed_on(habit, date) {
            completed += 1;
        }
    }

    let percentage = if total == 0 {
        0.0
    } else {
        (completed as f64 / total as f64) * 100.0
    };

    GoalProgress {
        completed,
        total,
        percentage,
    }
}

/// Last `IMPACT_WINDOW` completions in insertion order
///
/// "Recent" means recently recorded, not recent by date: backfilled or sparse
/// data can make the window span any number of calendar days.
pub fn trailing_window(completions: &[Completion]) -> &[Completion] {
    let start = completions.len().saturating_sub(IMPACT_WINDOW);
    &completions[start..]
}

/// Friction of a completion, substituting the neutral rating when missing
pub fn friction_value(completion: &Completion) -> f64 {
    completion.friction.unwrap_or(NEUTRAL_FRICTION)
}

/// Mean friction over a set of completions, `None` when empty
pub fn mean_friction(completions: &[Completion]) -> Option<f64> {
    if completions.is_empty() {
        return None;
    }
    let sum: f64 = completions.iter().map(friction_value).sum();
    Some(sum / completions.len() as f64)
}

/// Unrounded impact score of a habit
///
/// Formula: `consistency * (avg_friction / 3)` where
/// `consistency = 100 * |window| / 7` over the trailing window.
/// An empty window yields 0 regardless of friction.
pub fn habit_impact_raw(habit: &Habit) -> f64 {
    let window = trailing_window(&habit.completions);
    let avg_friction = mean_friction(window).unwrap_or(NEUTRAL_FRICTION);
    let consistency = (window.len() as f64 / IMPACT_WINDOW as f64) * 100.0;
    let difficulty_multiplier = avg_friction / NEUTRAL_FRICTION;
    consistency * difficulty_multiplier
}

/// Impact score of a habit rounded to the nearest integer
///
/// Not clamped: friction above 3 pushes a full window past 100.
pub fn habit_impact_score(habit: &Habit) -> u32 {
    round_score(habit_impact_raw(habit))
}

/// Mean unrounded impact over the goal's habits, rounded; 0 without habits
pub fn goal_impact_score(goal: &Goal, habits: &[Habit]) -> u32 {
    let (count, sum) = habits
        .iter()
        .filter(|h| h.goal_id == goal.id)
        .fold((0usize, 0.0f64), |(count, sum), h| {
            (count + 1, sum + habit_impact_raw(h))
        });

    if count == 0 {
        return 0;
    }
    round_score(sum / count as f64)
}

/// Lifetime number of completions
///
/// Displayed as a "streak" but counts every completion ever recorded; see
/// [`consecutive_streak`] for the run of consecutive days.
pub fn streak_count(habit: &Habit) -> usize {
    habit.completions.len()
}

/// Consecutive completed days ending at the reference date
///
/// Counting starts at the reference date, or at the day before when the
/// reference day has no completion yet. Returns 0 when neither day is
/// completed.
pub fn consecutive_streak(habit: &Habit, reference_date: NaiveDate) -> u32 {
    let start = if is_completed_on(habit, reference_date) {
        reference_date
    } else {
        let yesterday = reference_date - Duration::days(1);
        if !is_completed_on(habit, yesterday) {
            return 0;
        }
        yesterday
    };

    let mut streak: u32 = 0;
    let mut day = start;
    while is_completed_on(habit, day) {
        streak += 1;
        day -= Duration::days(1);
    }
    streak
}

/// Completed/total habits across all goals, percentage rounded
pub fn overall_progress(habits: &[Habit], date: NaiveDate) -> OverallProgress {
    let total = habits.len();
    let completed = habits.iter().filter(|h| is_completed_on(h, date)).count();
    let percentage = if total > 0 {
        round_score((completed as f64 / total as f64) * 100.0)
    } else {
        0
    };

    OverallProgress {
        completed,
        total,
        percentage,
    }
}

/// Completions across every habit
pub fn total_completions(habits: &[Habit]) -> usize {
    habits.iter().map(streak_count).sum()
}

/// Average completions per habit, rounded; the habit count is floored at 1
pub fn average_per_habit(habits: &[Habit]) -> u64 {
    let total = total_completions(habits) as f64;
    (total / habits.len().max(1) as f64).round() as u64
}

/// Clamp an impact score for ring rendering
pub fn clamp_impact(score: u32) -> u32 {
    score.min(IMPACT_DISPLAY_MAX)
}

fn round_score(value: f64) -> u32 {
    value.round().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HabitType;
    use chrono::Utc;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn make_goal(id: &str) -> Goal {
        Goal {
            id: id.to_string(),
            name: format!("Goal {id}"),
            description: None,
            created_at: Utc::now(),
        }
    }

    fn make_habit(id: &str, goal_id: &str, completions: Vec<Completion>) -> Habit {
        Habit {
            id: id.to_string(),
            goal_id: goal_id.to_string(),
            name: format!("Habit {id}"),
            habit_type: HabitType::Growth,
            completions,
            created_at: Utc::now(),
        }
    }

    /// `n` consecutive days ending 2024-01-15, all with the same friction
    fn completions(n: i64, friction: u8) -> Vec<Completion> {
        (0..n)
            .rev()
            .map(|i| Completion::new(day("2024-01-15") - Duration::days(i), friction))
            .collect()
    }

    #[test]
    fn test_is_completed_on() {
        let habit = make_habit("h1", "g1", vec![Completion::new(day("2024-01-15"), 3)]);
        assert!(is_completed_on(&habit, day("2024-01-15")));
        assert!(!is_completed_on(&habit, day("2024-01-14")));
    }

    #[test]
    fn test_goal_progress_without_habits() {
        let goal = make_goal("g1");
        let habits = vec![make_habit("h1", "other", completions(3, 3))];

        let progress = goal_progress(&goal, &habits, day("2024-01-15"));
        assert_eq!(progress.completed, 0);
        assert_eq!(progress.total, 0);
        assert_eq!(progress.percentage, 0.0);
        assert_eq!(goal_impact_score(&goal, &habits), 0);
    }

    #[test]
    fn test_goal_progress_partial() {
        let goal = make_goal("g1");
        let habits = vec![
            make_habit("h1", "g1", completions(1, 3)),
            make_habit("h2", "g1", vec![]),
            make_habit("h3", "g1", vec![]),
        ];

        let progress = goal_progress(&goal, &habits, day("2024-01-15"));
        assert_eq!(progress.completed, 1);
        assert_eq!(progress.total, 3);
        // Unrounded at this layer
        assert!((progress.percentage - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_impact_empty_is_zero() {
        let habit = make_habit("h1", "g1", vec![]);
        assert_eq!(habit_impact_raw(&habit), 0.0);
        assert_eq!(habit_impact_score(&habit), 0);
    }

    #[test]
    fn test_impact_full_window_neutral_friction() {
        let habit = make_habit("h1", "g1", completions(7, 3));
        assert_eq!(habit_impact_score(&habit), 100);
    }

    #[test]
    fn test_impact_uses_only_last_seven() {
        let mut history = completions(10, 1);
        // The last seven recorded entries are rated 5, older ones 1
        for c in history.iter_mut().skip(3) {
            c.friction = Some(5.0);
        }
        let habit = make_habit("h1", "g1", history);

        // consistency 100, multiplier 5/3
        assert_eq!(habit_impact_score(&habit), 167);
    }

    #[test]
    fn test_impact_window_is_insertion_order_not_date() {
        // Recorded out of date order: the trailing window still follows insertion
        let mut history = vec![Completion::new(day("2024-01-20"), 5)];
        history.extend(completions(7, 1));
        let habit = make_habit("h1", "g1", history);

        let window = trailing_window(&habit.completions);
        assert_eq!(window.len(), 7);
        assert!(window.iter().all(|c| c.friction == Some(1.0)));
        assert_eq!(habit_impact_score(&habit), 33);
    }

    #[test]
    fn test_impact_missing_friction_is_neutral() {
        let mut history = completions(2, 3);
        history[0].friction = None;
        let habit = make_habit("h1", "g1", history);

        // 2/7 * 100 * (3/3) = 28.57
        assert_eq!(habit_impact_score(&habit), 29);
    }

    #[test]
    fn test_impact_averages_out_of_range_friction() {
        let mut history = completions(3, 3);
        history[0].friction = Some(0.0);
        history[1].friction = Some(9.0);
        history[2].friction = Some(-1.0);
        let habit = make_habit("h1", "g1", history);

        assert_eq!(mean_friction(&habit.completions), Some(8.0 / 3.0));
        // 3/7 * 100 * (8/3 / 3) = 38.1
        assert_eq!(habit_impact_score(&habit), 38);
    }

    #[test]
    fn test_impact_low_friction_scores_lower() {
        let easy = make_habit("easy", "g1", completions(7, 1));
        let hard = make_habit("hard", "g1", completions(7, 4));
        assert!(habit_impact_score(&easy) < habit_impact_score(&hard));
        assert_eq!(habit_impact_score(&easy), 33);
        assert_eq!(habit_impact_score(&hard), 133);
    }

    #[test]
    fn test_goal_impact_averages_unrounded_scores() {
        let goal = make_goal("g1");
        let habits = vec![
            // 1/7*100 = 14.2857
            make_habit("h1", "g1", completions(1, 3)),
            // 2/7*100 = 28.5714
            make_habit("h2", "g1", completions(2, 3)),
            make_habit("h3", "g2", completions(7, 5)),
        ];

        // (14.2857 + 28.5714) / 2 = 21.43
        assert_eq!(goal_impact_score(&goal, &habits), 21);
    }

    #[test]
    fn test_goal_impact_is_not_clamped() {
        let goal = make_goal("g1");
        let habits = vec![make_habit("h1", "g1", completions(7, 5))];
        assert_eq!(goal_impact_score(&goal, &habits), 167);
        assert_eq!(clamp_impact(goal_impact_score(&goal, &habits)), 100);
    }

    #[test]
    fn test_streak_count_is_lifetime_total() {
        let mut history = completions(3, 2);
        history.push(Completion::new(day("2023-06-01"), 2));
        let habit = make_habit("h1", "g1", history);
        assert_eq!(streak_count(&habit), 4);
    }

    #[test]
    fn test_consecutive_streak() {
        let habit = make_habit("h1", "g1", completions(5, 3));
        assert_eq!(consecutive_streak(&habit, day("2024-01-15")), 5);
        // Reference day not completed yet: count from yesterday
        assert_eq!(consecutive_streak(&habit, day("2024-01-16")), 5);
        // Two days without a completion breaks the run
        assert_eq!(consecutive_streak(&habit, day("2024-01-17")), 0);
    }

    #[test]
    fn test_consecutive_streak_gap() {
        let habit = make_habit(
            "h1",
            "g1",
            vec![
                Completion::new(day("2024-01-15"), 3),
                Completion::new(day("2024-01-12"), 3),
                Completion::new(day("2024-01-14"), 3),
            ],
        );
        assert_eq!(consecutive_streak(&habit, day("2024-01-15")), 2);
    }

    #[test]
    fn test_overall_progress_and_summary() {
        let habits = vec![
            make_habit("h1", "g1", completions(3, 3)),
            make_habit("h2", "g1", vec![]),
            make_habit("h3", "g2", vec![Completion::new(day("2024-01-10"), 2)]),
        ];

        let overall = overall_progress(&habits, day("2024-01-15"));
        assert_eq!(overall.completed, 1);
        assert_eq!(overall.total, 3);
        assert_eq!(overall.percentage, 33);

        assert_eq!(total_completions(&habits), 4);
        assert_eq!(average_per_habit(&habits), 1);
        assert_eq!(average_per_habit(&[]), 0);
        assert_eq!(overall_progress(&[], day("2024-01-15")).percentage, 0);
    }

    #[test]
    fn test_metrics_are_idempotent() {
        let goal = make_goal("g1");
        let habits = vec![make_habit("h1", "g1", completions(4, 4))];
        let date = day("2024-01-15");

        assert_eq!(
            goal_progress(&goal, &habits, date),
            goal_progress(&goal, &habits, date)
        );
        assert_eq!(
            goal_impact_score(&goal, &habits),
            goal_impact_score(&goal, &habits)
        );
        assert_eq!(
            habit_impact_raw(&habits[0]).to_bits(),
            habit_impact_raw(&habits[0]).to_bits()
        );
    }
}
