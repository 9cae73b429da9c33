//! Report assembly
//!
//! Combines metrics, insights and the trend series for one snapshot and one
//! reference date into a single serializable [`Report`]. Reports carry no
//! wall-clock timestamps or random identifiers, so rebuilding from the same
//! inputs yields byte-identical JSON.

use crate::error::EngineError;
use crate::insights::InsightGenerator;
use crate::metrics::{
    average_per_habit, consecutive_streak, goal_impact_score, goal_progress, habit_impact_score,
    is_completed_on, overall_progress, streak_count, total_completions,
};
use crate::trend::trend_series;
use crate::types::{GoalSection, HabitRow, Report, ReportMeta, Snapshot, SummaryStats};
use crate::{ENGINE_NAME, ENGINE_VERSION};
use chrono::NaiveDate;
use tracing::debug;

/// Builds reports from snapshots
#[derive(Default)]
pub struct ReportBuilder {
    generator: InsightGenerator,
}

impl ReportBuilder {
    /// Builder using the standard insight rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder using a custom rule set
    pub fn with_generator(generator: InsightGenerator) -> Self {
        Self { generator }
    }

    /// Build the report for `reference_date`
    pub fn build(&self, snapshot: &Snapshot, reference_date: NaiveDate) -> Report {
        let habits = &snapshot.habits;

        let goals = snapshot
            .goals
            .iter()
            .map(|goal| GoalSection {
                goal_id: goal.id.clone(),
                name: goal.name.clone(),
                description: goal.description.clone(),
                progress: goal_progress(goal, habits, reference_date),
                impact_score: goal_impact_score(goal, habits),
                habits: snapshot
                    .habits_for_goal(&goal.id)
                    .map(|habit| HabitRow {
                        habit_id: habit.id.clone(),
                        name: habit.name.clone(),
                        habit_type: habit.habit_type,
                        completed_today: is_completed_on(habit, reference_date),
                        impact_score: habit_impact_score(habit),
                        streak_count: streak_count(habit),
                        consecutive_streak: consecutive_streak(habit, reference_date),
                    })
                    .collect(),
            })
            .collect();

        let report = Report {
            meta: ReportMeta {
                engine: ENGINE_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                reference_date,
            },
            overall: overall_progress(habits, reference_date),
            goals,
            insights: self.generator.generate(habits, reference_date),
            trend: trend_series(habits, reference_date),
            summary: SummaryStats {
                total_completions: total_completions(habits),
                average_per_habit: average_per_habit(habits),
            },
        };

        debug!(
            %reference_date,
            goals = report.goals.len(),
            habits = habits.len(),
            "built report"
        );
        report
    }

    /// Build and encode as pretty-printed JSON
    pub fn build_json(
        &self,
        snapshot: &Snapshot,
        reference_date: NaiveDate,
    ) -> Result<String, EngineError> {
        let report = self.build(snapshot, reference_date);
        serde_json::to_string_pretty(&report).map_err(EngineError::Json)
    }
}

/// Build a report with the standard insight rules
pub fn build_report(snapshot: &Snapshot, reference_date: NaiveDate) -> Report {
    ReportBuilder::new().build(snapshot, reference_date)
}
