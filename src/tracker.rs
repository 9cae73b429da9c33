//! Application shell
//!
//! [`Tracker`] owns a snapshot and applies user actions to it: creating goals
//! and habits, checking habits in with a friction rating, unchecking them and
//! cascading deletes. Every derived value comes from the pure engine via
//! [`Tracker::report`].

use crate::error::EngineError;
use crate::metrics::is_completed_on;
use crate::report::ReportBuilder;
use crate::store::{save_snapshot, try_load_snapshot, SnapshotStore};
use crate::types::{Completion, Goal, Habit, HabitType, Report, Snapshot};
use crate::validate::FRICTION_RANGE;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};
use uuid::Uuid;

/// Result of toggling a habit for a day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The day's completion was removed
    Uncompleted,
    /// The habit is not completed that day; a friction check-in is required
    NeedsCheckIn,
}

/// Stateful tracker over a single snapshot
#[derive(Default)]
pub struct Tracker {
    snapshot: Snapshot,
    reports: ReportBuilder,
}

impl Tracker {
    /// Tracker with an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker over an existing snapshot
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            reports: ReportBuilder::new(),
        }
    }

    /// Load state from a store
    ///
    /// Fails on unreadable or malformed stored data so that a later
    /// [`Tracker::save`] cannot replace it with partial state.
    pub fn load(store: &dyn SnapshotStore) -> Result<Self, EngineError> {
        Ok(Self::from_snapshot(try_load_snapshot(store)?))
    }

    /// Persist state to a store
    pub fn save(&self, store: &mut dyn SnapshotStore) -> Result<(), EngineError> {
        save_snapshot(store, &self.snapshot)
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn into_snapshot(self) -> Snapshot {
        self.snapshot
    }

    /// Create a goal
    pub fn add_goal(&mut self, name: &str, description: &str) -> Result<&Goal, EngineError> {
        self.add_goal_at(name, description, Utc::now())
    }

    /// Create a goal with an explicit creation time
    pub fn add_goal_at(
        &mut self,
        name: &str,
        description: &str,
        created_at: DateTime<Utc>,
    ) -> Result<&Goal, EngineError> {
        let name = non_empty(name, "Goal")?;
        let description = description.trim();

        let goal = Goal {
            id: new_id(),
            name,
            description: (!description.is_empty()).then(|| description.to_string()),
            created_at,
        };
        info!(goal_id = %goal.id, name = %goal.name, "added goal");

        self.snapshot.goals.push(goal);
        Ok(&self.snapshot.goals[self.snapshot.goals.len() - 1])
    }

    /// Create a habit attached to an existing goal
    pub fn add_habit(
        &mut self,
        goal_id: &str,
        name: &str,
        habit_type: HabitType,
    ) -> Result<&Habit, EngineError> {
        self.add_habit_at(goal_id, name, habit_type, Utc::now())
    }

    /// Create a habit with an explicit creation time
    pub fn add_habit_at(
        &mut self,
        goal_id: &str,
        name: &str,
        habit_type: HabitType,
        created_at: DateTime<Utc>,
    ) -> Result<&Habit, EngineError> {
        if self.snapshot.goal(goal_id).is_none() {
            return Err(EngineError::GoalNotFound(goal_id.to_string()));
        }
        let name = non_empty(name, "Habit")?;

        let habit = Habit {
            id: new_id(),
            goal_id: goal_id.to_string(),
            name,
            habit_type,
            completions: Vec::new(),
            created_at,
        };
        info!(habit_id = %habit.id, goal_id, "added habit");

        self.snapshot.habits.push(habit);
        Ok(&self.snapshot.habits[self.snapshot.habits.len() - 1])
    }

    /// Uncomplete the habit if it was completed on `date`; otherwise report
    /// that a check-in is needed
    pub fn toggle(
        &mut self,
        habit_id: &str,
        date: NaiveDate,
    ) -> Result<ToggleOutcome, EngineError> {
        let habit = self.habit_mut(habit_id)?;
        if is_completed_on(habit, date) {
            habit.completions.retain(|c| c.date != date);
            debug!(habit_id, %date, "toggled off");
            Ok(ToggleOutcome::Uncompleted)
        } else {
            Ok(ToggleOutcome::NeedsCheckIn)
        }
    }

    /// Record a completion with a friction rating
    ///
    /// Any completion already recorded for `date` is replaced, keeping at most
    /// one completion per habit per day.
    pub fn complete_with_friction(
        &mut self,
        habit_id: &str,
        date: NaiveDate,
        friction: u8,
        note: Option<&str>,
    ) -> Result<&Completion, EngineError> {
        if !FRICTION_RANGE.contains(&f64::from(friction)) {
            return Err(EngineError::InvalidFriction(friction));
        }

        let habit = self.habit_mut(habit_id)?;
        habit.completions.retain(|c| c.date != date);
        habit
            .completions
            .push(Completion::new(date, friction).with_note(note.unwrap_or_default()));
        debug!(habit_id, %date, friction, "checked in");

        Ok(&habit.completions[habit.completions.len() - 1])
    }

    /// Remove the completion for `date`; returns whether one existed
    pub fn uncomplete(&mut self, habit_id: &str, date: NaiveDate) -> Result<bool, EngineError> {
        let habit = self.habit_mut(habit_id)?;
        let before = habit.completions.len();
        habit.completions.retain(|c| c.date != date);
        Ok(habit.completions.len() != before)
    }

    /// Delete a goal and every habit referencing it; returns the number of
    /// habits removed
    pub fn delete_goal(&mut self, goal_id: &str) -> Result<usize, EngineError> {
        let before = self.snapshot.goals.len();
        self.snapshot.goals.retain(|g| g.id != goal_id);
        if self.snapshot.goals.len() == before {
            return Err(EngineError::GoalNotFound(goal_id.to_string()));
        }

        let habits_before = self.snapshot.habits.len();
        self.snapshot.habits.retain(|h| h.goal_id != goal_id);
        let removed = habits_before - self.snapshot.habits.len();
        info!(goal_id, habits_removed = removed, "deleted goal");
        Ok(removed)
    }

    /// Delete a single habit
    pub fn delete_habit(&mut self, habit_id: &str) -> Result<(), EngineError> {
        let before = self.snapshot.habits.len();
        self.snapshot.habits.retain(|h| h.id != habit_id);
        if self.snapshot.habits.len() == before {
            return Err(EngineError::HabitNotFound(habit_id.to_string()));
        }
        info!(habit_id, "deleted habit");
        Ok(())
    }

    /// Derived analytics for `reference_date`
    pub fn report(&self, reference_date: NaiveDate) -> Report {
        self.reports.build(&self.snapshot, reference_date)
    }

    fn habit_mut(&mut self, habit_id: &str) -> Result<&mut Habit, EngineError> {
        self.snapshot
            .habits
            .iter_mut()
            .find(|h| h.id == habit_id)
            .ok_or_else(|| EngineError::HabitNotFound(habit_id.to_string()))
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn non_empty(name: &str, kind: &'static str) -> Result<String, EngineError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(EngineError::EmptyName(kind));
    }
    Ok(trimmed.to_string())
}
