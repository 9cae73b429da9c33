//! Core types for the Momentum engine
//!
//! This module defines the snapshot the engine consumes (goals, habits and
//! their completions) and the plain data records it produces (progress,
//! insights, trend points and the assembled report).

use crate::error::EngineError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Calendar-day format used for completion dates and reference dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` calendar day
pub fn parse_day(value: &str) -> Result<NaiveDate, EngineError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| EngineError::InvalidDate(value.to_string()))
}

/// Habit classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitType {
    Growth,
    Maintenance,
}

impl HabitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HabitType::Growth => "growth",
            HabitType::Maintenance => "maintenance",
        }
    }
}

/// A user-defined objective grouping related habits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A record that a habit was performed on one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    /// Calendar day, the natural key within a habit
    pub date: NaiveDate,
    /// Subjective difficulty, 1-5 at capture; stored values are taken as-is
    /// and older data may omit it
    #[serde(default)]
    pub friction: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub note: Option<String>,
}

impl Completion {
    pub fn new(date: NaiveDate, friction: u8) -> Self {
        Self {
            date,
            friction: Some(f64::from(friction)),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let note = note.into();
        self.note = if note.trim().is_empty() { None } else { Some(note) };
        self
    }
}

/// A recurring action attached to a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    /// Owning goal (reference only)
    pub goal_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub habit_type: HabitType,
    /// Check-in order, not necessarily sorted by date
    #[serde(default)]
    pub completions: Vec<Completion>,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    /// Completion recorded for the given day, if any
    pub fn completion_on(&self, date: NaiveDate) -> Option<&Completion> {
        self.completions.iter().find(|c| c.date == date)
    }
}

/// Immutable input handed to every engine entry point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub habits: Vec<Habit>,
}

impl Snapshot {
    pub fn new(goals: Vec<Goal>, habits: Vec<Habit>) -> Self {
        Self { goals, habits }
    }

    /// Habits referencing the goal, in snapshot order
    pub fn habits_for_goal<'a>(&'a self, goal_id: &'a str) -> impl Iterator<Item = &'a Habit> {
        self.habits.iter().filter(move |h| h.goal_id == goal_id)
    }

    pub fn goal(&self, goal_id: &str) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == goal_id)
    }

    pub fn habit(&self, habit_id: &str) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == habit_id)
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty() && self.habits.is_empty()
    }

    /// Load a snapshot from JSON
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize a snapshot to JSON
    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Per-goal completion progress for one day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub completed: usize,
    pub total: usize,
    /// 0-100, unrounded
    pub percentage: f64,
}

/// Progress across every habit, rounded for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallProgress {
    pub completed: usize,
    pub total: usize,
    pub percentage: u32,
}

/// Insight category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Pattern,
    Friction,
    Growth,
    Timing,
}

/// Presentation hint attached to an insight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderHint {
    pub icon: String,
    pub color: String,
}

impl RenderHint {
    pub fn new(icon: &str, color: &str) -> Self {
        Self {
            icon: icon.to_string(),
            color: color.to_string(),
        }
    }
}

/// A short heuristic observation derived from completion patterns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub hint: RenderHint,
}

/// One day of the consistency chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    /// Short weekday label ("Mon")
    pub label: String,
    /// Habits completed that day
    pub completions: usize,
    /// Mean friction across completed habits, 0 when none
    pub friction: f64,
}

/// Totals shown next to the chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_completions: usize,
    pub average_per_habit: u64,
}

/// Report metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMeta {
    pub engine: String,
    pub version: String,
    pub reference_date: NaiveDate,
}

/// Per-habit row inside a goal section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitRow {
    pub habit_id: String,
    pub name: String,
    pub habit_type: HabitType,
    pub completed_today: bool,
    pub impact_score: u32,
    /// Lifetime completion count
    pub streak_count: usize,
    pub consecutive_streak: u32,
}

/// Per-goal section of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalSection {
    pub goal_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub progress: GoalProgress,
    /// Unclamped, may exceed 100
    pub impact_score: u32,
    pub habits: Vec<HabitRow>,
}

/// Everything derived from one snapshot for one reference date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub meta: ReportMeta,
    pub overall: OverallProgress,
    pub goals: Vec<GoalSection>,
    pub insights: Vec<Insight>,
    pub trend: Vec<TrendPoint>,
    pub summary: SummaryStats,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
