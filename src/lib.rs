//! Momentum - deterministic analytics engine for goal and habit tracking
//!
//! Momentum turns a snapshot of goals, habits and friction-rated completions
//! into derived signals: daily progress, impact scores, completion counts,
//! heuristic insights and a 7-day trend series. Every engine function is pure
//! and takes its reference date explicitly.
//!
//! ## Modules
//!
//! - **Engine**: [`metrics`], [`insights`], [`trend`], assembled by [`report`]
//! - **Shell**: [`tracker`] applies user actions, [`store`] persists snapshots,
//!   [`validate`] reports integrity issues

pub mod error;
pub mod insights;
pub mod metrics;
pub mod report;
pub mod store;
pub mod tracker;
pub mod trend;
pub mod types;
pub mod validate;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use error::EngineError;
pub use insights::{generate_insights, InsightContext, InsightGenerator, InsightRule};
pub use metrics::{
    consecutive_streak, goal_impact_score, goal_progress, habit_impact_score, is_completed_on,
    streak_count,
};
pub use report::{build_report, ReportBuilder};
pub use store::{FileStore, MemoryStore, SnapshotStore};
pub use tracker::{ToggleOutcome, Tracker};
pub use trend::trend_series;
pub use types::{Completion, Goal, Habit, HabitType, Insight, Report, Snapshot};
pub use validate::{validate_snapshot, SnapshotIssue};

/// Engine version embedded in every report
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name embedded in every report
pub const ENGINE_NAME: &str = "momentum-engine";
