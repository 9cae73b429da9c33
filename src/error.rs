//! Error types for the Momentum engine
//!
//! Engine computations never fail. These errors belong to the surrounding
//! shell: loading and saving snapshots, parsing dates, and applying user
//! actions to the tracker state.

use thiserror::Error;

/// Errors that can occur outside the pure engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid calendar date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Friction rating must be between 1 and 5, got {0}")]
    InvalidFriction(u8),

    #[error("{0} name must not be empty")]
    EmptyName(&'static str),

    #[error("Goal not found: {0}")]
    GoalNotFound(String),

    #[error("Habit not found: {0}")]
    HabitNotFound(String),

    #[error("Snapshot store error: {0}")]
    Store(String),

    #[error("Stored collection '{key}' is unreadable: {source}")]
    CorruptCollection {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
