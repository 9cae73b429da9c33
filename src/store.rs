//! Snapshot persistence port
//!
//! The engine never touches storage. The shell reads and writes snapshots
//! through a [`SnapshotStore`], a key-value port holding one JSON document per
//! collection.

use crate::error::EngineError;
use crate::types::{Goal, Habit, Snapshot};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Key holding the goal collection
pub const GOALS_KEY: &str = "momentum-goals";

/// Key holding the habit collection
pub const HABITS_KEY: &str = "momentum-habits";

/// Key-value persistence for named snapshot documents
pub trait SnapshotStore {
    /// Read a document, `None` when the key has never been written
    fn get(&self, key: &str) -> Result<Option<String>, EngineError>;

    /// Write a document, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> Result<(), EngineError>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, EngineError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), EngineError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Directory-backed store, one `<key>.json` file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, EngineError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(EngineError::Store(format!("invalid key '{key}'")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl SnapshotStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, EngineError> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), EngineError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        // Write-then-rename so readers never see a partial document
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Load the snapshot, substituting empty collections for anything unreadable
///
/// A store failure or malformed document is logged and treated as empty so the
/// engine always receives a valid snapshot. Use [`try_load_snapshot`] before
/// writing back to the same store.
pub fn load_snapshot(store: &dyn SnapshotStore) -> Snapshot {
    let goals: Vec<Goal> = load_collection(store, GOALS_KEY).unwrap_or_else(|e| {
        warn!(key = GOALS_KEY, error = %e, "failed to load stored collection, using empty");
        Vec::new()
    });
    let habits: Vec<Habit> = load_collection(store, HABITS_KEY).unwrap_or_else(|e| {
        warn!(key = HABITS_KEY, error = %e, "failed to load stored collection, using empty");
        Vec::new()
    });
    debug!(goals = goals.len(), habits = habits.len(), "loaded snapshot");
    Snapshot::new(goals, habits)
}

/// Load the snapshot, failing on any unreadable or malformed collection
///
/// Missing keys still load as empty.
pub fn try_load_snapshot(store: &dyn SnapshotStore) -> Result<Snapshot, EngineError> {
    let goals: Vec<Goal> = load_collection(store, GOALS_KEY)?;
    let habits: Vec<Habit> = load_collection(store, HABITS_KEY)?;
    debug!(goals = goals.len(), habits = habits.len(), "loaded snapshot");
    Ok(Snapshot::new(goals, habits))
}

/// Persist both collections
pub fn save_snapshot(
    store: &mut dyn SnapshotStore,
    snapshot: &Snapshot,
) -> Result<(), EngineError> {
    store.set(GOALS_KEY, &serde_json::to_string(&snapshot.goals)?)?;
    store.set(HABITS_KEY, &serde_json::to_string(&snapshot.habits)?)?;
    debug!(
        goals = snapshot.goals.len(),
        habits = snapshot.habits.len(),
        "saved snapshot"
    );
    Ok(())
}

/// Decode one stored collection; a missing key is an empty collection
pub fn load_collection<T: DeserializeOwned>(
    store: &dyn SnapshotStore,
    key: &str,
) -> Result<Vec<T>, EngineError> {
    match store.get(key)? {
        None => Ok(Vec::new()),
        Some(json) => {
            serde_json::from_str(&json).map_err(|source| EngineError::CorruptCollection {
                key: key.to_string(),
                source,
            })
        }
    }
}
