//! Rotation state persistence
//!
//! The rotation state is a single small JSON record `{ period, pending }`
//! that survives process restarts. Loading is tolerant: a missing or corrupt
//! file simply reads as "absent" so the scheduler can reinitialize, which
//! covers both the first run and a file truncated by an earlier crash.
//! Saving is atomic (temp file + rename) and pretty-printed so operators can
//! inspect the record directly.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use super::error::{SchedulerError, SchedulerResult};

/// Persisted rotation state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationState {
    /// Period key the pending pool belongs to (month number)
    pub period: u32,

    /// Topics not yet issued in the current rotation pass
    pub pending: Vec<String>,
}

impl RotationState {
    /// Create state for a freshly shuffled pool
    pub fn new(period: u32, pending: Vec<String>) -> Self {
        Self { period, pending }
    }
}

/// File-backed store for the rotation state
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Create a store for the given state file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the current state
    ///
    /// Returns `None` when the file is missing or unreadable as state; the
    /// caller reinitializes in both cases.
    pub fn load(&self) -> Option<RotationState> {
        if !self.path.exists() {
            return None;
        }

        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Rotation state unreadable, reinitializing");
                return None;
            }
        };

        match serde_json::from_reader(BufReader::new(file)) {
            Ok(state) => {
                tracing::debug!(path = %self.path.display(), "Rotation state loaded");
                Some(state)
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Rotation state corrupt, reinitializing");
                None
            }
        }
    }

    /// Save state atomically, overwriting any previous record
    pub fn save(&self, state: &RotationState) -> SchedulerResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| SchedulerError::state_io("create directory for", parent, e))?;
            }
        }

        // Write to temp file first, then rename (atomic)
        let temp_path = self.path.with_extension("json.tmp");
        let file = File::create(&temp_path)
            .map_err(|e| SchedulerError::state_io("create", &temp_path, e))?;

        serde_json::to_writer_pretty(BufWriter::new(file), state)?;

        fs::rename(&temp_path, &self.path)
            .map_err(|e| SchedulerError::state_io("rename", &self.path, e))?;

        tracing::debug!(path = %self.path.display(), pending = state.pending.len(), "Rotation state saved");
        Ok(())
    }

    /// Get the state file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}
