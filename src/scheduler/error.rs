//! Error types for the scheduler module

use thiserror::Error;

/// Result type for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Scheduler-specific errors
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// The resolved pool for a period has no topics
    #[error("No topics configured for period {period} (and no usable default pool)")]
    EmptyPool { period: u32 },

    /// A pool contains the same label twice
    #[error("Duplicate topic '{label}' in pool '{pool}'")]
    DuplicateTopic { pool: String, label: String },

    /// State file could not be written
    #[error("Failed to {operation} rotation state at {path}: {source}")]
    StateIo {
        operation: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// State serialization failed
    #[error("Failed to serialize rotation state: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SchedulerError {
    /// Create a state I/O error with context
    pub fn state_io(
        operation: &'static str,
        path: &std::path::Path,
        source: std::io::Error,
    ) -> Self {
        Self::StateIo {
            operation,
            path: path.display().to_string(),
            source,
        }
    }
}
