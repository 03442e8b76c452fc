//! Unified error handling for the crammer crate
//!
//! This module provides a unified error type that consolidates all
//! domain-specific errors into a single `Error` enum, while keeping the
//! domain errors usable on their own where a module boundary wants them.
//!
//! The taxonomy mirrors the pipeline stages: configuration problems abort
//! before any network call, upstream and decode failures abort the run, and
//! dispatch failures are recovered per target and only become fatal when no
//! target succeeded.

use std::io;
use thiserror::Error;

// Re-export domain-specific errors for convenience
pub use crate::decode::DecodeError;
pub use crate::dispatch::DispatchError;
pub use crate::generator::UpstreamError;
pub use crate::scheduler::error::SchedulerError;

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Configuration and validation errors
    Config,
    /// Scheduler and rotation-state errors
    Scheduler,
    /// Generative-service request errors (transport, status, timeout)
    Upstream,
    /// Response decoding and repair errors
    Decode,
    /// Notification delivery errors
    Dispatch,
    /// Storage and I/O errors
    Storage,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Get string representation for log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Scheduler => "scheduler",
            Self::Upstream => "upstream",
            Self::Decode => "decode",
            Self::Dispatch => "dispatch",
            Self::Storage => "storage",
            Self::Other => "other",
        }
    }
}

/// Unified error type for the crammer crate
#[derive(Error, Debug)]
pub enum Error {
    /// Topic scheduling errors
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Content request errors
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Response decoding errors
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Dispatcher setup errors (per-target delivery failures are recovered
    /// inside the dispatch loop and never surface here)
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// Every configured notification target failed
    #[error("Dispatch failed: all {attempted} target(s) rejected the notification")]
    AllTargetsFailed { attempted: usize },

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Scheduler(_) => ErrorCategory::Scheduler,
            Self::Upstream(_) | Self::Http(_) => ErrorCategory::Upstream,
            Self::Decode(_) => ErrorCategory::Decode,
            Self::Dispatch(_) | Self::AllTargetsFailed { .. } => ErrorCategory::Dispatch,
            Self::Config(_) => ErrorCategory::Config,
            Self::Io(_) => ErrorCategory::Storage,
            Self::Json(_) => ErrorCategory::Decode,
        }
    }

    /// Check whether the error class aborts before the first outbound request
    pub fn is_pre_network(&self) -> bool {
        matches!(self.category(), ErrorCategory::Config | ErrorCategory::Scheduler)
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        let cfg = Error::config("missing api key");
        assert_eq!(cfg.category(), ErrorCategory::Config);

        let dispatch = Error::AllTargetsFailed { attempted: 3 };
        assert_eq!(dispatch.category(), ErrorCategory::Dispatch);
    }

    #[test]
    fn test_pre_network_classification() {
        assert!(Error::config("no webhooks").is_pre_network());
        assert!(!Error::AllTargetsFailed { attempted: 1 }.is_pre_network());
    }

    #[test]
    fn test_all_targets_failed_message() {
        let err = Error::AllTargetsFailed { attempted: 2 };
        assert!(err.to_string().contains("all 2 target(s)"));
    }

    #[test]
    fn test_scheduler_error_conversion() {
        let err: Error = SchedulerError::EmptyPool { period: 4 }.into();
        assert!(matches!(err, Error::Scheduler(_)));
        assert_eq!(err.category(), ErrorCategory::Scheduler);
    }
}
