//! Error types
//!
//! Round failures are not errors: they are `RoundOutcome` data. The only
//! errors are configuration rejected at startup and collaborator-layer I/O.

use std::path::PathBuf;
use thiserror::Error;

/// A `Settings` value that cannot drive a round.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A duration is negative, NaN or infinite
    #[error("{field} must be a finite, non-negative number of seconds (got {value})")]
    InvalidDuration { field: &'static str, value: f32 },

    /// A duration that must elapse before anything happens is zero
    #[error("{field} must be greater than zero (got {value})")]
    ZeroDuration { field: &'static str, value: f32 },

    /// A probability outside [0, 1]
    #[error("{field} must be a probability in [0, 1] (got {value})")]
    InvalidChance { field: &'static str, value: f32 },

    /// Swipe threshold must be a positive distance
    #[error("swipe_threshold must be a finite, positive distance (got {0})")]
    InvalidSwipeThreshold(f32),

    /// Countdown must show at least one number
    #[error("countdown_from must be at least 1")]
    EmptyCountdown,

    /// Settings file could not be read
    #[error("failed to read settings file {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// Settings file could not be parsed
    #[error("invalid settings JSON: {0}")]
    Parse(String),

    /// Settings could not be written as JSON
    #[error("failed to serialize settings: {0}")]
    Serialize(String),
}

/// Errors from the progress store.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("failed to access progress file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("progress data is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}
