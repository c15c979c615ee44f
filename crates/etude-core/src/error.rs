//! Core error types for etude-core.
//!
//! Only input validation and configuration handling can fail. Scoring is
//! total over well-formed data; inconsistent stored values are clamped and
//! logged instead of surfacing here.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for etude-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Rejected input, nothing was mutated
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Home/config directory could not be determined or created
    #[error("Configuration directory unavailable: {0}")]
    DirectoryUnavailable(String),
}

/// Invalid input rejected before any state change.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Quality score outside 1-5
    #[error("Quality score must be between 1 and 5, got {0}")]
    InvalidQuality(u8),

    /// Duration must be a positive, finite number of minutes
    #[error("Practice duration must be positive, got {0} minutes")]
    InvalidDuration(f64),

    /// Normalized bounds outside the unit square
    #[error("Spot bounds must lie within [0, 1]: x={x}, y={y}, w={w}, h={h}")]
    InvalidBounds { x: f64, y: f64, w: f64, h: f64 },

    /// Spot id already present in the piece
    #[error("Spot '{0}' already exists in this piece")]
    DuplicateSpot(String),

    /// No spot with this id
    #[error("Spot '{0}' not found")]
    SpotNotFound(String),

    /// Soft-deleted spots no longer accept attempts
    #[error("Spot '{0}' has been deleted")]
    SpotDeleted(String),

    /// Attempt belongs to a different spot
    #[error("Attempt for spot '{attempt_spot}' cannot be applied to spot '{spot}'")]
    SpotMismatch { spot: String, attempt_spot: String },

    /// Attempt predates the spot's latest logged attempt or scheduling
    #[error("Attempt at {timestamp} for spot '{spot}' is earlier than its last practice at {last}")]
    AttemptOutOfOrder {
        spot: String,
        timestamp: DateTime<Utc>,
        last: DateTime<Utc>,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
