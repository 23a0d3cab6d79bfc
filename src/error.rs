//! Error types for the motion engine.
//!
//! Only construction and configuration can fail. Per-sample and per-frame
//! processing never returns an error: bad input (a missing landmark, an
//! undefined angle, a clock going backwards) is dropped and processing
//! continues.
//!
//! ```text
//! MotionError (top-level)
//! ├── ConfigError   (threshold / band / parameter validation)
//! ├── serde_json    (config (de)serialization)
//! ├── io            (config file loading)
//! └── InvalidPose   (flat pose buffer of the wrong size)
//! ```

use thiserror::Error;

use crate::types::ExerciseType;

/// Convenient `Result` alias for fallible engine entry points.
pub type MotionResult<T> = Result<T, MotionError>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum MotionError {
    /// A configuration value was rejected.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// JSON (de)serialization of a configuration failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A flat pose buffer had the wrong number of values.
    #[error("Invalid pose buffer: expected {expected} values, got {actual}")]
    InvalidPose {
        /// Required buffer length.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },
}

/// Rejected configuration. Raised eagerly at construction time.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Rep thresholds are equal, non-finite, or ordered against the counter's policy.
    #[error(
        "Invalid thresholds for {exercise}: down={down}, up={up}, inverted={inverted} \
         (flexion needs down < up, extension needs up < down, both within [0, 180])"
    )]
    InvalidThresholds {
        exercise: ExerciseType,
        down: f32,
        up: f32,
        inverted: bool,
    },

    /// A hold band whose minimum is not strictly below its maximum.
    #[error("Hold band [{min}, {max}] is empty or inverted")]
    EmptyHoldBand { min: f32, max: f32 },

    /// Any other out-of-range parameter.
    #[error("Invalid value for `{field}`: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: String,
    },
}

impl ConfigError {
    /// Shorthand for [`ConfigError::InvalidValue`].
    pub fn invalid_value(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}
