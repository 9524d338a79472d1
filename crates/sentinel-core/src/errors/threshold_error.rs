//! Threshold store errors.

use super::error_code::{self, SentinelErrorCode};
use super::StorageError;

/// Errors raised by threshold reads and audited updates.
#[derive(Debug, thiserror::Error)]
pub enum ThresholdError {
    #[error("Unknown detector type: {0}")]
    UnknownDetector(String),

    #[error("Value {value} for {detector_type} is outside [{lower}, {upper}]")]
    OutOfBounds {
        detector_type: String,
        value: f64,
        lower: f64,
        upper: f64,
    },

    #[error("Value for {detector_type} must be finite and positive, got {value}")]
    InvalidValue { detector_type: String, value: f64 },

    #[error("Tuning lock poisoned")]
    LockPoisoned,

    #[error("Threshold storage failed: {0}")]
    Storage(#[from] StorageError),
}

impl SentinelErrorCode for ThresholdError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Storage(e) => e.error_code(),
            _ => error_code::THRESHOLD_ERROR,
        }
    }
}
