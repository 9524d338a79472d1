//! Detection errors.

use super::error_code::{self, SentinelErrorCode};

/// Errors that can occur while evaluating detectors.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("Unknown detector type: {0}")]
    UnknownDetector(String),

    #[error("Invalid scope: {0}")]
    InvalidScope(String),

    #[error("Detector {detector} panicked: {message}")]
    DetectorPanic { detector: String, message: String },
}

impl SentinelErrorCode for DetectionError {
    fn error_code(&self) -> &'static str {
        error_code::DETECTION_ERROR
    }
}
