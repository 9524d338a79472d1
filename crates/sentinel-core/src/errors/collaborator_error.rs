//! External collaborator errors.

use super::error_code::{self, SentinelErrorCode};

/// Failures reported by external collaborators (content feed, scorer,
/// market data, competitor discovery, notification delivery).
#[derive(Debug, Clone, thiserror::Error)]
pub enum CollaboratorError {
    #[error("{service} unavailable: {message}")]
    Unavailable { service: &'static str, message: String },

    #[error("{service} returned invalid data: {message}")]
    InvalidResponse { service: &'static str, message: String },
}

impl SentinelErrorCode for CollaboratorError {
    fn error_code(&self) -> &'static str {
        error_code::COLLABORATOR_ERROR
    }
}
