//! Reasoning service errors.

use super::error_code::{self, SentinelErrorCode};

/// Errors returned by the external reasoning service.
///
/// `Transient` failures are retried by the chain orchestrator; `Permanent`
/// failures (bad request, auth) are not.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ReasoningError {
    #[error("Transient reasoning failure: {0}")]
    Transient(String),

    #[error("Permanent reasoning failure: {0}")]
    Permanent(String),

    #[error("Reasoning step timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Reasoning service not configured")]
    NotConfigured,
}

impl ReasoningError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_) | Self::Timeout { .. })
    }
}

impl SentinelErrorCode for ReasoningError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Transient(_) => error_code::REASONING_TRANSIENT,
            Self::Permanent(_) | Self::NotConfigured => error_code::REASONING_PERMANENT,
            Self::Timeout { .. } => error_code::REASONING_TIMEOUT,
        }
    }
}
