//! SentinelErrorCode trait for structured error codes.

/// Trait for mapping Sentinel errors to stable error code strings.
/// Every error enum implements this so API layers and logs can carry a
/// machine-readable code next to the human message.
pub trait SentinelErrorCode {
    /// Returns the error code string (e.g., "STORAGE_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted coded string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

// Error code constants.
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const DB_BUSY: &str = "DB_BUSY";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const DETECTION_ERROR: &str = "DETECTION_ERROR";
pub const REASONING_TRANSIENT: &str = "REASONING_TRANSIENT";
pub const REASONING_PERMANENT: &str = "REASONING_PERMANENT";
pub const REASONING_TIMEOUT: &str = "REASONING_TIMEOUT";
pub const THRESHOLD_ERROR: &str = "THRESHOLD_ERROR";
pub const COLLABORATOR_ERROR: &str = "COLLABORATOR_ERROR";
pub const CANCELLED: &str = "CANCELLED";
pub const PIPELINE_ERROR: &str = "PIPELINE_ERROR";
