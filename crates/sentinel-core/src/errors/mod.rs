//! Error handling for Sentinel.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod collaborator_error;
pub mod config_error;
pub mod detection_error;
pub mod error_code;
pub mod pipeline_error;
pub mod reasoning_error;
pub mod storage_error;
pub mod threshold_error;

pub use collaborator_error::CollaboratorError;
pub use config_error::ConfigError;
pub use detection_error::DetectionError;
pub use error_code::SentinelErrorCode;
pub use pipeline_error::{PipelineError, PipelineResult};
pub use reasoning_error::ReasoningError;
pub use storage_error::StorageError;
pub use threshold_error::ThresholdError;
