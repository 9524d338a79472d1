//! Configuration system for Sentinel.
//! TOML-based, 4-layer resolution: CLI > env > project > user > defaults.

pub mod competitive_config;
pub mod cooldown_config;
pub mod correlation_config;
pub mod detection_config;
pub mod reasoning_config;
pub mod sentinel_config;
pub mod storage_config;
pub mod tuning_config;
pub mod vlds_config;

pub use competitive_config::CompetitiveConfig;
pub use cooldown_config::{CooldownBackend, CooldownConfig};
pub use correlation_config::CorrelationConfig;
pub use detection_config::DetectionConfig;
pub use reasoning_config::{ConfidencePolicy, ReasoningConfig};
pub use sentinel_config::{CliOverrides, SentinelConfig};
pub use storage_config::StorageConfig;
pub use tuning_config::TuningConfig;
pub use vlds_config::VldsConfig;
