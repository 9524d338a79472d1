//! sentinel-core: shared foundation for the Sentinel signal engine.
//!
//! Holds the data model, configuration, error enums, event dispatch,
//! tracing setup, and the traits through which external collaborators
//! (content feeds, scorers, market data, competitor discovery,
//! notification delivery, reasoning service) plug into the engine.

pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod tracing;
pub mod traits;
pub mod types;

pub use config::SentinelConfig;
pub use errors::{PipelineError, PipelineResult, SentinelErrorCode};
