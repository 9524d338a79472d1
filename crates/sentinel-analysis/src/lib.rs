//! Sentinel analysis: everything between raw scored content and a reviewed
//! alert.
//!
//! The deterministic layer (snapshot capture, VLDS scoring, trend fitting,
//! the detector registry, cooldown ledger, tuning policy and correlation) is
//! pure and synchronous. The reasoning layer drives a [`ReasoningService`]
//! through a bounded multi-step investigation on tokio.
//!
//! [`ReasoningService`]: sentinel_core::traits::ReasoningService

pub mod competitive;
pub mod cooldown;
pub mod correlation;
pub mod detectors;
pub mod reasoning;
pub mod snapshot;
pub mod trend;
pub mod tuning;
pub mod vlds;

pub use cooldown::MemoryCooldownLedger;
pub use detectors::{DetectionContext, Detector, DetectorRegistry, ThresholdTable};
pub use reasoning::{ChainContext, ChainOrchestrator, ChainPolicy};
pub use vlds::VldsPolicy;
