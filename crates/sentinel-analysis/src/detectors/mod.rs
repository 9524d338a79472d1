//! Detector system: 21 detectors in four classes.
//!
//! Each detector implements [`Detector`] and is registered in the
//! [`DetectorRegistry`] keyed by its [`DetectorType`]. The registry decides
//! which classes apply to a scope and fans scopes out over rayon.
//!
//! [`DetectorType`]: sentinel_core::types::DetectorType

pub mod brand;
pub mod competitive;
pub mod context;
pub mod global;
pub mod predictive;
pub mod registry;
pub mod traits;

pub use context::{DetectionContext, DetectionSettings, ThresholdTable};
pub use registry::DetectorRegistry;
pub use traits::Detector;
