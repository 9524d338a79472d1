//! The detector contract.

use sentinel_core::types::{AlertDraft, DetectorClass, DetectorType};

use super::context::DetectionContext;

/// One anomaly rule.
///
/// `evaluate` is pure: it reads the context and the detector's current
/// threshold and returns at most one draft. Missing inputs are "no signal".
pub trait Detector: Send + Sync {
    fn detector_type(&self) -> DetectorType;

    fn class(&self) -> DetectorClass {
        self.detector_type().class()
    }

    /// Snapshot metrics the rule reads, for documentation and diagnostics.
    fn required_metrics(&self) -> &'static [&'static str];

    fn evaluate(&self, ctx: &DetectionContext, threshold: f64) -> Option<AlertDraft>;
}
