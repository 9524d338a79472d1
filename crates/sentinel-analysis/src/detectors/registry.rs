//! Detector registry: a lookup table keyed by detector type.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use rayon::prelude::*;

use sentinel_core::errors::{DetectionError, SentinelErrorCode};
use sentinel_core::types::{AlertDraft, DetectorClass, DetectorType, Scope};

use super::context::DetectionContext;
use super::traits::Detector;
use super::{brand, competitive, global, predictive};

pub struct DetectorRegistry {
    detectors: BTreeMap<DetectorType, Box<dyn Detector>>,
}

impl DetectorRegistry {
    pub fn empty() -> Self {
        Self {
            detectors: BTreeMap::new(),
        }
    }

    /// All 21 built-in detectors.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        for detector in global::all()
            .into_iter()
            .chain(brand::all())
            .chain(competitive::all())
            .chain(predictive::all())
        {
            registry.register(detector);
        }
        registry
    }

    /// Add or replace the detector for its type.
    pub fn register(&mut self, detector: Box<dyn Detector>) {
        self.detectors.insert(detector.detector_type(), detector);
    }

    pub fn get(&self, detector_type: DetectorType) -> Option<&dyn Detector> {
        self.detectors.get(&detector_type).map(|d| d.as_ref())
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    pub fn count_by_class(&self, class: DetectorClass) -> usize {
        self.detectors.values().filter(|d| d.class() == class).count()
    }

    /// Evaluate every applicable, enabled detector against one scope.
    pub fn evaluate(&self, ctx: &DetectionContext) -> Vec<AlertDraft> {
        let mut drafts = Vec::new();
        for detector in self.detectors.values() {
            let detector_type = detector.detector_type();
            if !applies(detector.class(), ctx) || !ctx.settings.is_enabled(detector_type) {
                continue;
            }
            let threshold = ctx.threshold(detector_type);
            match catch_unwind(AssertUnwindSafe(|| detector.evaluate(ctx, threshold))) {
                Ok(Some(draft)) => {
                    tracing::debug!(
                        detector = detector_type.as_str(),
                        scope = %ctx.scope,
                        severity = draft.severity.as_str(),
                        "detector fired"
                    );
                    drafts.push(draft);
                }
                Ok(None) => {}
                Err(payload) => {
                    let message = payload
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| payload.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    let err = DetectionError::DetectorPanic {
                        detector: detector_type.as_str().to_string(),
                        message,
                    };
                    tracing::error!(scope = %ctx.scope, error = %err.coded_string(), "detector panicked");
                }
            }
        }
        drafts
    }

    /// Evaluate many scopes, in parallel when `parallel` is set. Drafts are
    /// returned grouped in the order of `contexts`.
    pub fn evaluate_all(&self, contexts: &[DetectionContext], parallel: bool) -> Vec<AlertDraft> {
        if parallel {
            contexts
                .par_iter()
                .map(|ctx| self.evaluate(ctx))
                .collect::<Vec<_>>()
                .into_iter()
                .flatten()
                .collect()
        } else {
            contexts.iter().flat_map(|ctx| self.evaluate(ctx)).collect()
        }
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Which detector classes run against which scope.
fn applies(class: DetectorClass, ctx: &DetectionContext) -> bool {
    match (&ctx.scope, class) {
        (Scope::Global, DetectorClass::Global | DetectorClass::Predictive) => true,
        (Scope::Brand(_), DetectorClass::Brand | DetectorClass::Predictive) => true,
        (Scope::Brand(_), DetectorClass::Competitive) => ctx
            .competitive
            .as_ref()
            .is_some_and(|c| c.has_competitors()),
        _ => false,
    }
}
