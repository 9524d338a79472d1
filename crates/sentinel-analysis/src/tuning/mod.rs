//! Adaptive threshold tuning policy.
//!
//! Pure: turns per-detector feedback tallies into bounded threshold
//! decisions. Applying them (one immediate transaction with an audit row per
//! change, under the tuning mutex) is the runtime's job.

use std::collections::BTreeMap;

use sentinel_core::config::TuningConfig;
use sentinel_core::types::{AlertThreshold, DetectorType, FeedbackTally};

pub const REASON_INSUFFICIENT: &str = "insufficient feedback";
pub const REASON_NOISY: &str = "high dismissal rate";
pub const REASON_VALUABLE: &str = "high engagement rate";
pub const REASON_BALANCED: &str = "feedback within target range";
pub const REASON_AT_BOUND: &str = "already at bound";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TuningPolicy {
    pub min_samples: u64,
    pub noise_high: f64,
    pub value_high: f64,
    /// Fractional step per pass, e.g. 0.10 for 10 %.
    pub max_step: f64,
}

impl Default for TuningPolicy {
    fn default() -> Self {
        Self::from_config(&TuningConfig::default())
    }
}

impl TuningPolicy {
    pub fn from_config(config: &TuningConfig) -> Self {
        Self {
            min_samples: config.effective_min_feedback_samples(),
            noise_high: config.effective_noise_high(),
            value_high: config.effective_value_high(),
            max_step: config.effective_max_step(),
        }
    }
}

/// Outcome of tuning one detector.
#[derive(Debug, Clone, PartialEq)]
pub struct TuningDecision {
    pub detector_type: DetectorType,
    pub old_value: f64,
    pub new_value: f64,
    pub reason: &'static str,
    pub tally: FeedbackTally,
}

impl TuningDecision {
    pub fn is_change(&self) -> bool {
        self.new_value != self.old_value
    }
}

/// One decision per detector that received feedback in the window.
pub fn tune(
    thresholds: &[AlertThreshold],
    feedback: &BTreeMap<DetectorType, FeedbackTally>,
    policy: &TuningPolicy,
) -> Vec<TuningDecision> {
    let mut decisions = Vec::new();
    for threshold in thresholds {
        let Some(tally) = feedback.get(&threshold.detector_type) else {
            continue;
        };
        let decision = decide(threshold, *tally, policy);
        if decision.is_change() {
            tracing::info!(
                detector = decision.detector_type.as_str(),
                old_value = decision.old_value,
                new_value = decision.new_value,
                reason = decision.reason,
                "threshold adjustment proposed"
            );
        } else {
            tracing::debug!(
                detector = decision.detector_type.as_str(),
                samples = tally.total(),
                reason = decision.reason,
                "threshold unchanged"
            );
        }
        decisions.push(decision);
    }
    decisions
}

fn decide(threshold: &AlertThreshold, tally: FeedbackTally, policy: &TuningPolicy) -> TuningDecision {
    let old_value = threshold.current_value;
    let unchanged = |reason| TuningDecision {
        detector_type: threshold.detector_type,
        old_value,
        new_value: old_value,
        reason,
        tally,
    };

    if tally.total() < policy.min_samples {
        return unchanged(REASON_INSUFFICIENT);
    }
    let (target, reason) = if tally.noise_ratio() > policy.noise_high {
        (old_value * (1.0 + policy.max_step), REASON_NOISY)
    } else if tally.value_ratio() > policy.value_high {
        (old_value * (1.0 - policy.max_step), REASON_VALUABLE)
    } else {
        return unchanged(REASON_BALANCED);
    };

    let new_value = threshold.clamp(target);
    if new_value == old_value {
        return unchanged(REASON_AT_BOUND);
    }
    TuningDecision {
        detector_type: threshold.detector_type,
        old_value,
        new_value,
        reason,
        tally,
    }
}
