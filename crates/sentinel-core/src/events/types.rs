//! Event payload types.

use crate::types::{ChainStatus, DetectorType, Scope, Severity};

/// Payload for `on_cycle_started`.
#[derive(Debug, Clone)]
pub struct CycleStartedEvent {
    pub run_id: i64,
}

/// Payload for `on_cycle_completed`.
#[derive(Debug, Clone)]
pub struct CycleCompletedEvent {
    pub run_id: i64,
    pub alerts_created: usize,
    pub alerts_suppressed: usize,
    pub situations_formed: usize,
    pub thresholds_adjusted: usize,
    pub duration_ms: u64,
}

/// Payload for `on_alert_created`.
#[derive(Debug, Clone)]
pub struct AlertCreatedEvent {
    pub alert_id: String,
    pub detector_type: DetectorType,
    pub scope: Scope,
    pub severity: Severity,
    pub promoted: bool,
}

/// Payload for `on_alert_suppressed`.
#[derive(Debug, Clone)]
pub struct AlertSuppressedEvent {
    pub cooldown_key: String,
    pub held_by: String,
}

/// Payload for `on_chain_finished`.
#[derive(Debug, Clone)]
pub struct ChainFinishedEvent {
    pub alert_id: String,
    pub status: ChainStatus,
    pub steps_completed: usize,
    pub confidence: Option<u8>,
}

/// Payload for `on_situation_formed`.
#[derive(Debug, Clone)]
pub struct SituationFormedEvent {
    pub situation_id: String,
    pub member_count: usize,
}

/// Payload for `on_threshold_adjusted`.
#[derive(Debug, Clone)]
pub struct ThresholdAdjustedEvent {
    pub detector_type: DetectorType,
    pub old_value: f64,
    pub new_value: f64,
    pub reason: String,
}

/// Payload for `on_error`.
#[derive(Debug, Clone)]
pub struct ErrorEvent {
    pub message: String,
    pub error_code: String,
}
