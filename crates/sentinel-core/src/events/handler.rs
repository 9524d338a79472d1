//! SentinelEventHandler trait, all methods with no-op defaults.

use super::types::*;

/// Trait for handling Sentinel events.
///
/// Handlers override only what they care about. `Send + Sync` so one handler
/// can observe scopes evaluated on several threads.
pub trait SentinelEventHandler: Send + Sync {
    // ---- Cycle ----
    fn on_cycle_started(&self, _event: &CycleStartedEvent) {}
    fn on_cycle_completed(&self, _event: &CycleCompletedEvent) {}

    // ---- Alerts ----
    fn on_alert_created(&self, _event: &AlertCreatedEvent) {}
    fn on_alert_suppressed(&self, _event: &AlertSuppressedEvent) {}

    // ---- Reasoning ----
    fn on_chain_finished(&self, _event: &ChainFinishedEvent) {}

    // ---- Correlation ----
    fn on_situation_formed(&self, _event: &SituationFormedEvent) {}

    // ---- Tuning ----
    fn on_threshold_adjusted(&self, _event: &ThresholdAdjustedEvent) {}

    // ---- Errors ----
    fn on_error(&self, _event: &ErrorEvent) {}
}
