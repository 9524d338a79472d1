//! EventDispatcher: synchronous event dispatch with zero overhead when empty.

use std::sync::Arc;

use super::handler::SentinelEventHandler;
use super::types::*;

/// Synchronous event dispatcher wrapping a list of handlers.
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn SentinelEventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn register(&mut self, handler: Arc<dyn SentinelEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Emit an event to all registered handlers.
    /// A panicking handler does not prevent later handlers from running.
    fn emit<F: Fn(&dyn SentinelEventHandler)>(&self, f: F) {
        for handler in &self.handlers {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                f(handler.as_ref());
            }));
            if result.is_err() {
                tracing::warn!("event handler panicked");
            }
        }
    }

    // ---- Cycle ----
    pub fn emit_cycle_started(&self, event: &CycleStartedEvent) {
        self.emit(|h| h.on_cycle_started(event));
    }

    pub fn emit_cycle_completed(&self, event: &CycleCompletedEvent) {
        self.emit(|h| h.on_cycle_completed(event));
    }

    // ---- Alerts ----
    pub fn emit_alert_created(&self, event: &AlertCreatedEvent) {
        self.emit(|h| h.on_alert_created(event));
    }

    pub fn emit_alert_suppressed(&self, event: &AlertSuppressedEvent) {
        self.emit(|h| h.on_alert_suppressed(event));
    }

    // ---- Reasoning ----
    pub fn emit_chain_finished(&self, event: &ChainFinishedEvent) {
        self.emit(|h| h.on_chain_finished(event));
    }

    // ---- Correlation ----
    pub fn emit_situation_formed(&self, event: &SituationFormedEvent) {
        self.emit(|h| h.on_situation_formed(event));
    }

    // ---- Tuning ----
    pub fn emit_threshold_adjusted(&self, event: &ThresholdAdjustedEvent) {
        self.emit(|h| h.on_threshold_adjusted(event));
    }

    // ---- Errors ----
    pub fn emit_error(&self, event: &ErrorEvent) {
        self.emit(|h| h.on_error(event));
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
