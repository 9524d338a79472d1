//! Detector evaluation configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the detector registry.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DetectionConfig {
    /// Detector types to skip entirely, by snake_case name.
    #[serde(default)]
    pub disabled_detectors: Vec<String>,
    /// Days of snapshot history loaded per scope. Default: 14.
    pub history_days: Option<u32>,
    /// Prior days a topic must be absent for topic emergence. Default: 3.
    pub topic_absence_days: Option<u32>,
    /// Minimum regulatory items before a spike counts. Default: 5.
    pub regulatory_min_items: Option<u32>,
    /// Empathy ceiling for brand crisis. Default: 0.35.
    pub crisis_empathy_floor: Option<f64>,
    /// Negative emotion share above which a brand is in crisis. Default: 0.5.
    pub crisis_negative_floor: Option<f64>,
    /// Lookback for predictive fits, in days. Default: 7.
    pub predictive_lookback_days: Option<u32>,
    /// Horizon for threshold-approach forecasts, in days. Default: 7.
    pub predictive_horizon_days: Option<u32>,
    /// Evaluate scopes in parallel with rayon. Default: true.
    pub parallel: Option<bool>,
}

impl DetectionConfig {
    pub fn effective_history_days(&self) -> u32 {
        self.history_days.unwrap_or(14)
    }

    pub fn effective_topic_absence_days(&self) -> u32 {
        self.topic_absence_days.unwrap_or(3)
    }

    pub fn effective_regulatory_min_items(&self) -> u32 {
        self.regulatory_min_items.unwrap_or(5)
    }

    pub fn effective_crisis_empathy_floor(&self) -> f64 {
        self.crisis_empathy_floor.unwrap_or(0.35)
    }

    pub fn effective_crisis_negative_floor(&self) -> f64 {
        self.crisis_negative_floor.unwrap_or(0.5)
    }

    pub fn effective_predictive_lookback_days(&self) -> u32 {
        self.predictive_lookback_days.unwrap_or(7)
    }

    pub fn effective_predictive_horizon_days(&self) -> u32 {
        self.predictive_horizon_days.unwrap_or(7)
    }

    pub fn effective_parallel(&self) -> bool {
        self.parallel.unwrap_or(true)
    }

    /// Whether a detector (by snake_case name) is enabled.
    pub fn is_enabled(&self, detector: &str) -> bool {
        !self.disabled_detectors.iter().any(|d| d == detector)
    }
}
