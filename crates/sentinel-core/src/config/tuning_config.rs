//! Adaptive threshold tuning configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TuningConfig {
    /// Run the tuner at the end of each cycle. Default: true.
    pub enabled: Option<bool>,
    /// Feedback events required per detector type. Default: 5.
    pub min_feedback_samples: Option<u64>,
    /// Noise ratio above which a threshold is raised. Default: 0.5.
    pub noise_high: Option<f64>,
    /// Value ratio above which a threshold is lowered. Default: 0.6.
    pub value_high: Option<f64>,
    /// Largest relative change per pass. Default: 0.10.
    pub max_step: Option<f64>,
}

impl TuningConfig {
    pub fn effective_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn effective_min_feedback_samples(&self) -> u64 {
        self.min_feedback_samples.unwrap_or(5)
    }

    pub fn effective_noise_high(&self) -> f64 {
        self.noise_high.unwrap_or(0.5)
    }

    pub fn effective_value_high(&self) -> f64 {
        self.value_high.unwrap_or(0.6)
    }

    pub fn effective_max_step(&self) -> f64 {
        self.max_step.unwrap_or(0.10)
    }
}
