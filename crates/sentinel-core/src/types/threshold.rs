//! Detector thresholds and their audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DetectorType;
use crate::constants::{THRESHOLD_LOWER_FACTOR, THRESHOLD_UPPER_FACTOR};

/// Tunable threshold for one detector type.
///
/// `lower_bound <= current_value <= upper_bound` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertThreshold {
    pub detector_type: DetectorType,
    pub default_value: f64,
    pub current_value: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub last_updated: DateTime<Utc>,
}

impl AlertThreshold {
    /// Seed a threshold from the detector's compiled default.
    pub fn seeded(detector_type: DetectorType, now: DateTime<Utc>) -> Self {
        let default_value = detector_type.default_threshold();
        Self {
            detector_type,
            default_value,
            current_value: default_value,
            lower_bound: default_value * THRESHOLD_LOWER_FACTOR,
            upper_bound: default_value * THRESHOLD_UPPER_FACTOR,
            last_updated: now,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower_bound && value <= self.upper_bound
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.lower_bound, self.upper_bound)
    }
}

/// Who changed a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentSource {
    Tuner,
    Admin,
}

impl AdjustmentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tuner => "tuner",
            Self::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tuner" => Some(Self::Tuner),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// One append-only audit row per threshold change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdAuditEntry {
    pub threshold_id: DetectorType,
    pub old_value: f64,
    pub new_value: f64,
    pub reason: String,
    pub source: AdjustmentSource,
    pub timestamp: DateTime<Utc>,
}
