//! VLDS scoring windows.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VldsConfig {
    /// Recent window for velocity, in days. Default: 1.
    pub recent_days: Option<u32>,
    /// Baseline window preceding the recent window, in days. Default: 7.
    pub baseline_days: Option<u32>,
    /// Window summed for density, in days. Default: 7.
    pub density_days: Option<u32>,
    /// Volume that saturates density. Default: 100.
    pub coverage_capacity: Option<f64>,
    /// Minimum daily volume counted as present for longevity. Default: 1.
    pub presence_floor: Option<f64>,
    /// Baseline days required before velocity is trusted. Default: 3.
    pub min_baseline_days: Option<u32>,
}

impl VldsConfig {
    pub fn effective_recent_days(&self) -> u32 {
        self.recent_days.unwrap_or(1)
    }

    pub fn effective_baseline_days(&self) -> u32 {
        self.baseline_days.unwrap_or(7)
    }

    pub fn effective_density_days(&self) -> u32 {
        self.density_days.unwrap_or(7)
    }

    pub fn effective_coverage_capacity(&self) -> f64 {
        self.coverage_capacity.unwrap_or(100.0)
    }

    pub fn effective_presence_floor(&self) -> f64 {
        self.presence_floor.unwrap_or(1.0)
    }

    pub fn effective_min_baseline_days(&self) -> u32 {
        self.min_baseline_days.unwrap_or(3)
    }
}
