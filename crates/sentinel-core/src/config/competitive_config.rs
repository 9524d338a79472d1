//! Competitive analysis configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CompetitiveConfig {
    /// Run competitive detectors. Default: true.
    pub enabled: Option<bool>,
    /// Competitor list cache TTL. Default: 24h.
    pub discovery_ttl_secs: Option<u64>,
    /// Competitors kept per brand. Default: 5.
    pub max_competitors: Option<usize>,
    /// Discovered competitors below this confidence are ignored. Default: 0.3.
    pub min_confidence: Option<f64>,
}

impl CompetitiveConfig {
    pub fn effective_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn effective_discovery_ttl_secs(&self) -> u64 {
        self.discovery_ttl_secs.unwrap_or(24 * 3600)
    }

    pub fn effective_max_competitors(&self) -> usize {
        self.max_competitors.unwrap_or(5)
    }

    pub fn effective_min_confidence(&self) -> f64 {
        self.min_confidence.unwrap_or(0.3)
    }
}
