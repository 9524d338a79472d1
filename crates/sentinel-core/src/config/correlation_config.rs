//! Correlation engine configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CorrelationConfig {
    /// Run the correlation pass. Default: true.
    pub enabled: Option<bool>,
    /// How far back uncorrelated alerts are considered. Default: 3h.
    pub lookback_secs: Option<i64>,
    /// Pairs further apart than this never correlate. Default: 2h.
    pub proximity_secs: Option<i64>,
    /// Minimum pair score to join a group. Default: 3.
    pub min_score: Option<u32>,
    /// Member titles listed in a report title before "+N more". Default: 3.
    pub title_members: Option<usize>,
}

impl CorrelationConfig {
    pub fn effective_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn effective_lookback_secs(&self) -> i64 {
        self.lookback_secs.unwrap_or(3 * 3600)
    }

    pub fn effective_proximity_secs(&self) -> i64 {
        self.proximity_secs.unwrap_or(2 * 3600)
    }

    pub fn effective_min_score(&self) -> u32 {
        self.min_score.unwrap_or(3)
    }

    pub fn effective_title_members(&self) -> usize {
        self.title_members.unwrap_or(3)
    }
}
