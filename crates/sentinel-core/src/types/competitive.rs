//! Brand watchlist and competitive snapshots.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::VldsScore;

/// A user's watched brand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BrandWatch {
    pub user: String,
    pub brand: String,
}

/// A discovered competitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub name: String,
    pub confidence: f64,
}

/// Brand vs competitor coverage on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitiveSnapshot {
    pub brand: String,
    pub date: NaiveDate,
    pub brand_mentions: u64,
    pub competitor_mentions: BTreeMap<String, u64>,
    /// Share of voice in percent, keyed by brand and competitor names.
    pub share_of_voice: BTreeMap<String, f64>,
    pub brand_vlds: Option<VldsScore>,
    pub competitor_vlds: BTreeMap<String, VldsScore>,
    /// Brand minus average competitor, per VLDS metric.
    pub gaps: BTreeMap<String, f64>,
}

impl CompetitiveSnapshot {
    pub fn brand_share(&self) -> f64 {
        self.share_of_voice.get(&self.brand).copied().unwrap_or(0.0)
    }

    pub fn has_competitors(&self) -> bool {
        !self.competitor_mentions.is_empty()
    }
}
