//! Brand versus competitor comparison for one day.
//!
//! Share of voice is each name's percentage of the combined mention count.
//! Gaps are the brand's VLDS components minus the competitor average, over
//! scores that are not cold starts.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use sentinel_core::types::{metrics, CompetitiveSnapshot, MetricSnapshot, VldsScore};

/// One side of the comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Coverage {
    pub name: String,
    pub mentions: u64,
    pub vlds: VldsScore,
}

impl Coverage {
    /// Mentions are read from the day's `volume` metric.
    pub fn from_snapshot(name: impl Into<String>, today: &MetricSnapshot, vlds: VldsScore) -> Self {
        Self {
            name: name.into(),
            mentions: today.get_or_zero(metrics::VOLUME).max(0.0).round() as u64,
            vlds,
        }
    }
}

pub fn build_snapshot(date: NaiveDate, brand: Coverage, competitors: Vec<Coverage>) -> CompetitiveSnapshot {
    let total: u64 = brand.mentions + competitors.iter().map(|c| c.mentions).sum::<u64>();
    let share = |mentions: u64| -> f64 {
        if total == 0 {
            0.0
        } else {
            round_to(mentions as f64 / total as f64 * 100.0, 1)
        }
    };

    let mut share_of_voice = BTreeMap::new();
    share_of_voice.insert(brand.name.clone(), share(brand.mentions));
    let mut competitor_mentions = BTreeMap::new();
    let mut competitor_vlds = BTreeMap::new();
    for competitor in competitors {
        share_of_voice.insert(competitor.name.clone(), share(competitor.mentions));
        competitor_mentions.insert(competitor.name.clone(), competitor.mentions);
        competitor_vlds.insert(competitor.name, competitor.vlds);
    }

    let gaps = gaps(&brand.vlds, competitor_vlds.values());
    CompetitiveSnapshot {
        brand: brand.name,
        date,
        brand_mentions: brand.mentions,
        competitor_mentions,
        share_of_voice,
        brand_vlds: Some(brand.vlds),
        competitor_vlds,
        gaps,
    }
}

fn gaps<'a>(brand: &VldsScore, competitors: impl Iterator<Item = &'a VldsScore>) -> BTreeMap<String, f64> {
    let mut gaps = BTreeMap::new();
    let warm: Vec<&VldsScore> = competitors.filter(|v| !v.cold_start).collect();
    if brand.cold_start || warm.is_empty() {
        return gaps;
    }
    let components: [(&str, fn(&VldsScore) -> f64); 4] = [
        ("velocity", |v| v.velocity),
        ("longevity", |v| v.longevity as f64),
        ("density", |v| v.density),
        ("scarcity", |v| v.scarcity),
    ];
    for (name, get) in components {
        let average = warm.iter().map(|v| get(v)).sum::<f64>() / warm.len() as f64;
        gaps.insert(format!("{name}_gap"), round_to(get(brand) - average, 3));
    }
    gaps
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
