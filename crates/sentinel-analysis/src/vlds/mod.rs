//! VLDS scorer: velocity, longevity, density, scarcity.
//!
//! All four components are derived from the daily `volume` metric of a
//! scope's snapshot history. Missing days count as zero volume.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use sentinel_core::config::VldsConfig;
use sentinel_core::types::{metrics, MetricSnapshot, Scope, VldsScore};

/// Window sizes and normalization constants for VLDS scoring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VldsPolicy {
    pub recent_days: u32,
    pub baseline_days: u32,
    pub density_days: u32,
    pub coverage_capacity: f64,
    pub presence_floor: f64,
    pub min_baseline_days: u32,
}

impl Default for VldsPolicy {
    fn default() -> Self {
        Self::from_config(&VldsConfig::default())
    }
}

impl VldsPolicy {
    pub fn from_config(config: &VldsConfig) -> Self {
        Self {
            recent_days: config.effective_recent_days().max(1),
            baseline_days: config.effective_baseline_days().max(1),
            density_days: config.effective_density_days().max(1),
            coverage_capacity: config.effective_coverage_capacity(),
            presence_floor: config.effective_presence_floor(),
            min_baseline_days: config.effective_min_baseline_days(),
        }
    }

    /// Days of history `score` reads, counting `date` itself.
    pub fn history_span(&self) -> u32 {
        (self.recent_days + self.baseline_days).max(self.density_days)
    }
}

/// Score `scope` on `date`. `history` may contain snapshots of any scope and
/// any date; only matching ones on or before `date` are used.
pub fn score(
    policy: &VldsPolicy,
    scope: &Scope,
    date: NaiveDate,
    history: &[MetricSnapshot],
) -> VldsScore {
    let volumes = volume_by_day(scope, date, history);
    score_volumes(policy, scope, date, &volumes)
}

/// One score per day for the `days` days ending at `date`, oldest first.
/// Days without a snapshot are skipped.
pub fn score_series(
    policy: &VldsPolicy,
    scope: &Scope,
    date: NaiveDate,
    days: u32,
    history: &[MetricSnapshot],
) -> Vec<VldsScore> {
    let volumes = volume_by_day(scope, date, history);
    (0..days)
        .rev()
        .map(|offset| date - Duration::days(offset as i64))
        .filter(|day| volumes.contains_key(day))
        .map(|day| score_volumes(policy, scope, day, &volumes))
        .collect()
}

fn volume_by_day(scope: &Scope, date: NaiveDate, history: &[MetricSnapshot]) -> BTreeMap<NaiveDate, f64> {
    history
        .iter()
        .filter(|s| &s.scope == scope && s.date <= date)
        .map(|s| (s.date, s.get_or_zero(metrics::VOLUME)))
        .collect()
}

fn score_volumes(
    policy: &VldsPolicy,
    scope: &Scope,
    date: NaiveDate,
    volumes: &BTreeMap<NaiveDate, f64>,
) -> VldsScore {
    let recent_start = date - Duration::days(policy.recent_days as i64 - 1);
    let baseline_start = recent_start - Duration::days(policy.baseline_days as i64);
    let density_start = date - Duration::days(policy.density_days as i64 - 1);

    let window_sum = |from: NaiveDate, to: NaiveDate| -> f64 {
        volumes.range(from..=to).map(|(_, v)| v).sum()
    };

    let recent = window_sum(recent_start, date) / policy.recent_days as f64;
    let baseline_end = recent_start - Duration::days(1);
    let baseline_present = volumes.range(baseline_start..=baseline_end).count() as u32;
    let baseline = window_sum(baseline_start, baseline_end) / policy.baseline_days as f64;

    let cold_start = baseline_present < policy.min_baseline_days;
    let velocity = if cold_start {
        1.0
    } else if baseline > 0.0 {
        recent / baseline
    } else if recent > 0.0 {
        recent
    } else {
        1.0
    };

    let mut longevity = 0u32;
    let mut day = date;
    while let Some(volume) = volumes.get(&day) {
        if *volume < policy.presence_floor {
            break;
        }
        longevity += 1;
        day -= Duration::days(1);
    }

    let density = if policy.coverage_capacity > 0.0 {
        (window_sum(density_start, date) / policy.coverage_capacity).min(1.0)
    } else {
        1.0
    };
    let scarcity = (1.0 - density).clamp(0.0, 1.0);

    VldsScore {
        scope: scope.clone(),
        date,
        velocity,
        longevity,
        density,
        scarcity,
        cold_start,
    }
}
