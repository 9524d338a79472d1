//! Inputs handed to every detector for one scope.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use sentinel_core::config::DetectionConfig;
use sentinel_core::types::{
    AlertThreshold, CompetitiveSnapshot, DetectorType, MetricSnapshot, Scope, VldsScore,
};

/// Current threshold value per detector. Missing entries fall back to the
/// compiled default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThresholdTable {
    values: BTreeMap<DetectorType, f64>,
}

impl ThresholdTable {
    pub fn from_thresholds(thresholds: &[AlertThreshold]) -> Self {
        Self {
            values: thresholds
                .iter()
                .map(|t| (t.detector_type, t.current_value))
                .collect(),
        }
    }

    pub fn get(&self, detector_type: DetectorType) -> f64 {
        self.values
            .get(&detector_type)
            .copied()
            .unwrap_or_else(|| detector_type.default_threshold())
    }

    pub fn set(&mut self, detector_type: DetectorType, value: f64) {
        self.values.insert(detector_type, value);
    }
}

/// Detector knobs that are not tunable thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionSettings {
    pub disabled: Vec<String>,
    pub topic_absence_days: u32,
    pub regulatory_min_items: u32,
    pub crisis_empathy_floor: f64,
    pub crisis_negative_floor: f64,
    pub predictive_lookback_days: u32,
    pub predictive_horizon_days: u32,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self::from_config(&DetectionConfig::default())
    }
}

impl DetectionSettings {
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self {
            disabled: config.disabled_detectors.clone(),
            topic_absence_days: config.effective_topic_absence_days(),
            regulatory_min_items: config.effective_regulatory_min_items(),
            crisis_empathy_floor: config.effective_crisis_empathy_floor(),
            crisis_negative_floor: config.effective_crisis_negative_floor(),
            predictive_lookback_days: config.effective_predictive_lookback_days(),
            predictive_horizon_days: config.effective_predictive_horizon_days(),
        }
    }

    pub fn is_enabled(&self, detector_type: DetectorType) -> bool {
        !self.disabled.iter().any(|d| d == detector_type.as_str())
    }
}

/// Everything a detector may read about one scope in one cycle.
#[derive(Debug, Clone)]
pub struct DetectionContext {
    pub scope: Scope,
    pub now: DateTime<Utc>,
    /// Freshly captured snapshot for today.
    pub today: MetricSnapshot,
    /// Stored snapshots for prior days, oldest first, excluding today.
    pub history: Vec<MetricSnapshot>,
    /// Today's VLDS score; `None` for scopes that are not scored.
    pub vlds: Option<VldsScore>,
    /// Yesterday's VLDS score.
    pub previous_vlds: Option<VldsScore>,
    /// Daily scores over the predictive lookback, oldest first.
    pub vlds_series: Vec<VldsScore>,
    pub competitive: Option<CompetitiveSnapshot>,
    pub previous_competitive: Option<CompetitiveSnapshot>,
    pub thresholds: ThresholdTable,
    pub settings: DetectionSettings,
}

impl DetectionContext {
    pub fn new(scope: Scope, now: DateTime<Utc>, today: MetricSnapshot) -> Self {
        Self {
            scope,
            now,
            today,
            history: Vec::new(),
            vlds: None,
            previous_vlds: None,
            vlds_series: Vec::new(),
            competitive: None,
            previous_competitive: None,
            thresholds: ThresholdTable::default(),
            settings: DetectionSettings::default(),
        }
    }

    pub fn with_history(mut self, mut history: Vec<MetricSnapshot>) -> Self {
        let today = self.today.date;
        history.retain(|s| s.scope == self.scope && s.date < today);
        history.sort_by_key(|s| s.date);
        self.history = history;
        self
    }

    pub fn with_vlds(mut self, vlds: VldsScore, previous: Option<VldsScore>, series: Vec<VldsScore>) -> Self {
        self.vlds = Some(vlds);
        self.previous_vlds = previous;
        self.vlds_series = series;
        self
    }

    pub fn with_competitive(
        mut self,
        current: CompetitiveSnapshot,
        previous: Option<CompetitiveSnapshot>,
    ) -> Self {
        self.competitive = Some(current);
        self.previous_competitive = previous;
        self
    }

    pub fn with_thresholds(mut self, thresholds: ThresholdTable) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_settings(mut self, settings: DetectionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn date(&self) -> NaiveDate {
        self.today.date
    }

    /// Most recent prior-day snapshot.
    pub fn previous(&self) -> Option<&MetricSnapshot> {
        self.history.last()
    }

    /// Prior-day snapshots within the last `days` days.
    pub fn recent_history(&self, days: u32) -> &[MetricSnapshot] {
        let cutoff = self.date() - Duration::days(days as i64);
        let start = self.history.partition_point(|s| s.date < cutoff);
        &self.history[start..]
    }

    /// Prior-day values of `metric`, oldest first. Days lacking it are skipped.
    pub fn prior_values(&self, metric: &str) -> Vec<f64> {
        self.history.iter().filter_map(|s| s.get(metric)).collect()
    }

    /// Mean of the prior-day values of `metric`.
    pub fn baseline(&self, metric: &str) -> Option<f64> {
        let values = self.prior_values(metric);
        (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Values of `metric` over the predictive lookback, today last.
    pub fn lookback_series(&self, metric: &str) -> Vec<f64> {
        let mut values: Vec<f64> = self
            .recent_history(self.settings.predictive_lookback_days)
            .iter()
            .filter_map(|s| s.get(metric))
            .collect();
        if let Some(v) = self.today.get(metric) {
            values.push(v);
        }
        values
    }

    /// Sum of `metric` over today and the prior `days - 1` days.
    pub fn window_sum(&self, metric: &str, days: u32) -> f64 {
        let prior: f64 = self
            .recent_history(days.saturating_sub(1))
            .iter()
            .map(|s| s.get_or_zero(metric))
            .sum();
        prior + self.today.get_or_zero(metric)
    }

    pub fn threshold(&self, detector_type: DetectorType) -> f64 {
        self.thresholds.get(detector_type)
    }
}
