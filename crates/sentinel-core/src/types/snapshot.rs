//! Daily metric snapshots per scope.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Scope;

/// Well-known metric names.
pub mod metrics {
    pub const VOLUME: &str = "volume";
    pub const VOLUME_NEWS: &str = "volume_news";
    pub const VOLUME_SOCIAL: &str = "volume_social";
    pub const MENTION_COUNT_NEWS: &str = "mention_count_news";
    pub const MENTION_COUNT_SOCIAL: &str = "mention_count_social";
    pub const AVG_EMPATHY: &str = "avg_empathy";
    pub const AVG_EMPATHY_NEWS: &str = "avg_empathy_news";
    pub const AVG_EMPATHY_SOCIAL: &str = "avg_empathy_social";
    pub const HIGH_EMOTION_RATIO_NEWS: &str = "high_emotion_ratio_news";
    pub const HIGH_EMOTION_RATIO_SOCIAL: &str = "high_emotion_ratio_social";
    pub const AVG_INTENSITY: &str = "avg_intensity";
    pub const NEGATIVE_EMOTION_SHARE: &str = "negative_emotion_share";
    pub const MARKET_SENTIMENT: &str = "market_sentiment";
    pub const REGULATORY_VOLUME: &str = "regulatory_volume";
    pub const AVG_INTENSITY_GEOPOLITICAL: &str = "avg_intensity_geopolitical";
    pub const SOURCE_COUNT: &str = "source_count";

    /// Prefix for per-topic share of today's news coverage.
    pub const TOPIC_SHARE_PREFIX: &str = "topic_share:";
    /// Prefix for per-topic count of distinct sources carrying high-intensity items.
    pub const BREAKING_SOURCES_PREFIX: &str = "breaking_sources:";

    pub fn topic_share(topic: &str) -> String {
        format!("{TOPIC_SHARE_PREFIX}{topic}")
    }

    pub fn breaking_sources(topic: &str) -> String {
        format!("{BREAKING_SOURCES_PREFIX}{topic}")
    }
}

/// One day of metrics for one scope. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub scope: Scope,
    pub date: NaiveDate,
    pub metrics: BTreeMap<String, f64>,
}

impl MetricSnapshot {
    pub fn new(scope: Scope, date: NaiveDate) -> Self {
        Self {
            scope,
            date,
            metrics: BTreeMap::new(),
        }
    }

    pub fn with_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set(name, value);
        self
    }

    /// Record a metric. Non-finite values are dropped.
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        if value.is_finite() {
            self.metrics.insert(name.into(), value);
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied().filter(|v| v.is_finite())
    }

    /// Metric value or 0.0 when absent.
    pub fn get_or_zero(&self, name: &str) -> f64 {
        self.get(name).unwrap_or(0.0)
    }

    /// Iterate `(suffix, value)` for every metric whose name starts with `prefix`.
    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        self.metrics
            .range(prefix.to_string()..)
            .take_while(move |(k, _)| k.starts_with(prefix))
            .map(move |(k, v)| (&k[prefix.len()..], *v))
    }
}
