//! Daily metric snapshot capture.
//!
//! Aggregates the day's scored content into one global snapshot plus one per
//! watched brand and per known competitor. Items without a score are skipped;
//! the runtime scores them before capture.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, Utc};

use sentinel_core::constants::{
    BREAKING_INTENSITY, BREAKING_WINDOW_HOURS, CATCH_ALL_TOPIC, GEOPOLITICAL_TOPICS,
    HIGH_EMOTION_EMPATHY, NEGATIVE_EMOTIONS, REGULATORY_TOPICS,
};
use sentinel_core::types::{metrics, Channel, ContentItem, ContentScore, MetricSnapshot, Scope};

/// Inputs for one capture pass.
#[derive(Debug, Clone, Copy)]
pub struct CaptureInput<'a> {
    pub items: &'a [ContentItem],
    /// Aggregate market sentiment in [0, 1], when the provider answered.
    pub market_sentiment: Option<f64>,
    pub brands: &'a [String],
    pub competitors: &'a [String],
    pub now: DateTime<Utc>,
}

/// Build today's snapshots. The global snapshot is always first.
pub fn capture(input: CaptureInput<'_>) -> Vec<MetricSnapshot> {
    let today = input.now.date_naive();
    let scored: Vec<(&ContentItem, &ContentScore)> = input
        .items
        .iter()
        .filter(|item| item.published_at.date_naive() == today)
        .filter_map(|item| item.score.as_ref().map(|score| (item, score)))
        .collect();

    let mut snapshots = Vec::with_capacity(1 + input.brands.len() + input.competitors.len());

    let mut global = aggregate(Scope::Global, &scored, input.now);
    if let Some(sentiment) = input.market_sentiment {
        global.set(metrics::MARKET_SENTIMENT, sentiment);
    }
    add_global_metrics(&mut global, &scored, input.now);
    snapshots.push(global);

    let mut seen = BTreeSet::new();
    for brand in input.brands {
        if seen.insert(brand.to_lowercase()) {
            snapshots.push(scoped(Scope::brand(brand.clone()), brand, &scored, input.now));
        }
    }
    for competitor in input.competitors {
        if seen.insert(competitor.to_lowercase()) {
            snapshots.push(scoped(
                Scope::competitor(competitor.clone()),
                competitor,
                &scored,
                input.now,
            ));
        }
    }

    tracing::debug!(
        items = scored.len(),
        snapshots = snapshots.len(),
        "captured metric snapshots"
    );
    snapshots
}

fn scoped(
    scope: Scope,
    name: &str,
    scored: &[(&ContentItem, &ContentScore)],
    now: DateTime<Utc>,
) -> MetricSnapshot {
    let matching: Vec<(&ContentItem, &ContentScore)> = scored
        .iter()
        .filter(|(item, _)| item.mentions(name))
        .copied()
        .collect();
    let mut snapshot = aggregate(scope, &matching, now);
    snapshot.set(
        metrics::MENTION_COUNT_NEWS,
        snapshot.get_or_zero(metrics::VOLUME_NEWS),
    );
    snapshot.set(
        metrics::MENTION_COUNT_SOCIAL,
        snapshot.get_or_zero(metrics::VOLUME_SOCIAL),
    );
    snapshot
}

/// Metrics shared by every scope.
fn aggregate(
    scope: Scope,
    scored: &[(&ContentItem, &ContentScore)],
    now: DateTime<Utc>,
) -> MetricSnapshot {
    let mut snapshot = MetricSnapshot::new(scope, now.date_naive());
    let news: Vec<&ContentScore> = by_channel(scored, Channel::News);
    let social: Vec<&ContentScore> = by_channel(scored, Channel::Social);
    let all: Vec<&ContentScore> = scored.iter().map(|(_, s)| *s).collect();

    snapshot.set(metrics::VOLUME, all.len() as f64);
    snapshot.set(metrics::VOLUME_NEWS, news.len() as f64);
    snapshot.set(metrics::VOLUME_SOCIAL, social.len() as f64);

    if let Some(avg) = mean(all.iter().map(|s| s.empathy_score)) {
        snapshot.set(metrics::AVG_EMPATHY, avg);
    }
    if let Some(avg) = mean(news.iter().map(|s| s.empathy_score)) {
        snapshot.set(metrics::AVG_EMPATHY_NEWS, avg);
    }
    if let Some(avg) = mean(social.iter().map(|s| s.empathy_score)) {
        snapshot.set(metrics::AVG_EMPATHY_SOCIAL, avg);
    }
    if !news.is_empty() {
        snapshot.set(metrics::HIGH_EMOTION_RATIO_NEWS, high_emotion_ratio(&news));
    }
    if !social.is_empty() {
        snapshot.set(metrics::HIGH_EMOTION_RATIO_SOCIAL, high_emotion_ratio(&social));
    }
    if let Some(avg) = mean(all.iter().map(|s| s.intensity)) {
        snapshot.set(metrics::AVG_INTENSITY, avg);
    }
    if !all.is_empty() {
        let negative = all.iter().filter(|s| is_negative(s)).count();
        snapshot.set(
            metrics::NEGATIVE_EMOTION_SHARE,
            negative as f64 / all.len() as f64,
        );
    }

    let sources: BTreeSet<String> = scored
        .iter()
        .map(|(item, _)| item.source.to_lowercase())
        .collect();
    snapshot.set(metrics::SOURCE_COUNT, sources.len() as f64);
    snapshot
}

/// Global-only metrics: topics, regulatory and geopolitical coverage,
/// breaking sources.
fn add_global_metrics(
    snapshot: &mut MetricSnapshot,
    scored: &[(&ContentItem, &ContentScore)],
    now: DateTime<Utc>,
) {
    let news: Vec<&ContentScore> = by_channel(scored, Channel::News);

    if !news.is_empty() {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for score in &news {
            let topic = normalize_topic(&score.topic);
            if topic.is_empty() || topic == CATCH_ALL_TOPIC {
                continue;
            }
            *counts.entry(topic).or_default() += 1;
        }
        for (topic, count) in counts {
            snapshot.set(
                metrics::topic_share(&topic),
                count as f64 / news.len() as f64,
            );
        }
    }

    let regulatory = news
        .iter()
        .filter(|s| in_topic_set(&s.topic, REGULATORY_TOPICS))
        .count();
    snapshot.set(metrics::REGULATORY_VOLUME, regulatory as f64);

    let geopolitical = scored
        .iter()
        .map(|(_, s)| *s)
        .filter(|s| in_topic_set(&s.topic, GEOPOLITICAL_TOPICS))
        .map(|s| s.intensity);
    if let Some(avg) = mean(geopolitical) {
        snapshot.set(metrics::AVG_INTENSITY_GEOPOLITICAL, avg);
    }

    let window_start = now - Duration::hours(BREAKING_WINDOW_HOURS);
    let mut breaking: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (item, score) in scored {
        if item.published_at < window_start || score.intensity < BREAKING_INTENSITY {
            continue;
        }
        let topic = normalize_topic(&score.topic);
        if topic.is_empty() || topic == CATCH_ALL_TOPIC {
            continue;
        }
        breaking
            .entry(topic)
            .or_default()
            .insert(item.source.to_lowercase());
    }
    for (topic, sources) in breaking {
        snapshot.set(metrics::breaking_sources(&topic), sources.len() as f64);
    }
}

fn by_channel<'a>(
    scored: &[(&'a ContentItem, &'a ContentScore)],
    channel: Channel,
) -> Vec<&'a ContentScore> {
    scored
        .iter()
        .filter(|(item, _)| item.channel == channel)
        .map(|(_, s)| *s)
        .collect()
}

fn high_emotion_ratio(scores: &[&ContentScore]) -> f64 {
    let high = scores
        .iter()
        .filter(|s| s.empathy_score > HIGH_EMOTION_EMPATHY)
        .count();
    high as f64 / scores.len() as f64
}

fn is_negative(score: &ContentScore) -> bool {
    score
        .top_emotions
        .iter()
        .any(|e| NEGATIVE_EMOTIONS.contains(&e.to_lowercase().as_str()))
}

fn normalize_topic(topic: &str) -> String {
    topic.trim().to_lowercase()
}

fn in_topic_set(topic: &str, set: &[&str]) -> bool {
    let topic = normalize_topic(topic);
    set.iter().any(|t| *t == topic)
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}
