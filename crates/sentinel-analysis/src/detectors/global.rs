//! Global detectors: mood, market divergence, intensity, topics, regulatory,
//! breaking news and geopolitical risk.

use chrono::Duration;
use sentinel_core::constants::CATCH_ALL_TOPIC;
use sentinel_core::types::{metrics, AlertDraft, DetectorType, Severity};

use super::context::DetectionContext;
use super::traits::Detector;

pub fn all() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(MoodShift),
        Box::new(MarketMoodDivergence),
        Box::new(IntensityCluster),
        Box::new(TopicEmergence),
        Box::new(RegulatoryPolicySpike),
        Box::new(BreakingSignal),
        Box::new(GeopoliticalRiskEscalation),
    ]
}

fn draft(ctx: &DetectionContext, detector_type: DetectorType, severity: Severity) -> AlertDraft {
    AlertDraft::new(detector_type, ctx.scope.clone(), severity, ctx.now)
}

// ─── Mood shift ─────────────────────────────────────────────────────────────

/// Day-over-day swing of channel empathy, in points. Needs yesterday's
/// snapshot; an older one is not a day-over-day comparison.
pub struct MoodShift;

impl Detector for MoodShift {
    fn detector_type(&self) -> DetectorType {
        DetectorType::MoodShift
    }

    fn required_metrics(&self) -> &'static [&'static str] {
        &[metrics::AVG_EMPATHY_NEWS, metrics::AVG_EMPATHY_SOCIAL]
    }

    fn evaluate(&self, ctx: &DetectionContext, threshold: f64) -> Option<AlertDraft> {
        let previous = ctx.previous().filter(|p| p.date == ctx.date() - Duration::days(1))?;
        let (channel, prev, curr, swing) = [
            ("news", metrics::AVG_EMPATHY_NEWS),
            ("social", metrics::AVG_EMPATHY_SOCIAL),
        ]
        .into_iter()
        .filter_map(|(channel, metric)| {
            let prev = previous.get(metric)? * 100.0;
            let curr = ctx.today.get(metric)? * 100.0;
            Some((channel, prev, curr, curr - prev))
        })
        .max_by(|a, b| a.3.abs().total_cmp(&b.3.abs()))?;

        if swing.abs() <= threshold {
            return None;
        }
        let severity = if swing.abs() > threshold * 25.0 / 15.0 {
            Severity::Critical
        } else {
            Severity::Warning
        };
        let direction = if swing > 0.0 { "surged" } else { "dropped" };
        Some(
            draft(ctx, self.detector_type(), severity)
                .titled(
                    format!("Mood {direction} {:.0}pts in {channel}", swing.abs()),
                    format!(
                        "Average {channel} empathy {direction} from {prev:.0} to {curr:.0} ({swing:+.0}pts day-over-day)."
                    ),
                )
                .metric("prev_score", prev)
                .metric("curr_score", curr)
                .metric("shift", swing),
        )
    }
}

// ─── Market / mood divergence ───────────────────────────────────────────────

pub struct MarketMoodDivergence;

impl Detector for MarketMoodDivergence {
    fn detector_type(&self) -> DetectorType {
        DetectorType::MarketMoodDivergence
    }

    fn required_metrics(&self) -> &'static [&'static str] {
        &[metrics::AVG_EMPATHY_SOCIAL, metrics::MARKET_SENTIMENT]
    }

    fn evaluate(&self, ctx: &DetectionContext, threshold: f64) -> Option<AlertDraft> {
        let social = ctx.today.get(metrics::AVG_EMPATHY_SOCIAL)? * 100.0;
        let market = ctx.today.get(metrics::MARKET_SENTIMENT)? * 100.0;
        let gap = (social - market).abs();
        if gap <= threshold {
            return None;
        }
        let severity = if gap > threshold * 1.6 {
            Severity::Critical
        } else {
            Severity::Warning
        };
        let (social_dir, market_dir) = if social > market {
            ("positive", "bearish")
        } else {
            ("negative", "bullish")
        };
        Some(
            draft(ctx, self.detector_type(), severity)
                .titled(
                    format!("Market-mood divergence: {gap:.0}pt gap"),
                    format!(
                        "Social mood ({social:.0}) and market sentiment ({market:.0}) diverge by {gap:.0} points. Social is {social_dir} while markets are {market_dir}."
                    ),
                )
                .metric("social_score", social)
                .metric("market_score", market)
                .metric("gap", gap),
        )
    }
}

// ─── Intensity cluster ──────────────────────────────────────────────────────

pub struct IntensityCluster;

impl Detector for IntensityCluster {
    fn detector_type(&self) -> DetectorType {
        DetectorType::IntensityCluster
    }

    fn required_metrics(&self) -> &'static [&'static str] {
        &[metrics::HIGH_EMOTION_RATIO_NEWS, metrics::HIGH_EMOTION_RATIO_SOCIAL]
    }

    fn evaluate(&self, ctx: &DetectionContext, threshold: f64) -> Option<AlertDraft> {
        let (channel, ratio) = [
            ("news", metrics::HIGH_EMOTION_RATIO_NEWS),
            ("social", metrics::HIGH_EMOTION_RATIO_SOCIAL),
        ]
        .into_iter()
        .filter_map(|(channel, metric)| ctx.today.get(metric).map(|r| (channel, r)))
        .max_by(|a, b| a.1.total_cmp(&b.1))?;

        if ratio <= threshold {
            return None;
        }
        let severity = if ratio > threshold * 1.5 {
            Severity::Critical
        } else {
            Severity::Warning
        };
        Some(
            draft(ctx, self.detector_type(), severity)
                .titled(
                    format!("High-emotion spike in {channel}: {:.0}% intense", ratio * 100.0),
                    format!(
                        "{:.0}% of today's {channel} items carry empathy scores above 0.7, an unusual cluster of emotionally charged content.",
                        ratio * 100.0
                    ),
                )
                .metric("ratio", ratio),
        )
    }
}

// ─── Topic emergence ────────────────────────────────────────────────────────

/// A topic taking a large share today that was absent from the prior days.
pub struct TopicEmergence;

impl Detector for TopicEmergence {
    fn detector_type(&self) -> DetectorType {
        DetectorType::TopicEmergence
    }

    fn required_metrics(&self) -> &'static [&'static str] {
        &[metrics::TOPIC_SHARE_PREFIX]
    }

    fn evaluate(&self, ctx: &DetectionContext, threshold: f64) -> Option<AlertDraft> {
        let prior = ctx.recent_history(ctx.settings.topic_absence_days);
        if prior.is_empty() {
            return None;
        }
        let (topic, share) = ctx
            .today
            .with_prefix(metrics::TOPIC_SHARE_PREFIX)
            .filter(|(topic, share)| *share > threshold && *topic != CATCH_ALL_TOPIC)
            .filter(|(topic, _)| {
                let key = metrics::topic_share(topic);
                prior
                    .iter()
                    .all(|s| s.get(&key).map_or(true, |v| v <= 0.0))
            })
            .max_by(|a, b| a.1.total_cmp(&b.1))?;

        Some(
            draft(ctx, self.detector_type(), Severity::Critical)
                .titled(
                    format!("Emerging topic: {topic}"),
                    format!(
                        "\"{topic}\" holds {:.0}% of today's coverage but was absent from the prior {} day(s).",
                        share * 100.0,
                        prior.len()
                    ),
                )
                .metric("share", share)
                .metric("prior_days_checked", prior.len() as f64),
        )
    }
}

// ─── Regulatory / policy spike ──────────────────────────────────────────────

pub struct RegulatoryPolicySpike;

impl Detector for RegulatoryPolicySpike {
    fn detector_type(&self) -> DetectorType {
        DetectorType::RegulatoryPolicySpike
    }

    fn required_metrics(&self) -> &'static [&'static str] {
        &[metrics::REGULATORY_VOLUME]
    }

    fn evaluate(&self, ctx: &DetectionContext, threshold: f64) -> Option<AlertDraft> {
        let today = ctx.today.get(metrics::REGULATORY_VOLUME)?;
        let baseline = ctx.baseline(metrics::REGULATORY_VOLUME)?;
        if today < ctx.settings.regulatory_min_items as f64 {
            return None;
        }
        let multiple = today / baseline.max(1.0);
        if multiple < threshold {
            return None;
        }
        let severity = if multiple >= threshold * 2.0 {
            Severity::Critical
        } else {
            Severity::Warning
        };
        Some(
            draft(ctx, self.detector_type(), severity)
                .titled(
                    format!("Regulatory coverage spike: {multiple:.1}x"),
                    format!(
                        "{today:.0} regulatory and policy items today against a baseline of {baseline:.1}/day."
                    ),
                )
                .metric("today", today)
                .metric("baseline", baseline)
                .metric("multiple", multiple),
        )
    }
}

// ─── Breaking signal ────────────────────────────────────────────────────────

/// Several independent outlets publishing high-intensity items on one topic.
pub struct BreakingSignal;

impl Detector for BreakingSignal {
    fn detector_type(&self) -> DetectorType {
        DetectorType::BreakingSignal
    }

    fn required_metrics(&self) -> &'static [&'static str] {
        &[metrics::BREAKING_SOURCES_PREFIX]
    }

    fn evaluate(&self, ctx: &DetectionContext, threshold: f64) -> Option<AlertDraft> {
        let (topic, sources) = ctx
            .today
            .with_prefix(metrics::BREAKING_SOURCES_PREFIX)
            .max_by(|a, b| a.1.total_cmp(&b.1))?;
        if sources < threshold {
            return None;
        }
        Some(
            draft(ctx, self.detector_type(), Severity::Critical)
                .titled(
                    format!("Breaking: {topic}"),
                    format!(
                        "{sources:.0} independent sources published high-intensity coverage of {topic} in the last hours."
                    ),
                )
                .metric("sources", sources),
        )
    }
}

// ─── Geopolitical risk ──────────────────────────────────────────────────────

pub struct GeopoliticalRiskEscalation;

impl Detector for GeopoliticalRiskEscalation {
    fn detector_type(&self) -> DetectorType {
        DetectorType::GeopoliticalRiskEscalation
    }

    fn required_metrics(&self) -> &'static [&'static str] {
        &[metrics::AVG_INTENSITY_GEOPOLITICAL]
    }

    fn evaluate(&self, ctx: &DetectionContext, threshold: f64) -> Option<AlertDraft> {
        let today = ctx.today.get(metrics::AVG_INTENSITY_GEOPOLITICAL)?;
        let prior = ctx.prior_values(metrics::AVG_INTENSITY_GEOPOLITICAL);
        let [.., before, yesterday] = prior.as_slice() else {
            return None;
        };
        let (before, yesterday) = (*before, *yesterday);
        let rising = yesterday > before && today > yesterday;
        let acceleration = (today - yesterday) - (yesterday - before);
        if today < threshold || !rising || acceleration < 0.0 {
            return None;
        }
        let severity = if today >= threshold * 4.0 / 3.0 {
            Severity::Critical
        } else {
            Severity::Warning
        };
        Some(
            draft(ctx, self.detector_type(), severity)
                .titled(
                    format!("Geopolitical risk escalating: intensity {today:.1}"),
                    format!(
                        "Geopolitical coverage intensity rose from {before:.1} to {yesterday:.1} to {today:.1} over three days."
                    ),
                )
                .metric("intensity", today)
                .metric("acceleration", acceleration),
        )
    }
}
