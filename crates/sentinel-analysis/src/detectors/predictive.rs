//! Predictive detectors: threshold approach, momentum and compound signals.
//!
//! Each tracks a handful of metrics over the predictive lookback and compares
//! them with the current threshold of the reactive detector they feed.
//! Drafts carry severity `predictive` unless auto-promoted.

use sentinel_core::constants::{PROMOTION_COMPOUND_SCORE, PROMOTION_FIT_QUALITY};
use sentinel_core::types::{metrics, AlertDraft, DetectorType, Scope, Severity};

use crate::trend::{self, Direction, MIN_POINTS};

use super::context::DetectionContext;
use super::traits::Detector;

/// Lower edge of the "approaching" band, as a fraction of the threshold.
const APPROACH_BAND_LOW: f64 = 0.8;

pub fn all() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(PredictiveThresholdApproach),
        Box::new(PredictiveMomentum),
        Box::new(PredictiveCompoundSignal),
    ]
}

/// A metric series watched for its approach to a reactive threshold.
#[derive(Debug, Clone)]
pub struct TrackedSeries {
    pub metric: &'static str,
    pub target: DetectorType,
    pub values: Vec<f64>,
}

/// The tracked series for the context's scope, each with at least
/// [`MIN_POINTS`] values.
pub fn tracked_series(ctx: &DetectionContext) -> Vec<TrackedSeries> {
    let series = match ctx.scope {
        Scope::Global => vec![
            TrackedSeries {
                metric: metrics::HIGH_EMOTION_RATIO_NEWS,
                target: DetectorType::IntensityCluster,
                values: ctx.lookback_series(metrics::HIGH_EMOTION_RATIO_NEWS),
            },
            TrackedSeries {
                metric: metrics::HIGH_EMOTION_RATIO_SOCIAL,
                target: DetectorType::IntensityCluster,
                values: ctx.lookback_series(metrics::HIGH_EMOTION_RATIO_SOCIAL),
            },
            TrackedSeries {
                metric: metrics::AVG_INTENSITY_GEOPOLITICAL,
                target: DetectorType::GeopoliticalRiskEscalation,
                values: ctx.lookback_series(metrics::AVG_INTENSITY_GEOPOLITICAL),
            },
        ],
        Scope::Brand(_) => {
            let warm: Vec<_> = ctx.vlds_series.iter().filter(|v| !v.cold_start).collect();
            vec![
                TrackedSeries {
                    metric: "velocity",
                    target: DetectorType::BrandVelocitySpike,
                    values: warm.iter().map(|v| v.velocity).collect(),
                },
                TrackedSeries {
                    metric: "density",
                    target: DetectorType::BrandSaturation,
                    values: warm.iter().map(|v| v.density).collect(),
                },
            ]
        }
        Scope::Competitor(_) => Vec::new(),
    };
    series
        .into_iter()
        .filter(|s| s.values.len() >= MIN_POINTS)
        .collect()
}

/// Force severity to warning when the fit or compound score is strong enough.
pub fn promote(mut draft: AlertDraft) -> AlertDraft {
    let strong_fit = draft.fit_quality.is_some_and(|q| q > PROMOTION_FIT_QUALITY);
    let strong_compound = draft
        .compound_score
        .is_some_and(|s| s >= PROMOTION_COMPOUND_SCORE);
    if strong_fit || strong_compound {
        draft.severity = Severity::Warning;
        draft.promoted = true;
    }
    draft
}

fn draft(ctx: &DetectionContext, detector_type: DetectorType) -> AlertDraft {
    AlertDraft::new(detector_type, ctx.scope.clone(), Severity::Predictive, ctx.now)
}

/// Prefix the brand name, or capitalize for the global scope.
fn scoped_title(ctx: &DetectionContext, text: String) -> String {
    match ctx.scope.name() {
        Some(name) => format!("{name}: {text}"),
        None => {
            let mut chars = text.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => text,
            }
        }
    }
}

// ─── Threshold approach ─────────────────────────────────────────────────────

/// Linear fit predicts a tracked metric crossing its detector threshold
/// within the horizon. The threshold of this detector is the minimum R².
pub struct PredictiveThresholdApproach;

impl Detector for PredictiveThresholdApproach {
    fn detector_type(&self) -> DetectorType {
        DetectorType::PredictiveThresholdApproach
    }

    fn required_metrics(&self) -> &'static [&'static str] {
        &[
            metrics::HIGH_EMOTION_RATIO_NEWS,
            metrics::HIGH_EMOTION_RATIO_SOCIAL,
            metrics::AVG_INTENSITY_GEOPOLITICAL,
            metrics::VOLUME,
        ]
    }

    fn evaluate(&self, ctx: &DetectionContext, threshold: f64) -> Option<AlertDraft> {
        let horizon = ctx.settings.predictive_horizon_days as f64;
        let (series, fit, target_value, days) = tracked_series(ctx)
            .into_iter()
            .filter_map(|series| {
                let fit = trend::fit(&series.values)?;
                if fit.r_squared < threshold {
                    return None;
                }
                let target_value = ctx.threshold(series.target);
                let days = trend::days_to_crossing(&fit, target_value, horizon)?;
                Some((series, fit, target_value, days))
            })
            .min_by(|a, b| a.3.total_cmp(&b.3))?;

        let title = scoped_title(
            ctx,
            format!(
                "trending toward {} threshold",
                series.target.label().to_lowercase()
            ),
        );
        let mut draft = draft(ctx, self.detector_type())
            .titled(
                title,
                format!(
                    "{} is at {:.3} and moving {:+.3}/day toward the {} threshold ({target_value}); crossing in about {days:.1} days (R² {:.2}).",
                    series.metric, fit.current, fit.slope, series.target.as_str(), fit.r_squared
                ),
            )
            .metric("current_value", fit.current)
            .metric("slope", fit.slope)
            .metric("r_squared", fit.r_squared)
            .metric("target_threshold", target_value)
            .metric("days_to_crossing", days);
        draft.fit_quality = Some(fit.r_squared);
        Some(promote(draft))
    }
}

// ─── Momentum ───────────────────────────────────────────────────────────────

/// A key metric accelerating or decelerating sharply. The threshold is the
/// minimum relative acceleration.
pub struct PredictiveMomentum;

impl PredictiveMomentum {
    fn key_metric(scope: &Scope) -> Option<&'static str> {
        match scope {
            Scope::Global => Some(metrics::HIGH_EMOTION_RATIO_NEWS),
            Scope::Brand(_) => Some(metrics::VOLUME),
            Scope::Competitor(_) => None,
        }
    }
}

impl Detector for PredictiveMomentum {
    fn detector_type(&self) -> DetectorType {
        DetectorType::PredictiveMomentum
    }

    fn required_metrics(&self) -> &'static [&'static str] {
        &[metrics::HIGH_EMOTION_RATIO_NEWS, metrics::VOLUME]
    }

    fn evaluate(&self, ctx: &DetectionContext, threshold: f64) -> Option<AlertDraft> {
        let metric = Self::key_metric(&ctx.scope)?;
        let values = ctx.lookback_series(metric);
        let momentum = trend::momentum(&values)?;
        if momentum.direction == Direction::Steady || momentum.relative_acceleration <= threshold {
            return None;
        }
        let title = scoped_title(ctx, format!("{metric} {}", momentum.direction.as_str()));
        let draft = draft(ctx, self.detector_type())
            .titled(
                title,
                format!(
                    "{metric} changed by {:+.3} on the last day with acceleration {:+.3} ({:.0}% of its current value).",
                    momentum.velocity,
                    momentum.acceleration,
                    momentum.relative_acceleration * 100.0
                ),
            )
            .metric("velocity", momentum.velocity)
            .metric("acceleration", momentum.acceleration)
            .metric("relative_acceleration", momentum.relative_acceleration);
        Some(promote(draft))
    }
}

// ─── Compound signal ────────────────────────────────────────────────────────

/// Several weak indicators converging. Scores one point per tracked metric
/// inside the approach band and one per metric accelerating; the threshold
/// is the minimum score.
pub struct PredictiveCompoundSignal;

impl Detector for PredictiveCompoundSignal {
    fn detector_type(&self) -> DetectorType {
        DetectorType::PredictiveCompoundSignal
    }

    fn required_metrics(&self) -> &'static [&'static str] {
        &[
            metrics::HIGH_EMOTION_RATIO_NEWS,
            metrics::HIGH_EMOTION_RATIO_SOCIAL,
            metrics::AVG_INTENSITY_GEOPOLITICAL,
            metrics::VOLUME,
        ]
    }

    fn evaluate(&self, ctx: &DetectionContext, threshold: f64) -> Option<AlertDraft> {
        let mut score = 0u32;
        let mut signals = Vec::new();
        for series in tracked_series(ctx) {
            let target_value = ctx.threshold(series.target);
            let current = series.values[series.values.len() - 1];
            if target_value > 0.0 {
                let progress = current / target_value;
                if (APPROACH_BAND_LOW..1.0).contains(&progress) {
                    score += 1;
                    signals.push(format!(
                        "{} at {:.0}% of threshold",
                        series.metric,
                        progress * 100.0
                    ));
                }
            }
            if let Some(m) = trend::momentum(&series.values) {
                if m.direction == Direction::Accelerating {
                    score += 1;
                    signals.push(format!("{} accelerating", series.metric));
                }
            }
        }
        if (score as f64) < threshold {
            return None;
        }
        let title = scoped_title(ctx, format!("compound signal ({score} converging indicators)"));
        let mut draft = draft(ctx, self.detector_type())
            .titled(
                title,
                format!(
                    "{score} converging signals: {}. Several metrics are approaching their thresholds at once.",
                    signals.join("; ")
                ),
            )
            .metric("score", score as f64);
        draft.compound_score = Some(score);
        Some(promote(draft))
    }
}
