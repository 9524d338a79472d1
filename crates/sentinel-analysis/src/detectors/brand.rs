//! Brand detectors: VLDS opportunities, mention surges, sentiment and crisis.

use sentinel_core::types::{metrics, AlertDraft, DetectorType, Severity, VldsScore};

use super::context::DetectionContext;
use super::traits::Detector;

/// Minimum mentions over the density window before VLDS rules apply.
const MIN_VLDS_ITEMS: f64 = 5.0;

/// Density window used for the VLDS item floor.
const VLDS_ITEM_WINDOW_DAYS: u32 = 7;

/// Surge rule switches from multiple to absolute count below this baseline.
const SURGE_MIN_BASELINE: f64 = 2.0;

/// Absolute count that counts as a surge over a thin baseline.
const SURGE_ABSOLUTE_COUNT: f64 = 5.0;

/// Days of history (including today) the sentiment rule needs.
const SENTIMENT_MIN_DAYS: usize = 3;

pub fn all() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(BrandWhiteSpace),
        Box::new(BrandVelocitySpike),
        Box::new(BrandNarrativeFading),
        Box::new(BrandSaturation),
        Box::new(MentionSurge::news()),
        Box::new(MentionSurge::social()),
        Box::new(BrandSentimentShift),
        Box::new(BrandCrisis),
    ]
}

fn brand_name(ctx: &DetectionContext) -> &str {
    ctx.scope.name().unwrap_or("brand")
}

fn draft(ctx: &DetectionContext, detector_type: DetectorType, severity: Severity) -> AlertDraft {
    AlertDraft::new(detector_type, ctx.scope.clone(), severity, ctx.now)
}

/// Today's warm VLDS score, when the brand has enough coverage to score.
fn warm_vlds(ctx: &DetectionContext) -> Option<&VldsScore> {
    let vlds = ctx.vlds.as_ref().filter(|v| !v.cold_start)?;
    (ctx.window_sum(metrics::VOLUME, VLDS_ITEM_WINDOW_DAYS) >= MIN_VLDS_ITEMS).then_some(vlds)
}

fn vlds_metrics(draft: AlertDraft, vlds: &VldsScore) -> AlertDraft {
    draft
        .metric("velocity", vlds.velocity)
        .metric("longevity", vlds.longevity as f64)
        .metric("density", vlds.density)
        .metric("scarcity", vlds.scarcity)
}

// ─── VLDS rules ─────────────────────────────────────────────────────────────

pub struct BrandWhiteSpace;

impl Detector for BrandWhiteSpace {
    fn detector_type(&self) -> DetectorType {
        DetectorType::BrandWhiteSpace
    }

    fn required_metrics(&self) -> &'static [&'static str] {
        &[metrics::VOLUME]
    }

    fn evaluate(&self, ctx: &DetectionContext, threshold: f64) -> Option<AlertDraft> {
        let vlds = warm_vlds(ctx)?;
        if vlds.scarcity < threshold {
            return None;
        }
        let brand = brand_name(ctx);
        Some(vlds_metrics(
            draft(ctx, self.detector_type(), Severity::Critical).titled(
                format!("White space opportunity for {brand}"),
                format!(
                    "{brand} has a scarcity score of {:.2}: coverage density is low, leaving room for a first mover.",
                    vlds.scarcity
                ),
            ),
            vlds,
        ))
    }
}

pub struct BrandVelocitySpike;

impl Detector for BrandVelocitySpike {
    fn detector_type(&self) -> DetectorType {
        DetectorType::BrandVelocitySpike
    }

    fn required_metrics(&self) -> &'static [&'static str] {
        &[metrics::VOLUME]
    }

    fn evaluate(&self, ctx: &DetectionContext, threshold: f64) -> Option<AlertDraft> {
        let vlds = warm_vlds(ctx)?;
        if vlds.velocity < threshold {
            return None;
        }
        let severity = if vlds.velocity >= threshold * 2.0 {
            Severity::Critical
        } else {
            Severity::Warning
        };
        let brand = brand_name(ctx);
        Some(vlds_metrics(
            draft(ctx, self.detector_type(), severity).titled(
                format!("Velocity spike for {brand}: {:.1}x", vlds.velocity),
                format!(
                    "Conversation about {brand} is running at {:.1}x its baseline volume.",
                    vlds.velocity
                ),
            ),
            vlds,
        ))
    }
}

pub struct BrandNarrativeFading;

impl Detector for BrandNarrativeFading {
    fn detector_type(&self) -> DetectorType {
        DetectorType::BrandNarrativeFading
    }

    fn required_metrics(&self) -> &'static [&'static str] {
        &[metrics::VOLUME]
    }

    fn evaluate(&self, ctx: &DetectionContext, threshold: f64) -> Option<AlertDraft> {
        let previous = ctx.previous_vlds.as_ref()?;
        let current = ctx.vlds.as_ref()?;
        if (previous.longevity as f64) < threshold || current.longevity != 0 {
            return None;
        }
        let brand = brand_name(ctx);
        Some(
            draft(ctx, self.detector_type(), Severity::Warning)
                .titled(
                    format!("Narrative fading for {brand}"),
                    format!(
                        "{brand} had been in the conversation for {} consecutive days and dropped out today.",
                        previous.longevity
                    ),
                )
                .metric("prev_longevity", previous.longevity as f64)
                .metric("curr_longevity", 0.0),
        )
    }
}

pub struct BrandSaturation;

impl Detector for BrandSaturation {
    fn detector_type(&self) -> DetectorType {
        DetectorType::BrandSaturation
    }

    fn required_metrics(&self) -> &'static [&'static str] {
        &[metrics::VOLUME]
    }

    fn evaluate(&self, ctx: &DetectionContext, threshold: f64) -> Option<AlertDraft> {
        let vlds = warm_vlds(ctx)?;
        if vlds.density < threshold {
            return None;
        }
        let brand = brand_name(ctx);
        Some(vlds_metrics(
            draft(ctx, self.detector_type(), Severity::Warning).titled(
                format!("Conversation saturated for {brand}"),
                format!(
                    "{brand} has a density score of {:.2}. The space is crowded; look for adjacent white space.",
                    vlds.density
                ),
            ),
            vlds,
        ))
    }
}

// ─── Mention surges ─────────────────────────────────────────────────────────

/// News or social mention surge against the prior-day baseline.
pub struct MentionSurge {
    detector_type: DetectorType,
    metric: &'static str,
    channel: &'static str,
}

impl MentionSurge {
    pub fn news() -> Self {
        Self {
            detector_type: DetectorType::BrandNewsSurge,
            metric: metrics::MENTION_COUNT_NEWS,
            channel: "news",
        }
    }

    pub fn social() -> Self {
        Self {
            detector_type: DetectorType::BrandSocialSurge,
            metric: metrics::MENTION_COUNT_SOCIAL,
            channel: "social",
        }
    }
}

impl Detector for MentionSurge {
    fn detector_type(&self) -> DetectorType {
        self.detector_type
    }

    fn required_metrics(&self) -> &'static [&'static str] {
        match self.detector_type {
            DetectorType::BrandSocialSurge => &[metrics::MENTION_COUNT_SOCIAL],
            _ => &[metrics::MENTION_COUNT_NEWS],
        }
    }

    fn evaluate(&self, ctx: &DetectionContext, threshold: f64) -> Option<AlertDraft> {
        let today = ctx.today.get(self.metric)?;
        let baseline = ctx.baseline(self.metric)?;
        let surge = if baseline >= SURGE_MIN_BASELINE {
            today >= baseline * threshold
        } else {
            today >= SURGE_ABSOLUTE_COUNT
        };
        if !surge {
            return None;
        }
        let multiple = today / baseline.max(0.1);
        let severity = if multiple >= threshold * 2.0 {
            Severity::Critical
        } else {
            Severity::Warning
        };
        let brand = brand_name(ctx);
        let channel = self.channel;
        let title_channel = if channel == "news" { "News" } else { "Social" };
        Some(
            draft(ctx, self.detector_type, severity)
                .titled(
                    format!("{title_channel} mention surge for {brand}"),
                    format!(
                        "{brand} appeared in {today:.0} {channel} items today against a baseline of {baseline:.1}/day, a {multiple:.1}x spike."
                    ),
                )
                .metric("today_count", today)
                .metric("baseline", baseline)
                .metric("multiplier", multiple),
        )
    }
}

// ─── Sentiment & crisis ─────────────────────────────────────────────────────

pub struct BrandSentimentShift;

impl Detector for BrandSentimentShift {
    fn detector_type(&self) -> DetectorType {
        DetectorType::BrandSentimentShift
    }

    fn required_metrics(&self) -> &'static [&'static str] {
        &[metrics::AVG_EMPATHY]
    }

    fn evaluate(&self, ctx: &DetectionContext, threshold: f64) -> Option<AlertDraft> {
        let current = ctx.today.get(metrics::AVG_EMPATHY)?;
        let prior = ctx.prior_values(metrics::AVG_EMPATHY);
        if prior.len() + 1 < SENTIMENT_MIN_DAYS {
            return None;
        }
        let average = prior.iter().sum::<f64>() / prior.len() as f64;
        let shift = current - average;
        if shift.abs() <= threshold {
            return None;
        }
        let direction = if shift > 0.0 { "improved" } else { "declined" };
        let brand = brand_name(ctx);
        Some(
            draft(ctx, self.detector_type(), Severity::Warning)
                .titled(
                    format!("Sentiment {direction} for {brand}"),
                    format!(
                        "Sentiment around {brand} {direction} from {average:.3} (prior average) to {current:.3}."
                    ),
                )
                .metric("average", average)
                .metric("current", current)
                .metric("shift", shift),
        )
    }
}

/// Volume spike with hostile, negative coverage.
pub struct BrandCrisis;

impl Detector for BrandCrisis {
    fn detector_type(&self) -> DetectorType {
        DetectorType::BrandCrisis
    }

    fn required_metrics(&self) -> &'static [&'static str] {
        &[metrics::VOLUME, metrics::AVG_EMPATHY, metrics::NEGATIVE_EMOTION_SHARE]
    }

    fn evaluate(&self, ctx: &DetectionContext, threshold: f64) -> Option<AlertDraft> {
        let volume = ctx.today.get(metrics::VOLUME)?;
        let baseline = ctx.baseline(metrics::VOLUME)?;
        let empathy = ctx.today.get(metrics::AVG_EMPATHY)?;
        let negative = ctx.today.get(metrics::NEGATIVE_EMOTION_SHARE)?;
        let multiple = volume / baseline.max(1.0);
        if multiple < threshold
            || empathy >= ctx.settings.crisis_empathy_floor
            || negative <= ctx.settings.crisis_negative_floor
        {
            return None;
        }
        let brand = brand_name(ctx);
        Some(
            draft(ctx, self.detector_type(), Severity::Critical)
                .titled(
                    format!("Possible crisis for {brand}"),
                    format!(
                        "{brand} coverage is at {multiple:.1}x baseline with empathy {empathy:.2} and {:.0}% negative emotion.",
                        negative * 100.0
                    ),
                )
                .metric("volume", volume)
                .metric("baseline", baseline)
                .metric("multiple", multiple)
                .metric("avg_empathy", empathy)
                .metric("negative_emotion_share", negative),
        )
    }
}
