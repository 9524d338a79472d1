//! Competitive detectors. They read the brand's competitive snapshot and
//! never run without one.

use sentinel_core::types::{AlertDraft, DetectorType, Severity};

use super::context::DetectionContext;
use super::traits::Detector;

pub fn all() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(CompetitorMomentum),
        Box::new(ShareOfVoiceShift),
        Box::new(CompetitiveWhiteSpace),
    ]
}

fn draft(ctx: &DetectionContext, detector_type: DetectorType) -> AlertDraft {
    AlertDraft::new(detector_type, ctx.scope.clone(), Severity::Warning, ctx.now)
}

pub struct CompetitorMomentum;

impl Detector for CompetitorMomentum {
    fn detector_type(&self) -> DetectorType {
        DetectorType::CompetitorMomentum
    }

    fn required_metrics(&self) -> &'static [&'static str] {
        &[]
    }

    fn evaluate(&self, ctx: &DetectionContext, threshold: f64) -> Option<AlertDraft> {
        let snapshot = ctx.competitive.as_ref()?;
        let brand_velocity = snapshot.brand_vlds.as_ref()?.velocity;
        let (competitor, lead) = snapshot
            .competitor_vlds
            .iter()
            .filter(|(_, v)| !v.cold_start)
            .map(|(name, v)| (name.as_str(), v.velocity - brand_velocity))
            .max_by(|a, b| a.1.total_cmp(&b.1))?;
        if lead < threshold {
            return None;
        }
        Some(
            draft(ctx, self.detector_type())
                .titled(
                    format!("{competitor} is gaining momentum on {}", snapshot.brand),
                    format!(
                        "{competitor}'s velocity exceeds {}'s by {lead:.2}.",
                        snapshot.brand
                    ),
                )
                .metric("velocity_lead", lead)
                .metric("brand_velocity", brand_velocity),
        )
    }
}

/// A competitor overtaking the brand's share of voice since the previous
/// snapshot.
pub struct ShareOfVoiceShift;

impl Detector for ShareOfVoiceShift {
    fn detector_type(&self) -> DetectorType {
        DetectorType::ShareOfVoiceShift
    }

    fn required_metrics(&self) -> &'static [&'static str] {
        &[]
    }

    fn evaluate(&self, ctx: &DetectionContext, threshold: f64) -> Option<AlertDraft> {
        let current = ctx.competitive.as_ref()?;
        let previous = ctx.previous_competitive.as_ref()?;
        let brand_now = current.brand_share();
        let brand_before = previous.brand_share();

        let (competitor, lead) = current
            .share_of_voice
            .iter()
            .filter(|(name, _)| **name != current.brand)
            .filter(|(name, _)| {
                previous
                    .share_of_voice
                    .get(*name)
                    .map_or(true, |before| *before <= brand_before)
            })
            .map(|(name, share)| (name.as_str(), share - brand_now))
            .max_by(|a, b| a.1.total_cmp(&b.1))?;
        if lead <= 0.0 || lead < threshold {
            return None;
        }
        Some(
            draft(ctx, self.detector_type())
                .titled(
                    format!("{competitor} overtook {} in share of voice", current.brand),
                    format!(
                        "{competitor} now leads {} by {lead:.1} points of share of voice ({} held {brand_now:.1}%).",
                        current.brand, current.brand
                    ),
                )
                .metric("sov_lead", lead)
                .metric("brand_share", brand_now)
                .metric("brand_share_previous", brand_before),
        )
    }
}

pub struct CompetitiveWhiteSpace;

impl Detector for CompetitiveWhiteSpace {
    fn detector_type(&self) -> DetectorType {
        DetectorType::CompetitiveWhiteSpace
    }

    fn required_metrics(&self) -> &'static [&'static str] {
        &[]
    }

    fn evaluate(&self, ctx: &DetectionContext, threshold: f64) -> Option<AlertDraft> {
        let snapshot = ctx.competitive.as_ref()?;
        let brand_density = snapshot.brand_vlds.as_ref()?.density;
        if snapshot.competitor_vlds.is_empty() {
            return None;
        }
        let competitor_density = snapshot
            .competitor_vlds
            .values()
            .map(|v| v.density)
            .sum::<f64>()
            / snapshot.competitor_vlds.len() as f64;
        let gap = brand_density - competitor_density;
        if gap.abs() < threshold {
            return None;
        }
        let (title, summary) = if gap < 0.0 {
            (
                format!("Competitors crowd a space {} barely occupies", snapshot.brand),
                format!(
                    "Competitor density averages {competitor_density:.2} against {brand_density:.2} for {}.",
                    snapshot.brand
                ),
            )
        } else {
            (
                format!("{} owns a space competitors have left open", snapshot.brand),
                format!(
                    "{} density is {brand_density:.2} while competitors average {competitor_density:.2}.",
                    snapshot.brand
                ),
            )
        };
        Some(
            draft(ctx, self.detector_type())
                .titled(title, summary)
                .metric("brand_density", brand_density)
                .metric("competitor_density", competitor_density)
                .metric("gap", gap),
        )
    }
}
