//! Investigation depth per detector type.

use sentinel_core::types::{DetectorType, StepKind};

use StepKind::{
    CausalAnalysis as Causal, ConfidenceScoring as Confidence, HistoricalContext as Historical,
    SituationAssessment as Situation, StrategicImplications as Strategic,
};

const BRIEF: &[StepKind] = &[Situation, Confidence];
const WITH_HISTORY: &[StepKind] = &[Situation, Historical, Confidence];
const HISTORY_AND_CAUSES: &[StepKind] = &[Situation, Historical, Causal, Confidence];
const CAUSES_AND_STRATEGY: &[StepKind] = &[Situation, Causal, Strategic, Confidence];
const HISTORY_AND_STRATEGY: &[StepKind] = &[Situation, Historical, Strategic, Confidence];
const FULL: &[StepKind] = &[Situation, Historical, Causal, Strategic, Confidence];

/// The ordered steps investigated for an alert of `detector_type`.
///
/// Every plan starts with the situation assessment and ends with
/// confidence scoring.
pub fn plan_for(detector_type: DetectorType) -> &'static [StepKind] {
    use DetectorType::*;
    match detector_type {
        BrandNewsSurge | BrandSocialSurge => BRIEF,
        MoodShift | BrandSentimentShift => WITH_HISTORY,
        IntensityCluster | MarketMoodDivergence => HISTORY_AND_CAUSES,
        TopicEmergence | BrandWhiteSpace | BrandSaturation => CAUSES_AND_STRATEGY,
        BrandVelocitySpike | BrandNarrativeFading => HISTORY_AND_STRATEGY,
        RegulatoryPolicySpike
        | BreakingSignal
        | GeopoliticalRiskEscalation
        | BrandCrisis
        | CompetitorMomentum
        | ShareOfVoiceShift
        | CompetitiveWhiteSpace
        | PredictiveThresholdApproach
        | PredictiveMomentum
        | PredictiveCompoundSignal => FULL,
    }
}
