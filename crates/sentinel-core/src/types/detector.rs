//! Detector type and class enums.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{PREDICTIVE_COOLDOWN_SECS, REACTIVE_COOLDOWN_SECS};
use crate::errors::DetectionError;

/// The four detector classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorClass {
    Global,
    Brand,
    Competitive,
    Predictive,
}

impl DetectorClass {
    pub fn all() -> &'static [DetectorClass] {
        &[Self::Global, Self::Brand, Self::Competitive, Self::Predictive]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Brand => "brand",
            Self::Competitive => "competitive",
            Self::Predictive => "predictive",
        }
    }

    /// Cooldown window in seconds for alerts of this class.
    pub fn cooldown_secs(&self) -> i64 {
        match self {
            Self::Predictive => PREDICTIVE_COOLDOWN_SECS,
            _ => REACTIVE_COOLDOWN_SECS,
        }
    }
}

/// The 21 detector types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorType {
    // Global
    MoodShift,
    MarketMoodDivergence,
    IntensityCluster,
    TopicEmergence,
    RegulatoryPolicySpike,
    BreakingSignal,
    GeopoliticalRiskEscalation,
    // Brand
    BrandWhiteSpace,
    BrandVelocitySpike,
    BrandNarrativeFading,
    BrandSaturation,
    BrandNewsSurge,
    BrandSocialSurge,
    BrandSentimentShift,
    BrandCrisis,
    // Competitive
    CompetitorMomentum,
    ShareOfVoiceShift,
    CompetitiveWhiteSpace,
    // Predictive
    PredictiveThresholdApproach,
    PredictiveMomentum,
    PredictiveCompoundSignal,
}

impl DetectorType {
    pub fn all() -> &'static [DetectorType] {
        &[
            Self::MoodShift, Self::MarketMoodDivergence, Self::IntensityCluster,
            Self::TopicEmergence, Self::RegulatoryPolicySpike, Self::BreakingSignal,
            Self::GeopoliticalRiskEscalation,
            Self::BrandWhiteSpace, Self::BrandVelocitySpike, Self::BrandNarrativeFading,
            Self::BrandSaturation, Self::BrandNewsSurge, Self::BrandSocialSurge,
            Self::BrandSentimentShift, Self::BrandCrisis,
            Self::CompetitorMomentum, Self::ShareOfVoiceShift, Self::CompetitiveWhiteSpace,
            Self::PredictiveThresholdApproach, Self::PredictiveMomentum,
            Self::PredictiveCompoundSignal,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MoodShift => "mood_shift",
            Self::MarketMoodDivergence => "market_mood_divergence",
            Self::IntensityCluster => "intensity_cluster",
            Self::TopicEmergence => "topic_emergence",
            Self::RegulatoryPolicySpike => "regulatory_policy_spike",
            Self::BreakingSignal => "breaking_signal",
            Self::GeopoliticalRiskEscalation => "geopolitical_risk_escalation",
            Self::BrandWhiteSpace => "brand_white_space",
            Self::BrandVelocitySpike => "brand_velocity_spike",
            Self::BrandNarrativeFading => "brand_narrative_fading",
            Self::BrandSaturation => "brand_saturation",
            Self::BrandNewsSurge => "brand_news_surge",
            Self::BrandSocialSurge => "brand_social_surge",
            Self::BrandSentimentShift => "brand_sentiment_shift",
            Self::BrandCrisis => "brand_crisis",
            Self::CompetitorMomentum => "competitor_momentum",
            Self::ShareOfVoiceShift => "share_of_voice_shift",
            Self::CompetitiveWhiteSpace => "competitive_white_space",
            Self::PredictiveThresholdApproach => "predictive_threshold_approach",
            Self::PredictiveMomentum => "predictive_momentum",
            Self::PredictiveCompoundSignal => "predictive_compound_signal",
        }
    }

    /// Human-readable label used in titles and situation reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MoodShift => "Mood Shift",
            Self::MarketMoodDivergence => "Market-Mood Divergence",
            Self::IntensityCluster => "Intensity Cluster",
            Self::TopicEmergence => "Topic Emergence",
            Self::RegulatoryPolicySpike => "Regulatory Spike",
            Self::BreakingSignal => "Breaking Signal",
            Self::GeopoliticalRiskEscalation => "Geopolitical Risk",
            Self::BrandWhiteSpace => "White Space",
            Self::BrandVelocitySpike => "Velocity Spike",
            Self::BrandNarrativeFading => "Narrative Fading",
            Self::BrandSaturation => "Saturation",
            Self::BrandNewsSurge => "News Surge",
            Self::BrandSocialSurge => "Social Surge",
            Self::BrandSentimentShift => "Sentiment Shift",
            Self::BrandCrisis => "Brand Crisis",
            Self::CompetitorMomentum => "Competitor Momentum",
            Self::ShareOfVoiceShift => "Share of Voice Shift",
            Self::CompetitiveWhiteSpace => "Competitive Gap",
            Self::PredictiveThresholdApproach => "Threshold Approach",
            Self::PredictiveMomentum => "Momentum",
            Self::PredictiveCompoundSignal => "Compound Signal",
        }
    }

    pub fn class(&self) -> DetectorClass {
        match self {
            Self::MoodShift
            | Self::MarketMoodDivergence
            | Self::IntensityCluster
            | Self::TopicEmergence
            | Self::RegulatoryPolicySpike
            | Self::BreakingSignal
            | Self::GeopoliticalRiskEscalation => DetectorClass::Global,
            Self::BrandWhiteSpace
            | Self::BrandVelocitySpike
            | Self::BrandNarrativeFading
            | Self::BrandSaturation
            | Self::BrandNewsSurge
            | Self::BrandSocialSurge
            | Self::BrandSentimentShift
            | Self::BrandCrisis => DetectorClass::Brand,
            Self::CompetitorMomentum | Self::ShareOfVoiceShift | Self::CompetitiveWhiteSpace => {
                DetectorClass::Competitive
            }
            Self::PredictiveThresholdApproach
            | Self::PredictiveMomentum
            | Self::PredictiveCompoundSignal => DetectorClass::Predictive,
        }
    }

    /// Compiled default for the tunable threshold. Larger values always make
    /// the detector fire less often.
    pub fn default_threshold(&self) -> f64 {
        match self {
            Self::MoodShift => 15.0,
            Self::MarketMoodDivergence => 25.0,
            Self::IntensityCluster => 0.40,
            Self::TopicEmergence => 0.20,
            Self::RegulatoryPolicySpike => 2.0,
            Self::BreakingSignal => 3.0,
            Self::GeopoliticalRiskEscalation => 3.0,
            Self::BrandWhiteSpace => 0.70,
            Self::BrandVelocitySpike => 3.0,
            Self::BrandNarrativeFading => 4.0,
            Self::BrandSaturation => 0.70,
            Self::BrandNewsSurge => 3.0,
            Self::BrandSocialSurge => 3.0,
            Self::BrandSentimentShift => 0.15,
            Self::BrandCrisis => 2.0,
            Self::CompetitorMomentum => 1.0,
            Self::ShareOfVoiceShift => 5.0,
            Self::CompetitiveWhiteSpace => 0.30,
            Self::PredictiveThresholdApproach => 0.40,
            Self::PredictiveMomentum => 0.10,
            Self::PredictiveCompoundSignal => 3.0,
        }
    }

    /// Cooldown window in seconds.
    pub fn cooldown_secs(&self) -> i64 {
        self.class().cooldown_secs()
    }

    pub fn is_predictive(&self) -> bool {
        self.class() == DetectorClass::Predictive
    }
}

impl fmt::Display for DetectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetectorType {
    type Err = DetectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DetectionError::UnknownDetector(s.to_string()))
    }
}
