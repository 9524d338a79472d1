//! Pairwise alert similarity.

use std::collections::HashSet;

use sentinel_core::types::{Alert, DetectorType};

/// Words ignored when comparing alert text.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "in", "on", "at", "to", "for", "of", "and",
    "or", "but", "with", "from", "by", "this", "that", "it", "not", "be", "has", "had", "have",
    "will", "would", "could", "should", "may", "can", "do", "did", "been", "being", "their",
    "there", "than", "more", "less", "alert", "detected", "spike", "surge", "shift",
];

/// Detector pairs where one signal plausibly drives the other. Unordered.
const CAUSAL_PAIRS: &[(DetectorType, DetectorType)] = &[
    (DetectorType::GeopoliticalRiskEscalation, DetectorType::MarketMoodDivergence),
    (DetectorType::GeopoliticalRiskEscalation, DetectorType::BrandSentimentShift),
    (DetectorType::RegulatoryPolicySpike, DetectorType::BrandSentimentShift),
    (DetectorType::RegulatoryPolicySpike, DetectorType::MarketMoodDivergence),
    (DetectorType::BreakingSignal, DetectorType::BrandCrisis),
    (DetectorType::BreakingSignal, DetectorType::BrandNewsSurge),
    (DetectorType::MoodShift, DetectorType::MarketMoodDivergence),
    (DetectorType::BrandCrisis, DetectorType::BrandSentimentShift),
    (DetectorType::TopicEmergence, DetectorType::BreakingSignal),
    (DetectorType::TopicEmergence, DetectorType::BrandNewsSurge),
    (DetectorType::IntensityCluster, DetectorType::BreakingSignal),
    (DetectorType::IntensityCluster, DetectorType::BrandCrisis),
];

const SAME_SCOPE_SCORE: u32 = 3;
const CAUSAL_PAIR_SCORE: u32 = 2;
const STRONG_OVERLAP_SCORE: u32 = 2;
const WEAK_OVERLAP_SCORE: u32 = 1;
const STRONG_OVERLAP_WORDS: usize = 3;

pub fn is_causal_pair(a: DetectorType, b: DetectorType) -> bool {
    CAUSAL_PAIRS
        .iter()
        .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
}

/// Lowercased words longer than three characters, stop words removed.
pub fn significant_words(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 3)
        .map(str::to_lowercase)
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

fn alert_words(alert: &Alert) -> HashSet<String> {
    significant_words(&format!("{} {}", alert.title, alert.summary))
}

/// Score a pair of alerts. Pairs created further apart than
/// `proximity_secs` always score zero.
pub fn pair_score(a: &Alert, b: &Alert, proximity_secs: i64) -> u32 {
    let gap = (a.created_at - b.created_at).num_seconds().abs();
    if gap > proximity_secs {
        return 0;
    }
    let mut score = 0;
    if !a.scope.is_global() && a.scope == b.scope {
        score += SAME_SCOPE_SCORE;
    }
    if is_causal_pair(a.detector_type, b.detector_type) {
        score += CAUSAL_PAIR_SCORE;
    }
    let shared = alert_words(a).intersection(&alert_words(b)).count();
    if shared >= STRONG_OVERLAP_WORDS {
        score += STRONG_OVERLAP_SCORE;
    } else if shared > 0 {
        score += WEAK_OVERLAP_SCORE;
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_words_and_short_words_dropped() {
        let words = significant_words("Surge detected: the Tariff vote hits Acme, and more");
        assert!(words.contains("tariff"));
        assert!(words.contains("acme"));
        assert!(words.contains("vote"));
        assert!(words.contains("hits"));
        assert!(!words.contains("surge"));
        assert!(!words.contains("detected"));
        assert!(!words.contains("the"));
        assert!(!words.contains("more"));
    }

    #[test]
    fn causal_pairs_are_symmetric() {
        assert!(is_causal_pair(
            DetectorType::BrandCrisis,
            DetectorType::BreakingSignal
        ));
        assert!(is_causal_pair(
            DetectorType::BreakingSignal,
            DetectorType::BrandCrisis
        ));
        assert!(!is_causal_pair(
            DetectorType::BrandSaturation,
            DetectorType::BrandCrisis
        ));
    }
}
