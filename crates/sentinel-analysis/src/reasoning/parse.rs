//! Extraction of structured fields from free-text step output.

use std::sync::LazyLock;

use regex::Regex;

use sentinel_core::types::Recommendation;

/// Confidence assumed when a step does not state one (0-100).
pub const DEFAULT_STEP_CONFIDENCE: u8 = 50;

/// Overall confidence assumed when the scoring step omits it.
pub const DEFAULT_OVERALL_CONFIDENCE: u8 = 50;

const MAX_ITEMS: usize = 5;
const MIN_ITEM_CHARS: usize = 10;
const MAX_ITEM_CHARS: usize = 200;

static DECIMAL_CONFIDENCE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)confidence[:\s]+([01]?\.\d+)").ok());

static PERCENT_CONFIDENCE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)confidence[:\s]+(\d{1,3})%").ok());

static OVERALL_CONFIDENCE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)overall\s+confidence[:\s]+(\d{1,3})").ok());

fn capture<'t>(re: &LazyLock<Option<Regex>>, text: &'t str) -> Option<&'t str> {
    re.as_ref()?
        .captures(text)?
        .get(1)
        .map(|m| m.as_str())
}

fn to_percent(fraction: f64) -> u8 {
    (fraction.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Step confidence on a 0-100 scale, from `confidence: 0.x` or
/// `confidence: NN%`.
pub fn parse_confidence(text: &str) -> u8 {
    if let Some(value) = capture(&DECIMAL_CONFIDENCE, text).and_then(|s| s.parse::<f64>().ok()) {
        return to_percent(value);
    }
    if let Some(value) = capture(&PERCENT_CONFIDENCE, text).and_then(|s| s.parse::<f64>().ok()) {
        return to_percent(value / 100.0);
    }
    DEFAULT_STEP_CONFIDENCE
}

/// `overall confidence: NN` from the scoring step.
pub fn parse_overall_confidence(text: &str) -> u8 {
    capture(&OVERALL_CONFIDENCE, text)
        .and_then(|s| s.parse::<u32>().ok())
        .map_or(DEFAULT_OVERALL_CONFIDENCE, |v| v.min(100) as u8)
}

pub fn parse_recommendation(text: &str) -> Recommendation {
    let lower = text.to_lowercase();
    if lower.contains("act_now") || lower.contains("act now") {
        Recommendation::ActNow
    } else if lower.contains("investigate_further") || lower.contains("investigate further") {
        Recommendation::InvestigateFurther
    } else {
        Recommendation::Monitor
    }
}

fn truncate(s: &str) -> String {
    s.chars().take(MAX_ITEM_CHARS).collect()
}

/// Numbered or dashed lines from the causal step, markers stripped.
pub fn parse_causes(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.starts_with(|c: char| c.is_ascii_digit()) || line.starts_with('-'))
        .map(|line| {
            line.trim_start_matches(|c: char| c.is_ascii_digit() || ".-) ".contains(c))
                .trim()
        })
        .filter(|item| item.chars().count() > MIN_ITEM_CHARS)
        .take(MAX_ITEMS)
        .map(truncate)
        .collect()
}

/// Bulleted lines from the strategic step.
pub fn parse_actions(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.starts_with('-') || line.starts_with('•'))
        .map(|line| line.trim_start_matches(['-', '•']).trim())
        .filter(|item| item.chars().count() > MIN_ITEM_CHARS)
        .take(MAX_ITEMS)
        .map(truncate)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_forms() {
        assert_eq!(parse_confidence("Confidence: 0.8"), 80);
        assert_eq!(parse_confidence("confidence .35"), 35);
        assert_eq!(parse_confidence("Confidence: 72%"), 72);
        assert_eq!(parse_confidence("Confidence: 250%"), 100);
        assert_eq!(parse_confidence("no score here"), DEFAULT_STEP_CONFIDENCE);
    }

    #[test]
    fn overall_and_recommendation() {
        let text = "Overall confidence: 83\nRecommendation: ACT_NOW\nReasoning: clear.";
        assert_eq!(parse_overall_confidence(text), 83);
        assert_eq!(parse_recommendation(text), Recommendation::ActNow);
        assert_eq!(parse_overall_confidence("Overall confidence: 400"), 100);
        assert_eq!(parse_overall_confidence("nothing"), DEFAULT_OVERALL_CONFIDENCE);
        assert_eq!(
            parse_recommendation("We should investigate further."),
            Recommendation::InvestigateFurther
        );
        assert_eq!(parse_recommendation("Keep watching"), Recommendation::Monitor);
    }

    #[test]
    fn causes_strip_markers_and_cap() {
        let text = "Analysis:\n1. Primary cause: tariff announcement hit retail\n\
                    2) short\n- Contributing factor: weak earnings guidance\n\
                    3. Additional context: analyst downgrades\n4. Fourth cause with detail\n\
                    5. Fifth cause with detail\n6. Sixth cause with detail\nConfidence: 0.7";
        let causes = parse_causes(text);
        assert_eq!(causes.len(), 5);
        assert_eq!(causes[0], "Primary cause: tariff announcement hit retail");
        assert_eq!(causes[1], "Contributing factor: weak earnings guidance");
    }

    #[test]
    fn actions_from_bullets() {
        let text = "Implications...\n- Pause the paid social push this week\n• Brief the PR team on the story\n- tiny\n1. not a bullet but long enough";
        assert_eq!(
            parse_actions(text),
            vec![
                "Pause the paid social push this week".to_string(),
                "Brief the PR team on the story".to_string(),
            ]
        );
    }
}
