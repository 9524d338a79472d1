//! Situation titles and narratives.

use std::collections::BTreeSet;

use sentinel_core::traits::{ReasoningPrompt, ReasoningService};
use sentinel_core::types::Alert;

const NARRATIVE_SYSTEM_PROMPT: &str = "You are a senior intelligence analyst. You connect \
separate signals into one coherent picture for a brand strategy team. Be concise and concrete.";

const NARRATIVE_MAX_TOKENS: u32 = 1000;

/// `Situation Report: A + B + C (+N more)`, using detector labels.
pub fn situation_title(members: &[&Alert], title_members: usize) -> String {
    let labels: Vec<&str> = members
        .iter()
        .take(title_members)
        .map(|a| a.detector_type.label())
        .collect();
    let mut title = format!("Situation Report: {}", labels.join(" + "));
    let extra = members.len().saturating_sub(title_members);
    if extra > 0 {
        title.push_str(&format!(" (+{extra} more)"));
    }
    title
}

/// Distinct brand and competitor names, sorted.
fn brands_involved<'a>(members: &[&'a Alert]) -> Vec<&'a str> {
    members
        .iter()
        .filter_map(|a| a.scope.name())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn narrative_prompt(members: &[&Alert]) -> ReasoningPrompt {
    let mut user = String::from("These alerts fired close together and appear related:\n\n");
    for (i, alert) in members.iter().enumerate() {
        user.push_str(&format!(
            "{}. [{}] {}: {}\n   Summary: {}\n",
            i + 1,
            alert.severity.as_str().to_uppercase(),
            alert.detector_type.as_str(),
            alert.title,
            alert.summary
        ));
    }
    let brands = brands_involved(members);
    if !brands.is_empty() {
        user.push_str(&format!("\nBrands involved: {}\n", brands.join(", ")));
    }
    let types: BTreeSet<&str> = members.iter().map(|a| a.detector_type.as_str()).collect();
    user.push_str(&format!(
        "Alert types: {}\n\n",
        types.into_iter().collect::<Vec<_>>().join(", ")
    ));
    user.push_str(
        "Write a situation report with these sections:\n\
         CONNECTION: how the signals relate\n\
         UNIFIED ASSESSMENT: what is actually happening\n\
         SEVERITY: how serious it is and why\n\
         STRATEGIC IMPLICATION: what it means for the brands involved\n\
         RECOMMENDED ACTION: the single most important next step",
    );
    ReasoningPrompt::new(NARRATIVE_SYSTEM_PROMPT, user).with_max_tokens(NARRATIVE_MAX_TOKENS)
}

/// Deterministic narrative used when the reasoning service is unavailable.
pub fn template_narrative(members: &[&Alert]) -> String {
    let mut text = format!("{} related signals fired together:\n", members.len());
    for alert in members {
        text.push_str(&format!(
            "- [{}] {}\n",
            alert.severity.as_str(),
            alert.title
        ));
    }
    let brands = brands_involved(members);
    if brands.is_empty() {
        text.push_str("The signals concern the wider market rather than a single brand.");
    } else {
        text.push_str(&format!("Brands involved: {}.", brands.join(", ")));
    }
    text
}

/// Ask the service for a narrative, falling back to the template on any
/// failure or an empty reply.
pub async fn narrate<S: ReasoningService>(service: Option<&S>, members: &[&Alert]) -> String {
    let Some(service) = service else {
        return template_narrative(members);
    };
    match service.complete(&narrative_prompt(members)).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => {
            tracing::warn!(members = members.len(), "empty situation narrative, using template");
            template_narrative(members)
        }
        Err(e) => {
            tracing::warn!(
                members = members.len(),
                error = %e,
                "situation narrative failed, using template"
            );
            template_narrative(members)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use sentinel_core::types::{AlertDraft, DetectorType, Scope, Severity};

    use super::*;

    fn alert(id: &str, detector_type: DetectorType, scope: Scope) -> Alert {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
        let draft = AlertDraft::new(detector_type, scope, Severity::Warning, now)
            .titled(format!("{} fired", detector_type.label()), "summary");
        Alert::from_draft(draft, id.to_string(), now)
    }

    #[test]
    fn brands_are_distinct_and_sorted() {
        let alerts = [
            alert("a-1", DetectorType::BrandNewsSurge, Scope::brand("Globex")),
            alert("a-2", DetectorType::BrandSocialSurge, Scope::brand("Acme")),
            alert("a-3", DetectorType::BrandCrisis, Scope::brand("Globex")),
            alert("a-4", DetectorType::MoodShift, Scope::Global),
        ];
        let members: Vec<&Alert> = alerts.iter().collect();
        assert_eq!(brands_involved(&members), vec!["Acme", "Globex"]);

        let prompt = narrative_prompt(&members);
        assert!(prompt.user.contains("Brands involved: Acme, Globex"));
        assert!(template_narrative(&members).ends_with("Brands involved: Acme, Globex."));
    }

    #[test]
    fn global_only_situation_names_no_brand() {
        let alerts = [
            alert("g-1", DetectorType::MoodShift, Scope::Global),
            alert("g-2", DetectorType::IntensityCluster, Scope::Global),
        ];
        let members: Vec<&Alert> = alerts.iter().collect();
        assert!(brands_involved(&members).is_empty());
        assert!(template_narrative(&members).contains("wider market"));
    }
}
