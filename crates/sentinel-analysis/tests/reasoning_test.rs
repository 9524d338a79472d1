//! Investigation chain orchestrator tests against a scripted reasoning service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use sentinel_analysis::reasoning::{
    alert_status_for, select_frameworks, ChainContext, ChainOrchestrator, ChainPolicy,
};
use sentinel_core::config::ConfidencePolicy;
use sentinel_core::errors::ReasoningError;
use sentinel_core::traits::{Cancellable, CancellationToken, ReasoningPrompt, ReasoningService};
use sentinel_core::types::{
    Alert, AlertDraft, AlertStatus, ChainStatus, DetectorType, Recommendation, Scope, Severity,
    StepKind, StepStatus,
};

// ── Scripted service ──

#[derive(Debug, Clone)]
enum Reply {
    Text(&'static str),
    Fail(ReasoningError),
    Hang,
}

type Script = Box<dyn Fn(&'static str, u32) -> Reply + Send + Sync>;

/// Answers by step marker; the closure sees the marker and the attempt
/// number for that marker (1-based).
struct Scripted {
    script: Script,
    attempts: Mutex<HashMap<&'static str, u32>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Duration,
    cancel_on: Option<(&'static str, CancellationToken)>,
}

impl Scripted {
    fn new(script: impl Fn(&'static str, u32) -> Reply + Send + Sync + 'static) -> Self {
        Self {
            script: Box::new(script),
            attempts: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            delay: Duration::ZERO,
            cancel_on: None,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

const MARKERS: &[&str] = &[
    "SITUATION ASSESSMENT",
    "HISTORICAL CONTEXT",
    "CAUSAL ANALYSIS",
    "STRATEGIC IMPLICATIONS",
    "CONFIDENCE ASSESSMENT",
];

impl ReasoningService for Scripted {
    async fn complete(&self, prompt: &ReasoningPrompt) -> Result<String, ReasoningError> {
        let marker = MARKERS
            .iter()
            .copied()
            .find(|m| prompt.user.contains(m))
            .unwrap_or("UNKNOWN");
        self.calls.fetch_add(1, Ordering::SeqCst);
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let n = attempts.entry(marker).or_insert(0);
            *n += 1;
            *n
        };
        if let Some((on, token)) = &self.cancel_on {
            if *on == marker {
                token.cancel();
            }
        }
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let reply = (self.script)(marker, attempt);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        match reply {
            Reply::Text(text) => Ok(text.to_string()),
            Reply::Fail(e) => Err(e),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(ReasoningError::Transient("unreachable".into()))
            }
        }
    }
}

const SITUATION: &str = "Coverage of Acme tripled overnight.\nConfidence: 0.8";
const HISTORICAL: &str = "A similar spike in January faded in two days.\nConfidence: 0.7";
const CAUSAL: &str = "1. Primary cause: product recall announced by regulators\n\
                      2. Contributing factor: viral video of the defect\nConfidence: 0.75";
const STRATEGIC: &str = "Act on the recall narrative.\n- Publish a clear recall FAQ today\n\
                         - Brief customer service on talking points\nConfidence: 0.8";
const SCORING: &str = "Overall confidence: 85\nRecommendation: ACT_NOW\nReasoning: strong.";

fn happy(marker: &'static str, _attempt: u32) -> Reply {
    Reply::Text(match marker {
        "SITUATION ASSESSMENT" => SITUATION,
        "HISTORICAL CONTEXT" => HISTORICAL,
        "CAUSAL ANALYSIS" => CAUSAL,
        "STRATEGIC IMPLICATIONS" => STRATEGIC,
        _ => SCORING,
    })
}

fn fast_policy() -> ChainPolicy {
    ChainPolicy {
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(4),
        step_timeout: Duration::from_millis(50),
        ..ChainPolicy::default()
    }
}

fn context(dt: DetectorType, title: &str) -> ChainContext {
    let draft = AlertDraft::new(dt, Scope::brand("Acme"), Severity::Critical, Utc::now())
        .titled(title, "Acme coverage spiked with negative emotion.")
        .metric("multiple", 3.1);
    ChainContext::new(Alert::from_draft(draft, format!("alert-{title}"), Utc::now()))
}

fn orchestrator(service: Scripted, policy: ChainPolicy) -> (ChainOrchestrator<Scripted>, Arc<Scripted>) {
    let service = Arc::new(service);
    (ChainOrchestrator::new(Arc::clone(&service), policy), service)
}

// ── Chains ──

/// TS-RSN-01: a full chain parses causes, actions, frameworks and the final recommendation.
#[tokio::test]
async fn test_full_chain() {
    let (orch, service) = orchestrator(Scripted::new(happy), fast_policy());
    let ctx = context(DetectorType::BrandCrisis, "Possible crisis for Acme");
    let inv = orch.investigate(&ctx, &CancellationToken::new()).await;

    assert_eq!(inv.chain_status, ChainStatus::Complete);
    assert_eq!(inv.steps.len(), 5);
    assert_eq!(service.calls(), 5);
    assert_eq!(inv.overall_confidence, Some(85));
    assert_eq!(inv.recommendation, Recommendation::ActNow);
    assert_eq!(inv.summary, "Possible crisis for Acme (immediate action recommended)");

    let causal = inv.steps.iter().find(|s| s.kind == StepKind::CausalAnalysis).unwrap();
    assert_eq!(causal.likely_causes.len(), 2);
    assert_eq!(causal.confidence, 75);
    let strategic = inv
        .steps
        .iter()
        .find(|s| s.kind == StepKind::StrategicImplications)
        .unwrap();
    assert_eq!(strategic.recommended_actions[0], "Publish a clear recall FAQ today");
    let expected: Vec<String> = select_frameworks(&ctx.framework_text())
        .iter()
        .map(|f| f.key.to_string())
        .collect();
    assert!(!expected.is_empty());
    assert_eq!(strategic.frameworks, expected);
    assert_eq!(alert_status_for(&inv), AlertStatus::Investigated);
}

/// TS-RSN-02: a short plan runs only its own steps.
#[tokio::test]
async fn test_brief_plan() {
    let (orch, _) = orchestrator(Scripted::new(happy), fast_policy());
    let ctx = context(DetectorType::BrandNewsSurge, "News mention surge for Acme");
    let inv = orch.investigate(&ctx, &CancellationToken::new()).await;
    let kinds: Vec<StepKind> = inv.steps.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![StepKind::SituationAssessment, StepKind::ConfidenceScoring]);
}

/// TS-RSN-03: confidence below 20 before scoring bails out with no further steps.
#[tokio::test]
async fn test_bailout() {
    let (orch, service) = orchestrator(
        Scripted::new(|marker, _| match marker {
            "SITUATION ASSESSMENT" => Reply::Text("Barely any signal.\nConfidence: 0.1"),
            _ => Reply::Text(SCORING),
        }),
        fast_policy(),
    );
    let ctx = context(DetectorType::BrandCrisis, "Possible crisis for Acme");
    let inv = orch.investigate(&ctx, &CancellationToken::new()).await;
    assert_eq!(inv.chain_status, ChainStatus::Bailout);
    assert_eq!(inv.steps.len(), 1);
    assert_eq!(service.calls(), 1);
    assert_eq!(inv.recommendation, Recommendation::Monitor);
    assert_eq!(alert_status_for(&inv), AlertStatus::Bailout);
}

/// TS-RSN-04: the mean policy smooths a single weak step that would bail under the latest policy.
#[tokio::test]
async fn test_mean_policy_avoids_bailout() {
    let script = |marker: &'static str, _: u32| match marker {
        "SITUATION ASSESSMENT" => Reply::Text("Clear.\nConfidence: 0.9"),
        "HISTORICAL CONTEXT" => Reply::Text("No precedent.\nConfidence: 0.1"),
        _ => Reply::Text(SCORING),
    };
    let ctx = context(DetectorType::MoodShift, "Mood dropped 30pts in social");

    let (latest, _) = orchestrator(Scripted::new(script), fast_policy());
    let inv = latest.investigate(&ctx, &CancellationToken::new()).await;
    assert_eq!(inv.chain_status, ChainStatus::Bailout);

    let policy = ChainPolicy {
        confidence_policy: ConfidencePolicy::Mean,
        ..fast_policy()
    };
    let (mean, _) = orchestrator(Scripted::new(script), policy);
    let inv = mean.investigate(&ctx, &CancellationToken::new()).await;
    assert_eq!(inv.chain_status, ChainStatus::Complete);
    assert_eq!(inv.steps.len(), 3);
}

/// TS-RSN-05: transient failures are retried with backoff until they succeed.
#[tokio::test]
async fn test_transient_retry() {
    let (orch, service) = orchestrator(
        Scripted::new(|marker, attempt| match (marker, attempt) {
            ("SITUATION ASSESSMENT", 1 | 2) => Reply::Fail(ReasoningError::Transient("503".into())),
            _ => happy(marker, attempt),
        }),
        fast_policy(),
    );
    let ctx = context(DetectorType::BrandNewsSurge, "News mention surge for Acme");
    let inv = orch.investigate(&ctx, &CancellationToken::new()).await;
    assert_eq!(inv.chain_status, ChainStatus::Complete);
    assert_eq!(inv.steps[0].attempts, 3);
    assert_eq!(service.calls(), 4);
}

/// TS-RSN-06: permanent failures are not retried; a failed first step leaves the chain incomplete.
#[tokio::test]
async fn test_permanent_first_step_incomplete() {
    let (orch, service) = orchestrator(
        Scripted::new(|_, _| Reply::Fail(ReasoningError::Permanent("401".into()))),
        fast_policy(),
    );
    let ctx = context(DetectorType::BrandCrisis, "Possible crisis for Acme");
    let inv = orch.investigate(&ctx, &CancellationToken::new()).await;
    assert_eq!(service.calls(), 1);
    assert_eq!(inv.chain_status, ChainStatus::Incomplete);
    assert_eq!(inv.overall_confidence, None);
    assert_eq!(inv.steps.len(), 1);
    assert_eq!(inv.steps[0].status, StepStatus::Failed);
    assert_eq!(alert_status_for(&inv), AlertStatus::Open);
}

/// TS-RSN-07: a hung step times out on every attempt.
#[tokio::test]
async fn test_step_timeout() {
    let (orch, service) = orchestrator(Scripted::new(|_, _| Reply::Hang), fast_policy());
    let ctx = context(DetectorType::BrandNewsSurge, "News mention surge for Acme");
    let inv = orch.investigate(&ctx, &CancellationToken::new()).await;
    assert_eq!(service.calls(), 3);
    assert_eq!(inv.chain_status, ChainStatus::Incomplete);
    assert!(inv.steps[0].error.as_deref().unwrap().contains("timed out"));
}

/// TS-RSN-08: a later failure is recorded and the chain continues as partial.
#[tokio::test]
async fn test_later_failure_partial() {
    let (orch, _) = orchestrator(
        Scripted::new(|marker, attempt| match marker {
            "HISTORICAL CONTEXT" => Reply::Fail(ReasoningError::Permanent("400".into())),
            _ => happy(marker, attempt),
        }),
        fast_policy(),
    );
    let ctx = context(DetectorType::MoodShift, "Mood dropped 30pts in social");
    let inv = orch.investigate(&ctx, &CancellationToken::new()).await;
    assert_eq!(inv.chain_status, ChainStatus::Partial);
    assert_eq!(inv.steps.len(), 3);
    assert_eq!(inv.steps[1].status, StepStatus::Failed);
    assert_eq!(inv.overall_confidence, Some(85));
    assert_eq!(alert_status_for(&inv), AlertStatus::Investigated);
}

/// TS-RSN-09: cancellation stops the chain between steps.
#[tokio::test]
async fn test_cancellation() {
    let token = CancellationToken::new();
    let mut service = Scripted::new(happy);
    service.cancel_on = Some(("SITUATION ASSESSMENT", token.clone()));
    let (orch, service) = orchestrator(service, fast_policy());
    let ctx = context(DetectorType::BrandCrisis, "Possible crisis for Acme");
    let inv = orch.investigate(&ctx, &token).await;
    assert_eq!(service.calls(), 1);
    assert_eq!(inv.chain_status, ChainStatus::Partial);
    assert_eq!(inv.steps.len(), 1);
    assert_eq!(inv.recommendation, Recommendation::Monitor);
}

/// TS-RSN-10: many chains run concurrently within the bound and results keep input order.
#[tokio::test]
async fn test_investigate_all_bounded() {
    let mut service = Scripted::new(happy);
    service.delay = Duration::from_millis(5);
    let policy = ChainPolicy {
        max_concurrent_chains: 2,
        ..fast_policy()
    };
    let (orch, service) = orchestrator(service, policy);
    let contexts: Vec<ChainContext> = (0..6)
        .map(|i| context(DetectorType::BrandNewsSurge, &format!("Surge {i}")))
        .collect();
    let results = orch.investigate_all(contexts, &CancellationToken::new()).await;
    assert_eq!(results.len(), 6);
    for (i, inv) in results.iter().enumerate() {
        assert!(inv.summary.starts_with(&format!("Surge {i}")));
        assert_eq!(inv.chain_status, ChainStatus::Complete);
    }
    assert!(service.max_in_flight.load(Ordering::SeqCst) <= 2);
    assert_eq!(service.calls(), 12);
}
