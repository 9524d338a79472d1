//! Fake collaborators and runtime fixtures shared by the runtime tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use sentinel_core::errors::{CollaboratorError, ReasoningError};
use sentinel_core::traits::{
    CompetitorDiscovery, ContentFeed, ContentScorer, DeliveryOutcome, MarketDataProvider,
    Notification, NotificationDispatcher, ReasoningPrompt, ReasoningService,
};
use sentinel_core::types::{
    metrics, Alert, AlertDraft, Channel, Competitor, ContentItem, ContentScore, DetectorType,
    MetricSnapshot, Scope, Severity,
};
use sentinel_runtime::{Collaborators, RuntimeOptions, SentinelRuntime};

/// Backoffs short enough that retries never slow a test down.
pub const FAST_CONFIG: &str = r#"
[reasoning]
initial_backoff_ms = 1
max_backoff_ms = 2
step_timeout_ms = 2000
"#;

/// 06:30 UTC, early in the 06:00-12:00 reactive cooldown bucket.
pub fn cycle_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 6, 30, 0).unwrap()
}

/// Midnight UTC at the start of `date`.
pub fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap())
}

// ── Content ──

pub fn neutral_score() -> ContentScore {
    ContentScore {
        empathy_score: 0.5,
        empathy_label: "neutral".into(),
        top_emotions: vec!["curiosity".into()],
        topic: "business".into(),
        intensity: 2.0,
    }
}

pub fn item(id: impl Into<String>, channel: Channel, title: &str, at: DateTime<Utc>) -> ContentItem {
    ContentItem {
        id: id.into(),
        channel,
        source: "wire".into(),
        title: title.into(),
        text: String::new(),
        published_at: at,
        score: None,
    }
}

/// `count` unscored items on `channel` mentioning `brand`, a minute apart
/// before `now`.
pub fn mentions(brand: &str, channel: Channel, count: usize, now: DateTime<Utc>) -> Vec<ContentItem> {
    let tag = match channel {
        Channel::News => "news",
        Channel::Social => "social",
    };
    (0..count)
        .map(|i| {
            item(
                format!("{brand}-{tag}-{i}"),
                channel,
                &format!("{brand} update {i}"),
                now - Duration::minutes(i as i64 + 1),
            )
        })
        .collect()
}

/// Seed `days` prior daily snapshots for a brand with a steady mention count.
pub fn seed_brand_history<R: ReasoningService>(
    runtime: &SentinelRuntime<R>,
    brand: &str,
    days: i64,
    news_per_day: f64,
    social_per_day: f64,
    now: DateTime<Utc>,
) {
    let today = now.date_naive();
    for day in 1..=days {
        let snapshot = MetricSnapshot::new(Scope::brand(brand), today - Duration::days(day))
            .with_metric(metrics::VOLUME, news_per_day + social_per_day)
            .with_metric(metrics::VOLUME_NEWS, news_per_day)
            .with_metric(metrics::VOLUME_SOCIAL, social_per_day)
            .with_metric(metrics::MENTION_COUNT_NEWS, news_per_day)
            .with_metric(metrics::MENTION_COUNT_SOCIAL, social_per_day)
            .with_metric(metrics::AVG_EMPATHY, 0.5)
            .with_metric(metrics::NEGATIVE_EMOTION_SHARE, 0.0);
        runtime.storage().insert_snapshot(&snapshot, now).unwrap();
    }
}

pub fn stored_alert(id: &str, dt: DetectorType, scope: Scope, severity: Severity, at: DateTime<Utc>) -> Alert {
    let draft = AlertDraft::new(dt, scope, severity, at).titled(format!("{} alert", dt.label()), "summary");
    Alert::from_draft(draft, id.to_string(), at)
}

// ── Feed & scorer ──

#[derive(Default)]
pub struct FakeFeed {
    items: Mutex<Vec<ContentItem>>,
    fail: AtomicBool,
}

impl FakeFeed {
    pub fn set_items(&self, items: Vec<ContentItem>) {
        *self.items.lock().unwrap() = items;
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl ContentFeed for FakeFeed {
    fn recent_items(&self, since: DateTime<Utc>) -> Result<Vec<ContentItem>, CollaboratorError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CollaboratorError::Unavailable {
                service: "content feed",
                message: "connection refused".into(),
            });
        }
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|item| item.published_at >= since)
            .cloned()
            .collect())
    }
}

/// Scores every item neutrally; ids starting with `bad` are rejected.
#[derive(Default)]
pub struct FakeScorer {
    pub calls: AtomicUsize,
}

impl ContentScorer for FakeScorer {
    fn score(&self, item: &ContentItem) -> Result<ContentScore, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if item.id.starts_with("bad") {
            return Err(CollaboratorError::InvalidResponse {
                service: "scorer",
                message: "empty text".into(),
            });
        }
        Ok(neutral_score())
    }
}

pub struct FakeMarket(pub Option<f64>);

impl MarketDataProvider for FakeMarket {
    fn daily_indices(&self) -> Result<BTreeMap<String, f64>, CollaboratorError> {
        Ok(BTreeMap::new())
    }

    fn sentiment(&self) -> Result<f64, CollaboratorError> {
        self.0.ok_or_else(|| CollaboratorError::Unavailable {
            service: "market data",
            message: "rate limited".into(),
        })
    }
}

pub struct FakeDiscovery(pub BTreeMap<String, Vec<Competitor>>);

impl FakeDiscovery {
    pub fn single(brand: &str, competitor: &str) -> Self {
        let mut map = BTreeMap::new();
        map.insert(
            brand.to_string(),
            vec![Competitor {
                name: competitor.to_string(),
                confidence: 0.9,
            }],
        );
        Self(map)
    }
}

impl CompetitorDiscovery for FakeDiscovery {
    fn discover(&self, brand: &str) -> Result<Vec<Competitor>, CollaboratorError> {
        Ok(self.0.get(brand).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeNotifier {
    pub sent: Mutex<Vec<Notification>>,
}

impl NotificationDispatcher for FakeNotifier {
    fn send(&self, notification: &Notification) -> Result<DeliveryOutcome, CollaboratorError> {
        self.sent.lock().unwrap().push(notification.clone());
        Ok(DeliveryOutcome::Delivered)
    }
}

// ── Reasoning ──

/// Same text for every analysis step, a fixed verdict for the scoring step.
/// Every user prompt is kept.
pub struct CannedReasoning {
    step: String,
    verdict: String,
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
}

impl CannedReasoning {
    pub fn confident() -> Self {
        Self::new(
            "Coverage rose sharply on one story.\nConfidence: 0.8",
            "Overall confidence: 85\nRecommendation: MONITOR\nReasoning: consistent signal.",
        )
    }

    pub fn doubtful() -> Self {
        Self::new(
            "Probably noise from one syndicated wire story.\nConfidence: 0.1",
            "Overall confidence: 10\nRecommendation: MONITOR",
        )
    }

    pub fn new(step: &str, verdict: &str) -> Self {
        Self {
            step: step.into(),
            verdict: verdict.into(),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

impl ReasoningService for CannedReasoning {
    async fn complete(&self, prompt: &ReasoningPrompt) -> Result<String, ReasoningError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.user.clone());
        if prompt.user.contains("CONFIDENCE ASSESSMENT") {
            Ok(self.verdict.clone())
        } else {
            Ok(self.step.clone())
        }
    }
}

// ── Logs ──

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` under a debug-level subscriber and return its plain-text output.
pub fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .without_time()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buffer.0.lock().unwrap()).into_owned();
    (result, logs)
}

// ── Runtime ──

pub struct Harness {
    pub feed: Arc<FakeFeed>,
    pub scorer: Arc<FakeScorer>,
    pub notifier: Arc<FakeNotifier>,
    pub runtime: SentinelRuntime<CannedReasoning>,
}

pub struct HarnessBuilder {
    reasoning: Option<CannedReasoning>,
    discovery: Option<FakeDiscovery>,
    market: Option<FakeMarket>,
    config: String,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            reasoning: None,
            discovery: None,
            market: None,
            config: FAST_CONFIG.to_string(),
        }
    }

    pub fn reasoning(mut self, reasoning: CannedReasoning) -> Self {
        self.reasoning = Some(reasoning);
        self
    }

    pub fn discovery(mut self, discovery: FakeDiscovery) -> Self {
        self.discovery = Some(discovery);
        self
    }

    pub fn market(mut self, market: FakeMarket) -> Self {
        self.market = Some(market);
        self
    }

    pub fn config(mut self, extra: &str) -> Self {
        self.config.push_str(extra);
        self
    }

    pub fn build(self) -> Harness {
        let feed = Arc::new(FakeFeed::default());
        let scorer = Arc::new(FakeScorer::default());
        let notifier = Arc::new(FakeNotifier::default());
        let mut collaborators = Collaborators::new(feed.clone(), scorer.clone()).with_notifier(notifier.clone());
        if let Some(discovery) = self.discovery {
            collaborators = collaborators.with_discovery(Arc::new(discovery));
        }
        if let Some(market) = self.market {
            collaborators = collaborators.with_market(Arc::new(market));
        }
        let runtime = SentinelRuntime::new(
            RuntimeOptions {
                in_memory: true,
                config_toml: Some(self.config),
                ..Default::default()
            },
            collaborators,
            self.reasoning,
        )
        .unwrap();
        Harness {
            feed,
            scorer,
            notifier,
            runtime,
        }
    }
}
