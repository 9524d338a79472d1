//! SentinelRuntime: owns storage, configuration, the event dispatcher and the
//! external collaborators, and exposes the engine's operations.
//!
//! One runtime per database. Cycles, queries and admin operations may run
//! concurrently: storage serializes writes, the cooldown ledger serializes
//! reservations per key, and threshold changes go through the tuning mutex.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use sentinel_analysis::{ChainOrchestrator, ChainPolicy, DetectorRegistry, MemoryCooldownLedger};
use sentinel_core::config::{CooldownBackend, SentinelConfig};
use sentinel_core::errors::{ReasoningError, StorageError, ThresholdError};
use sentinel_core::events::dispatcher::EventDispatcher;
use sentinel_core::events::handler::SentinelEventHandler;
use sentinel_core::events::types::ThresholdAdjustedEvent;
use sentinel_core::traits::{
    Cancellable, CancellationToken, CompetitorDiscovery, ContentFeed, ContentScorer,
    CooldownLedger, FeedbackCapture, MarketDataProvider, NotificationDispatcher, ReasoningService,
};
use sentinel_core::types::{
    AdjustmentSource, Alert, AlertFilter, AlertThreshold, BrandWatch, DetectorType,
    FeedbackAction, PipelineRun, SituationReport, ThresholdAuditEntry,
};
use sentinel_core::PipelineError;
use sentinel_storage::{SqliteCooldownLedger, StorageEngine, ThresholdChange};

use crate::discovery::CompetitorCache;
use crate::reasoning_client::HttpReasoningClient;

// ─── Collaborators ──────────────────────────────────────────────────────────

/// External services the pipeline reads from and writes to.
///
/// Feed and scorer are required. Without market data the market sentiment
/// metric is absent; without discovery no competitive detector runs; without
/// a notifier alerts are persisted but never delivered.
#[derive(Clone)]
pub struct Collaborators {
    pub feed: Arc<dyn ContentFeed>,
    pub scorer: Arc<dyn ContentScorer>,
    pub market: Option<Arc<dyn MarketDataProvider>>,
    pub discovery: Option<Arc<dyn CompetitorDiscovery>>,
    pub notifier: Option<Arc<dyn NotificationDispatcher>>,
}

impl Collaborators {
    pub fn new(feed: Arc<dyn ContentFeed>, scorer: Arc<dyn ContentScorer>) -> Self {
        Self {
            feed,
            scorer,
            market: None,
            discovery: None,
            notifier: None,
        }
    }

    pub fn with_market(mut self, market: Arc<dyn MarketDataProvider>) -> Self {
        self.market = Some(market);
        self
    }

    pub fn with_discovery(mut self, discovery: Arc<dyn CompetitorDiscovery>) -> Self {
        self.discovery = Some(discovery);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationDispatcher>) -> Self {
        self.notifier = Some(notifier);
        self
    }
}

// ─── Options ────────────────────────────────────────────────────────────────

/// Options for constructing the runtime.
#[derive(Debug, Default, Clone)]
pub struct RuntimeOptions {
    /// Path to the database. If None, uses `storage.db_path` or `.sentinel/sentinel.db`.
    pub db_path: Option<PathBuf>,
    /// Project root for `sentinel.toml` lookup and the default database location.
    pub project_root: Option<PathBuf>,
    /// TOML configuration string. Takes precedence over file-based config.
    pub config_toml: Option<String>,
    /// Keep everything in memory. Ignores `db_path`.
    pub in_memory: bool,
}

fn resolve_config(opts: &RuntimeOptions) -> Result<SentinelConfig, PipelineError> {
    let config = match &opts.config_toml {
        Some(toml_str) => {
            let config = SentinelConfig::from_toml(toml_str)?;
            SentinelConfig::validate(&config)?;
            config
        }
        None => match &opts.project_root {
            Some(root) => SentinelConfig::load(root, None)?,
            None => SentinelConfig::default(),
        },
    };
    Ok(config)
}

fn open_storage(opts: &RuntimeOptions, config: &SentinelConfig) -> Result<StorageEngine, StorageError> {
    if opts.in_memory {
        return StorageEngine::open_in_memory();
    }
    let db_path = match &opts.db_path {
        Some(path) => path.clone(),
        None => config
            .storage
            .effective_db_path(opts.project_root.as_deref().unwrap_or_else(|| Path::new("."))),
    };
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| StorageError::SqliteError {
            message: format!("failed to create database directory {}: {e}", parent.display()),
        })?;
    }
    StorageEngine::open(&db_path, config.storage.effective_read_pool_size())
}

// ─── Runtime ────────────────────────────────────────────────────────────────

/// The engine. `R` is the reasoning service driving investigations.
pub struct SentinelRuntime<R = HttpReasoningClient> {
    pub(crate) storage: StorageEngine,
    pub(crate) config: SentinelConfig,
    pub(crate) events: EventDispatcher,
    pub(crate) collaborators: Collaborators,
    pub(crate) cooldown: Arc<dyn CooldownLedger>,
    pub(crate) registry: Arc<DetectorRegistry>,
    pub(crate) competitors: Option<CompetitorCache>,
    pub(crate) orchestrator: Option<ChainOrchestrator<R>>,
    pub(crate) tuning_lock: Mutex<()>,
    pub(crate) cancel: CancellationToken,
}

impl SentinelRuntime<HttpReasoningClient> {
    /// Build a runtime whose investigations go to the configured HTTP
    /// endpoint. Without `reasoning.endpoint` alerts are persisted
    /// uninvestigated.
    pub fn with_http_reasoning(
        opts: RuntimeOptions,
        collaborators: Collaborators,
    ) -> Result<Self, PipelineError> {
        let config = resolve_config(&opts)?;
        let client = if config.reasoning.effective_enabled() {
            match HttpReasoningClient::from_config(&config.reasoning) {
                Ok(client) => Some(client),
                Err(ReasoningError::NotConfigured) => {
                    tracing::info!("no reasoning endpoint configured; investigations disabled");
                    None
                }
                Err(e) => return Err(e.into()),
            }
        } else {
            None
        };
        Self::build(opts, config, collaborators, client)
    }
}

impl<R: ReasoningService> SentinelRuntime<R> {
    pub fn new(
        opts: RuntimeOptions,
        collaborators: Collaborators,
        reasoning: Option<R>,
    ) -> Result<Self, PipelineError> {
        let config = resolve_config(&opts)?;
        Self::build(opts, config, collaborators, reasoning)
    }

    fn build(
        opts: RuntimeOptions,
        config: SentinelConfig,
        collaborators: Collaborators,
        reasoning: Option<R>,
    ) -> Result<Self, PipelineError> {
        let storage = open_storage(&opts, &config)?;

        let cooldown: Arc<dyn CooldownLedger> = match config.cooldown.effective_backend() {
            CooldownBackend::Sqlite => Arc::new(SqliteCooldownLedger::new(storage.database())),
            CooldownBackend::Memory => Arc::new(MemoryCooldownLedger::new()),
        };

        let competitors = match (&collaborators.discovery, config.competitive.effective_enabled()) {
            (Some(discovery), true) => Some(CompetitorCache::new(Arc::clone(discovery), &config.competitive)),
            _ => None,
        };

        let orchestrator = reasoning
            .filter(|_| config.reasoning.effective_enabled())
            .map(|service| ChainOrchestrator::new(Arc::new(service), ChainPolicy::from_config(&config.reasoning)));

        tracing::info!(
            cooldown_backend = ?config.cooldown.effective_backend(),
            reasoning = orchestrator.is_some(),
            competitive = competitors.is_some(),
            "sentinel runtime initialized"
        );

        Ok(Self {
            storage,
            config,
            events: EventDispatcher::new(),
            collaborators,
            cooldown,
            registry: Arc::new(DetectorRegistry::with_defaults()),
            competitors,
            orchestrator,
            tuning_lock: Mutex::new(()),
            cancel: CancellationToken::new(),
        })
    }

    /// Register an event handler.
    pub fn with_handler(mut self, handler: Arc<dyn SentinelEventHandler>) -> Self {
        self.events.register(handler);
        self
    }

    pub fn config(&self) -> &SentinelConfig {
        &self.config
    }

    pub fn storage(&self) -> &StorageEngine {
        &self.storage
    }

    /// The reasoning service behind the chains, when one is configured.
    pub fn reasoning(&self) -> Option<&R> {
        self.orchestrator.as_ref().map(|o| &**o.service())
    }

    /// Stop the in-flight cycle at its next stage boundary. A cancel issued
    /// between cycles stops the next one.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A handle sharing this runtime's cancellation flag.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    // ─── Alerts ─────────────────────────────────────────────────────────────

    pub fn query_alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>, StorageError> {
        self.storage.query_alerts(filter)
    }

    pub fn alert(&self, id: &str) -> Result<Option<Alert>, StorageError> {
        self.storage.alert(id)
    }

    pub fn situation_reports(&self, since: DateTime<Utc>) -> Result<Vec<SituationReport>, StorageError> {
        self.storage.situations_since(since)
    }

    pub fn situation(&self, id: &str) -> Result<Option<SituationReport>, StorageError> {
        self.storage.situation(id)
    }

    pub fn recent_runs(&self, limit: usize) -> Result<Vec<PipelineRun>, StorageError> {
        self.storage.recent_runs(limit)
    }

    // ─── Thresholds ─────────────────────────────────────────────────────────

    pub fn get_thresholds(&self) -> Result<Vec<AlertThreshold>, StorageError> {
        self.storage.thresholds()
    }

    /// Admin override. Values outside the threshold's bounds are rejected;
    /// returns `None` when the value equals the current one.
    pub fn set_threshold(
        &self,
        detector_type: DetectorType,
        value: f64,
        actor: &str,
    ) -> Result<Option<ThresholdAuditEntry>, ThresholdError> {
        let _guard = self.tuning_lock.lock().map_err(|_| ThresholdError::LockPoisoned)?;
        let change = ThresholdChange {
            detector_type,
            new_value: value,
            reason: format!("admin override by {actor}"),
            source: AdjustmentSource::Admin,
        };
        let applied = self.storage.apply_threshold_changes(&[change], Utc::now())?;
        for entry in &applied {
            tracing::info!(
                detector = detector_type.as_str(),
                old_value = entry.old_value,
                new_value = entry.new_value,
                actor,
                "threshold overridden"
            );
            self.emit_adjusted(entry);
        }
        Ok(applied.into_iter().next())
    }

    pub fn threshold_audit_log(
        &self,
        detector_type: Option<DetectorType>,
    ) -> Result<Vec<ThresholdAuditEntry>, StorageError> {
        self.storage.threshold_audit_log(detector_type)
    }

    pub(crate) fn emit_adjusted(&self, entry: &ThresholdAuditEntry) {
        self.events.emit_threshold_adjusted(&ThresholdAdjustedEvent {
            detector_type: entry.threshold_id,
            old_value: entry.old_value,
            new_value: entry.new_value,
            reason: entry.reason.clone(),
        });
    }

    // ─── Watchlist ──────────────────────────────────────────────────────────

    /// Returns whether the watch was new. A newly watched brand gets its
    /// competitor discovery started right away.
    pub fn watch_brand(&self, user: &str, brand: &str) -> Result<bool, StorageError> {
        let brand = brand.trim();
        let added = self.storage.add_watch(
            &BrandWatch {
                user: user.to_string(),
                brand: brand.to_string(),
            },
            Utc::now(),
        )?;
        if added {
            if let Some(cache) = &self.competitors {
                let _ = cache.get_or_refresh(brand);
            }
        }
        Ok(added)
    }

    pub fn unwatch_brand(&self, user: &str, brand: &str) -> Result<bool, StorageError> {
        self.storage.remove_watch(&BrandWatch {
            user: user.to_string(),
            brand: brand.trim().to_string(),
        })
    }

    pub fn watched_brands(&self) -> Result<Vec<String>, StorageError> {
        self.storage.watched_brands()
    }

    // ─── Feedback ───────────────────────────────────────────────────────────

    /// Returns `false` for a repeated `(alert, user, action)`.
    pub fn record_feedback(
        &self,
        alert_id: &str,
        action: FeedbackAction,
        user: &str,
    ) -> Result<bool, StorageError> {
        self.record_feedback_at(alert_id, action, user, Utc::now())
    }

    pub fn record_feedback_at(
        &self,
        alert_id: &str,
        action: FeedbackAction,
        user: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let recorded = self.storage.record(alert_id, action, user, timestamp)?;
        tracing::debug!(alert_id, action = action.as_str(), recorded, "feedback captured");
        Ok(recorded)
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
