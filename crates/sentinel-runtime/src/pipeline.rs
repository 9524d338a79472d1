//! One pipeline cycle.
//!
//! capture → detection → cooldown → investigation → persistence →
//! correlation → notification → tuning.
//!
//! Today's capture is transient. A date's snapshots are stored once, by the
//! first cycle after that day closes, from the whole day's content.
//!
//! Cancellation is checked between stages, never between reserving a
//! cooldown key and persisting the alert that owns it.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use tracing::field::Empty;
use tracing::Instrument;
use uuid::Uuid;

use sentinel_analysis::competitive::{build_snapshot, Coverage};
use sentinel_analysis::correlation::{self, CorrelationPolicy};
use sentinel_analysis::detectors::{DetectionContext, DetectionSettings, ThresholdTable};
use sentinel_analysis::reasoning::{alert_status_for, ChainContext};
use sentinel_analysis::snapshot::{capture, CaptureInput};
use sentinel_analysis::tuning::{tune, TuningPolicy, REASON_INSUFFICIENT};
use sentinel_analysis::vlds::{self, VldsPolicy};
use sentinel_core::errors::{CollaboratorError, DetectionError, StorageError, ThresholdError};
use sentinel_core::events::types::{
    AlertCreatedEvent, AlertSuppressedEvent, ChainFinishedEvent, CycleCompletedEvent,
    CycleStartedEvent, ErrorEvent, SituationFormedEvent,
};
use sentinel_core::tracing::metrics;
use sentinel_core::traits::{DeliveryOutcome, Notification, ReasoningService, Reservation};
use sentinel_core::types::{
    AdjustmentSource, Alert, AlertDraft, AlertThreshold, ChainStatus, ContentItem, CycleSummary,
    DetectorType, MetricSnapshot, RunStatus, Scope,
};
use sentinel_core::{PipelineError, SentinelErrorCode};
use sentinel_storage::ThresholdChange;

use crate::runtime::SentinelRuntime;

/// Precedents offered to a chain.
const PRECEDENT_LIMIT: usize = 5;

/// Midnight UTC at the start of `date`.
fn day_start(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Run a blocking collaborator call off the async workers.
async fn blocking<T, F>(service: &'static str, f: F) -> Result<T, CollaboratorError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CollaboratorError::Unavailable {
            service,
            message: e.to_string(),
        })
}

impl<R: ReasoningService> SentinelRuntime<R> {
    pub async fn run_pipeline_cycle(&self) -> Result<CycleSummary, PipelineError> {
        self.run_pipeline_cycle_at(Utc::now()).await
    }

    /// Run one cycle as if the clock read `now`.
    ///
    /// The run is recorded in `pipeline_runs` either way. A failed cycle
    /// keeps whatever it persisted before the failure.
    pub async fn run_pipeline_cycle_at(&self, now: DateTime<Utc>) -> Result<CycleSummary, PipelineError> {
        let started = Instant::now();
        let run_id = self.storage.start_run(now)?;
        let span = tracing::info_span!(
            "pipeline_cycle",
            run_id,
            snapshots_captured = Empty,
            drafts_evaluated = Empty,
            alerts_suppressed = Empty,
            situations_formed = Empty,
            thresholds_adjusted = Empty,
            cycle_duration_ms = Empty,
        );
        self.events.emit_cycle_started(&CycleStartedEvent { run_id });

        let mut summary = CycleSummary::default();
        let outcome = self.cycle(now, &mut summary).instrument(span.clone()).await;
        // A cancel that arrived after the last checkpoint stays pending for
        // the next cycle.
        if matches!(outcome, Err(PipelineError::Cancelled)) {
            self.cancel.reset();
        }

        let elapsed = started.elapsed();
        let duration_ms = elapsed.as_millis() as u64;
        let completed_at = now + Duration::from_std(elapsed).unwrap_or_else(|_| Duration::zero());
        span.record(metrics::SNAPSHOTS_CAPTURED, summary.snapshots_captured as u64);
        span.record(metrics::DRAFTS_EVALUATED, summary.drafts_evaluated as u64);
        span.record(metrics::ALERTS_SUPPRESSED, summary.alerts_suppressed as u64);
        span.record(metrics::SITUATIONS_FORMED, summary.situations_formed as u64);
        span.record(metrics::THRESHOLDS_ADJUSTED, summary.thresholds_adjusted as u64);
        span.record(metrics::CYCLE_DURATION, duration_ms);

        match outcome {
            Ok(()) => {
                self.storage.complete_run(
                    run_id,
                    completed_at,
                    RunStatus::Success,
                    summary.alerts_created as u64,
                    None,
                )?;
                tracing::info!(
                    parent: &span,
                    alerts_created = summary.alerts_created,
                    bailouts = summary.bailouts,
                    notifications_sent = summary.notifications_sent,
                    competitive_skipped = summary.competitive_skipped,
                    "pipeline cycle complete"
                );
                self.events.emit_cycle_completed(&CycleCompletedEvent {
                    run_id,
                    alerts_created: summary.alerts_created,
                    alerts_suppressed: summary.alerts_suppressed,
                    situations_formed: summary.situations_formed,
                    thresholds_adjusted: summary.thresholds_adjusted,
                    duration_ms,
                });
                Ok(summary)
            }
            Err(e) => {
                let message = e.to_string();
                if let Err(store_err) = self.storage.complete_run(
                    run_id,
                    completed_at,
                    RunStatus::Failed,
                    summary.alerts_created as u64,
                    Some(&message),
                ) {
                    tracing::error!(run_id, error = %store_err, "failed to record run failure");
                }
                tracing::error!(parent: &span, error = %e.coded_string(), "pipeline cycle failed");
                self.events.emit_error(&ErrorEvent {
                    message,
                    error_code: e.error_code().to_string(),
                });
                Err(e)
            }
        }
    }

    async fn cycle(&self, now: DateTime<Utc>, summary: &mut CycleSummary) -> Result<(), PipelineError> {
        self.checkpoint()?;
        let thresholds = self.storage.thresholds()?;
        let brands = self.storage.watched_brands()?;

        // ─── Capture ────────────────────────────────────────────────────────
        let items = self.fetch_items(now).await?;
        let market_sentiment = self.market_sentiment().await;
        let competitors = self.competitor_lists(&brands, summary);
        let competitor_names: Vec<String> = competitors
            .values()
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        self.close_previous_day(now, &items, &brands, &competitor_names, summary)?;
        let snapshots = capture(CaptureInput {
            items: &items,
            market_sentiment,
            brands: &brands,
            competitors: &competitor_names,
            now,
        });
        tracing::debug!(items = items.len(), snapshots = snapshots.len(), "snapshots captured");
        self.checkpoint()?;

        // ─── Detection ──────────────────────────────────────────────────────
        let contexts = self.build_contexts(now, snapshots, &competitors, &thresholds)?;
        let drafts = self.evaluate(contexts).await?;
        summary.drafts_evaluated = drafts.len();
        self.checkpoint()?;

        // ─── Cooldown, investigation, persistence ───────────────────────────
        let alerts = self.reserve(drafts, now, summary);
        let alerts = self.investigate(alerts, now, summary).await;
        let persisted = self.persist(alerts, summary);
        self.checkpoint()?;

        // ─── Correlation ────────────────────────────────────────────────────
        self.correlate(now, summary).await?;

        // ─── Notification ───────────────────────────────────────────────────
        self.notify(&persisted, summary).await;
        self.checkpoint()?;

        // ─── Tuning ─────────────────────────────────────────────────────────
        summary.thresholds_adjusted = self.run_tuning_pass(now)?;
        Ok(())
    }

    fn checkpoint(&self) -> Result<(), PipelineError> {
        if self.is_cancelled() {
            tracing::info!("pipeline cycle cancelled");
            return Err(PipelineError::Cancelled);
        }
        Ok(())
    }

    // ─── Capture ────────────────────────────────────────────────────────────

    /// Feed items since the start of yesterday with every item scored. Items
    /// the scorer rejects are dropped. A feed failure fails the cycle.
    async fn fetch_items(&self, now: DateTime<Utc>) -> Result<Vec<ContentItem>, PipelineError> {
        let feed = Arc::clone(&self.collaborators.feed);
        let scorer = Arc::clone(&self.collaborators.scorer);
        let since = day_start(now.date_naive() - Duration::days(1));
        let items = blocking("content feed", move || {
            let mut items = feed.recent_items(since)?;
            items.retain_mut(|item| {
                if item.score.is_some() {
                    return true;
                }
                match scorer.score(item) {
                    Ok(score) => {
                        item.score = Some(score);
                        true
                    }
                    Err(e) => {
                        tracing::warn!(item_id = %item.id, error = %e, "content scoring failed, item dropped");
                        false
                    }
                }
            });
            Ok::<_, CollaboratorError>(items)
        })
        .await??;
        Ok(items)
    }

    /// Store yesterday's full-day snapshots unless that day is already
    /// closed. Days without a run are left absent so they read as missing
    /// history rather than as a quiet day. Market sentiment is a live reading
    /// and is not carried into a closed day.
    fn close_previous_day(
        &self,
        now: DateTime<Utc>,
        items: &[ContentItem],
        brands: &[String],
        competitors: &[String],
        summary: &mut CycleSummary,
    ) -> Result<(), StorageError> {
        let today_start = day_start(now.date_naive());
        let yesterday_start = today_start - Duration::days(1);
        let yesterday = yesterday_start.date_naive();
        if self.storage.snapshot(&Scope::Global, yesterday)?.is_some()
            || self.storage.runs_started_between(yesterday_start, today_start)? == 0
        {
            return Ok(());
        }

        let snapshots = capture(CaptureInput {
            items,
            market_sentiment: None,
            brands,
            competitors,
            now: today_start - Duration::seconds(1),
        });
        for snapshot in &snapshots {
            if self.storage.insert_snapshot(snapshot, now)? {
                summary.snapshots_captured += 1;
            }
        }
        tracing::info!(
            date = %yesterday,
            snapshots = summary.snapshots_captured,
            "previous day closed"
        );
        Ok(())
    }

    async fn market_sentiment(&self) -> Option<f64> {
        let market = self.collaborators.market.clone()?;
        match blocking("market data", move || market.sentiment()).await {
            Ok(Ok(sentiment)) => Some(sentiment.clamp(0.0, 1.0)),
            Ok(Err(e)) | Err(e) => {
                tracing::warn!(error = %e, "market sentiment unavailable");
                None
            }
        }
    }

    /// Competitor names per brand, from the discovery cache. A brand whose
    /// competitors are not cached yet is skipped this cycle.
    fn competitor_lists(&self, brands: &[String], summary: &mut CycleSummary) -> BTreeMap<String, Vec<String>> {
        let mut lists = BTreeMap::new();
        let Some(cache) = &self.competitors else {
            return lists;
        };
        for brand in brands {
            match cache.get_or_refresh(brand) {
                Some(found) => {
                    if !found.is_empty() {
                        lists.insert(brand.clone(), found.iter().map(|c| c.name.clone()).collect());
                    }
                }
                None => {
                    summary.competitive_skipped += 1;
                    tracing::debug!(brand = %brand, "competitors not cached, competitive detectors skipped");
                }
            }
        }
        lists
    }

    /// Run discovery for `brand` now instead of waiting for a cache miss.
    /// Returns the number of competitors kept.
    pub fn refresh_competitors(&self, brand: &str) -> Result<usize, CollaboratorError> {
        match &self.competitors {
            Some(cache) => cache.refresh(brand).map(|found| found.len()),
            None => Ok(0),
        }
    }

    // ─── Detection ──────────────────────────────────────────────────────────

    /// One context for the global scope and one per watched brand. Competitor
    /// snapshots only feed the brands' competitive comparison.
    fn build_contexts(
        &self,
        now: DateTime<Utc>,
        snapshots: Vec<MetricSnapshot>,
        competitors: &BTreeMap<String, Vec<String>>,
        thresholds: &[AlertThreshold],
    ) -> Result<Vec<DetectionContext>, StorageError> {
        let today = now.date_naive();
        let yesterday = today - Duration::days(1);
        let policy = VldsPolicy::from_config(&self.config.vlds);
        let lookback = self.config.detection.effective_predictive_lookback_days();
        let span_days = self
            .config
            .detection
            .effective_history_days()
            .max(policy.history_span() + lookback);
        let from = today - Duration::days(i64::from(span_days));
        let table = ThresholdTable::from_thresholds(thresholds);
        let settings = DetectionSettings::from_config(&self.config.detection);

        let (competitor_snapshots, scoped): (Vec<_>, Vec<_>) = snapshots
            .into_iter()
            .partition(|s| matches!(s.scope, Scope::Competitor(_)));
        let competitor_today: HashMap<String, MetricSnapshot> = competitor_snapshots
            .into_iter()
            .filter_map(|s| s.scope.name().map(str::to_string).map(|name| (name, s)))
            .collect();

        let mut contexts = Vec::with_capacity(scoped.len());
        for snapshot in scoped {
            let scope = snapshot.scope.clone();
            let history = self.storage.snapshot_history(&scope, from, yesterday)?;
            let mut ctx = DetectionContext::new(scope.clone(), now, snapshot.clone())
                .with_thresholds(table.clone())
                .with_settings(settings.clone());

            if let Scope::Brand(brand) = &scope {
                let mut all = history.clone();
                all.push(snapshot.clone());
                let score = vlds::score(&policy, &scope, today, &all);
                let previous = vlds::score(&policy, &scope, yesterday, &all);
                let series = vlds::score_series(&policy, &scope, today, lookback, &all);

                if let Some(names) = competitors.get(brand) {
                    let mut coverage = Vec::with_capacity(names.len());
                    for name in names {
                        let Some(competitor_snapshot) = competitor_today.get(name) else {
                            continue;
                        };
                        let competitor_scope = Scope::competitor(name.clone());
                        let mut competitor_all =
                            self.storage.snapshot_history(&competitor_scope, from, yesterday)?;
                        competitor_all.push(competitor_snapshot.clone());
                        let competitor_vlds = vlds::score(&policy, &competitor_scope, today, &competitor_all);
                        coverage.push(Coverage::from_snapshot(name.clone(), competitor_snapshot, competitor_vlds));
                    }
                    if !coverage.is_empty() {
                        let current = build_snapshot(
                            today,
                            Coverage::from_snapshot(brand.clone(), &snapshot, score.clone()),
                            coverage,
                        );
                        let previous_competitive = self.storage.previous_competitive_snapshot(brand, today)?;
                        self.storage.upsert_competitive_snapshot(&current)?;
                        ctx = ctx.with_competitive(current, previous_competitive);
                    }
                }
                ctx = ctx.with_vlds(score, Some(previous), series);
            }
            contexts.push(ctx.with_history(history));
        }
        Ok(contexts)
    }

    async fn evaluate(&self, contexts: Vec<DetectionContext>) -> Result<Vec<AlertDraft>, PipelineError> {
        let registry = Arc::clone(&self.registry);
        let parallel = self.config.detection.effective_parallel();
        let scopes = contexts.len();
        let started = Instant::now();
        let drafts = tokio::task::spawn_blocking(move || registry.evaluate_all(&contexts, parallel))
            .await
            .map_err(|e| DetectionError::DetectorPanic {
                detector: "registry".to_string(),
                message: e.to_string(),
            })?;
        tracing::info!(
            scopes,
            drafts = drafts.len(),
            detection_time_ms = started.elapsed().as_millis() as u64,
            "detectors evaluated"
        );
        Ok(drafts)
    }

    // ─── Cooldown ───────────────────────────────────────────────────────────

    /// Drafts that won their cooldown key, as open alerts. A held key bumps
    /// the holder's `last_seen`; a ledger failure suppresses the draft.
    fn reserve(&self, drafts: Vec<AlertDraft>, now: DateTime<Utc>, summary: &mut CycleSummary) -> Vec<Alert> {
        let mut alerts = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let id = Uuid::new_v4().to_string();
            match self.cooldown.reserve(&draft.cooldown_key, &id, now) {
                Ok(Reservation::Granted) => alerts.push(Alert::from_draft(draft, id, now)),
                Ok(Reservation::Held { alert_id }) => {
                    summary.alerts_suppressed += 1;
                    if let Err(e) = self.storage.touch_alert(&alert_id, now) {
                        tracing::warn!(alert_id = %alert_id, error = %e, "failed to bump last_seen");
                    }
                    tracing::debug!(
                        cooldown_key = %draft.cooldown_key,
                        held_by = %alert_id,
                        "alert suppressed by cooldown"
                    );
                    self.events.emit_alert_suppressed(&AlertSuppressedEvent {
                        cooldown_key: draft.cooldown_key.to_string(),
                        held_by: alert_id,
                    });
                }
                Err(e) => {
                    summary.alerts_suppressed += 1;
                    tracing::warn!(
                        cooldown_key = %draft.cooldown_key,
                        error = %e.coded_string(),
                        "cooldown reservation failed, draft suppressed"
                    );
                }
            }
        }
        alerts
    }

    // ─── Investigation ──────────────────────────────────────────────────────

    async fn investigate(&self, mut alerts: Vec<Alert>, now: DateTime<Utc>, summary: &mut CycleSummary) -> Vec<Alert> {
        let Some(orchestrator) = &self.orchestrator else {
            return alerts;
        };
        if alerts.is_empty() {
            return alerts;
        }

        let since = now - Duration::days(i64::from(orchestrator.policy().precedent_days));
        let precedents = self.precedents(&alerts, since).await;
        let contexts: Vec<ChainContext> = alerts
            .iter()
            .zip(precedents)
            .map(|(alert, precedents)| {
                let peers = alerts
                    .iter()
                    .filter(|other| other.id != alert.id)
                    .map(|other| other.title.clone())
                    .collect();
                ChainContext::new(alert.clone())
                    .with_precedents(precedents)
                    .with_cycle_peers(peers)
            })
            .collect();

        let investigations = orchestrator.investigate_all(contexts, &self.cancel).await;
        for (alert, investigation) in alerts.iter_mut().zip(investigations) {
            alert.status = alert_status_for(&investigation);
            alert.confidence = investigation.overall_confidence;
            if investigation.chain_status == ChainStatus::Bailout {
                summary.bailouts += 1;
            }
            self.events.emit_chain_finished(&ChainFinishedEvent {
                alert_id: alert.id.clone(),
                status: investigation.chain_status,
                steps_completed: investigation.completed_steps().count(),
                confidence: investigation.overall_confidence,
            });
            alert.investigation = Some(investigation);
        }
        alerts
    }

    /// Earlier alerts of the same type and scope, one list per alert.
    async fn precedents(&self, alerts: &[Alert], since: DateTime<Utc>) -> Vec<Vec<Alert>> {
        let storage = self.storage.clone();
        let keys: Vec<(String, DetectorType, Scope)> = alerts
            .iter()
            .map(|a| (a.id.clone(), a.detector_type, a.scope.clone()))
            .collect();
        let lookup = blocking("alert store", move || {
            keys.into_iter()
                .map(|(id, detector_type, scope)| {
                    let mut found = storage
                        .precedent_alerts(detector_type, since, &id, PRECEDENT_LIMIT * 4)
                        .unwrap_or_else(|e| {
                            tracing::warn!(alert_id = %id, error = %e, "precedent lookup failed");
                            Vec::new()
                        });
                    found.retain(|p| p.scope == scope);
                    found.truncate(PRECEDENT_LIMIT);
                    found
                })
                .collect::<Vec<_>>()
        })
        .await;
        lookup.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "precedent lookup failed");
            vec![Vec::new(); alerts.len()]
        })
    }

    // ─── Persistence ────────────────────────────────────────────────────────

    /// Persist each alert on its own. A failed insert releases the alert's
    /// cooldown key so the next cycle can raise it again.
    fn persist(&self, alerts: Vec<Alert>, summary: &mut CycleSummary) -> Vec<Alert> {
        let mut persisted = Vec::with_capacity(alerts.len());
        for alert in alerts {
            if let Err(e) = self.storage.insert_alert(&alert) {
                tracing::error!(alert_id = %alert.id, error = %e.coded_string(), "alert persistence failed");
                if let Err(release_err) = self.cooldown.release(&alert.cooldown_key) {
                    tracing::warn!(cooldown_key = %alert.cooldown_key, error = %release_err, "cooldown release failed");
                }
                self.events.emit_error(&ErrorEvent {
                    message: e.to_string(),
                    error_code: e.error_code().to_string(),
                });
                continue;
            }
            summary.alerts_created += 1;
            tracing::info!(
                alert_id = %alert.id,
                detector = alert.detector_type.as_str(),
                scope = %alert.scope,
                severity = alert.severity.as_str(),
                status = alert.status.as_str(),
                promoted = alert.promoted,
                "alert created"
            );
            self.events.emit_alert_created(&AlertCreatedEvent {
                alert_id: alert.id.clone(),
                detector_type: alert.detector_type,
                scope: alert.scope.clone(),
                severity: alert.severity,
                promoted: alert.promoted,
            });
            persisted.push(alert);
        }
        persisted
    }

    // ─── Correlation ────────────────────────────────────────────────────────

    async fn correlate(&self, now: DateTime<Utc>, summary: &mut CycleSummary) -> Result<(), StorageError> {
        if !self.config.correlation.effective_enabled() {
            return Ok(());
        }
        let policy = CorrelationPolicy::from_config(&self.config.correlation);
        let candidates = self.storage.uncorrelated_alerts_since(policy.window_start(now))?;
        if candidates.len() < 2 {
            return Ok(());
        }
        let service: Option<&R> = self.orchestrator.as_ref().map(|o| &**o.service());
        for report in correlation::correlate(&candidates, &policy, service, now).await {
            let linked = self.storage.insert_situation(&report)?;
            summary.situations_formed += 1;
            tracing::debug!(situation_id = %report.id, linked, "situation persisted");
            self.events.emit_situation_formed(&SituationFormedEvent {
                situation_id: report.id.clone(),
                member_count: report.member_alert_ids.len(),
            });
        }
        Ok(())
    }

    // ─── Notification ───────────────────────────────────────────────────────

    /// Hand critical, warning and promoted alerts to the dispatcher. Brand
    /// alerts go to the brand's watchers. Delivery failures are logged and
    /// leave the alert un-notified.
    async fn notify(&self, alerts: &[Alert], summary: &mut CycleSummary) {
        let Some(notifier) = &self.collaborators.notifier else {
            return;
        };
        for alert in alerts.iter().filter(|a| a.should_notify()) {
            let recipients = match &alert.scope {
                Scope::Brand(brand) => self.storage.watchers_of(brand).unwrap_or_else(|e| {
                    tracing::warn!(brand = %brand, error = %e, "watcher lookup failed");
                    Vec::new()
                }),
                _ => Vec::new(),
            };
            let notification = Notification {
                alert_id: alert.id.clone(),
                severity: alert.severity,
                title: alert.title.clone(),
                summary: alert.summary.clone(),
                promoted: alert.promoted,
                recipients,
            };
            let notifier = Arc::clone(notifier);
            match blocking("notifier", move || notifier.send(&notification)).await {
                Ok(Ok(DeliveryOutcome::Delivered)) => match self.storage.mark_notified(&alert.id) {
                    Ok(()) => summary.notifications_sent += 1,
                    Err(e) => tracing::warn!(alert_id = %alert.id, error = %e, "failed to mark alert notified"),
                },
                Ok(Ok(DeliveryOutcome::Skipped { reason })) => {
                    tracing::debug!(alert_id = %alert.id, reason = %reason, "notification skipped");
                }
                Ok(Err(e)) | Err(e) => {
                    tracing::warn!(alert_id = %alert.id, error = %e, "notification delivery failed");
                }
            }
        }
    }

    // ─── Tuning ─────────────────────────────────────────────────────────────

    /// Adjust thresholds from feedback recorded since the last pass.
    ///
    /// Every detector with feedback gets a logged decision. The watermark
    /// only moves once some detector has enough feedback for a real decision;
    /// smaller windows keep accumulating. Returns the number of thresholds
    /// changed.
    pub fn run_tuning_pass(&self, now: DateTime<Utc>) -> Result<usize, PipelineError> {
        if !self.config.tuning.effective_enabled() {
            return Ok(0);
        }
        let _guard = self.tuning_lock.lock().map_err(|_| ThresholdError::LockPoisoned)?;

        let window = self.storage.pending_feedback()?;
        if window.tallies.is_empty() {
            return Ok(0);
        }
        let policy = TuningPolicy::from_config(&self.config.tuning);
        let thresholds = self.storage.thresholds()?;
        let decisions = tune(&thresholds, &window.tallies, &policy);
        if decisions.iter().all(|d| d.reason == REASON_INSUFFICIENT) {
            tracing::debug!(detectors = decisions.len(), "feedback window kept open");
            return Ok(0);
        }

        let changes: Vec<ThresholdChange> = decisions
            .into_iter()
            .filter(|d| d.is_change())
            .map(|d| ThresholdChange {
                detector_type: d.detector_type,
                new_value: d.new_value,
                reason: d.reason.to_string(),
                source: AdjustmentSource::Tuner,
            })
            .collect();
        let applied = if changes.is_empty() {
            Vec::new()
        } else {
            self.storage.apply_threshold_changes(&changes, now)?
        };
        self.storage.advance_tuner_watermark(window.max_id, now)?;

        for entry in &applied {
            self.emit_adjusted(entry);
        }
        tracing::info!(
            adjusted = applied.len(),
            watermark = window.max_id,
            "tuning pass complete"
        );
        Ok(applied.len())
    }
}
