//! StorageEngine tests: alerts, thresholds, feedback, situations, runs.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use sentinel_core::errors::ThresholdError;
use sentinel_core::types::*;
use sentinel_storage::{StorageEngine, ThresholdChange};

fn alert(id: &str, dt: DetectorType, scope: Scope, at: chrono::DateTime<Utc>) -> Alert {
    let draft = AlertDraft::new(dt, scope, Severity::Warning, at)
        .titled(format!("{} alert", dt.label()), "summary text")
        .metric("value", 1.0);
    Alert::from_draft(draft, id.to_string(), at)
}

// ── Snapshots ──

/// TS-ENG-01: snapshots are immutable once written.
#[test]
fn test_snapshot_insert_is_do_nothing() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    let now = Utc::now();
    let first = MetricSnapshot::new(Scope::brand("Acme"), date).with_metric(metrics::VOLUME, 10.0);
    let second = MetricSnapshot::new(Scope::brand("Acme"), date).with_metric(metrics::VOLUME, 99.0);

    assert!(engine.insert_snapshot(&first, now).unwrap());
    assert!(!engine.insert_snapshot(&second, now).unwrap());

    let stored = engine.snapshot(&Scope::brand("Acme"), date).unwrap().unwrap();
    assert_eq!(stored.get(metrics::VOLUME), Some(10.0));
}

/// TS-ENG-02: history is returned oldest first within the range.
#[test]
fn test_snapshot_history_range() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let base = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    for i in 0..5 {
        let snap = MetricSnapshot::new(Scope::Global, base + Duration::days(i))
            .with_metric(metrics::VOLUME, i as f64);
        engine.insert_snapshot(&snap, Utc::now()).unwrap();
    }
    let history = engine
        .snapshot_history(&Scope::Global, base + Duration::days(1), base + Duration::days(3))
        .unwrap();
    let volumes: Vec<f64> = history.iter().map(|s| s.get_or_zero(metrics::VOLUME)).collect();
    assert_eq!(volumes, vec![1.0, 2.0, 3.0]);
}

// ── Thresholds ──

/// TS-ENG-03: accepted changes are audited; unchanged values are skipped.
#[test]
fn test_threshold_change_audited() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let now = Utc::now();
    let entries = engine
        .apply_threshold_changes(
            &[
                ThresholdChange {
                    detector_type: DetectorType::MoodShift,
                    new_value: 16.5,
                    reason: "high dismissal rate".into(),
                    source: AdjustmentSource::Tuner,
                },
                ThresholdChange {
                    detector_type: DetectorType::BrandCrisis,
                    new_value: 2.0,
                    reason: "no-op".into(),
                    source: AdjustmentSource::Admin,
                },
            ],
            now,
        )
        .unwrap();
    assert_eq!(entries.len(), 1);

    let mood = engine.threshold(DetectorType::MoodShift).unwrap().unwrap();
    assert_eq!(mood.current_value, 16.5);
    let log = engine.threshold_audit_log(Some(DetectorType::MoodShift)).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].old_value, 15.0);
    assert_eq!(log[0].reason, "high dismissal rate");
    assert!(engine.threshold_audit_log(Some(DetectorType::BrandCrisis)).unwrap().is_empty());
}

/// TS-ENG-04: one out-of-bounds change rolls back the whole batch.
#[test]
fn test_out_of_bounds_rolls_back_batch() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let result = engine.apply_threshold_changes(
        &[
            ThresholdChange {
                detector_type: DetectorType::MoodShift,
                new_value: 20.0,
                reason: "admin".into(),
                source: AdjustmentSource::Admin,
            },
            ThresholdChange {
                detector_type: DetectorType::BrandVelocitySpike,
                new_value: 7.0,
                reason: "admin".into(),
                source: AdjustmentSource::Admin,
            },
        ],
        Utc::now(),
    );
    assert!(matches!(result, Err(ThresholdError::OutOfBounds { .. })));
    let mood = engine.threshold(DetectorType::MoodShift).unwrap().unwrap();
    assert_eq!(mood.current_value, 15.0);
    assert!(engine.threshold_audit_log(None).unwrap().is_empty());
}

proptest! {
    /// TS-ENG-05: stored values never leave [0.5x, 2x] default, whatever is requested.
    #[test]
    fn prop_threshold_stays_in_bounds(factor in 0.1f64..4.0) {
        let engine = StorageEngine::open_in_memory().unwrap();
        let dt = DetectorType::BrandVelocitySpike;
        let requested = dt.default_threshold() * factor;
        let result = engine.apply_threshold_changes(
            &[ThresholdChange {
                detector_type: dt,
                new_value: requested,
                reason: "prop".into(),
                source: AdjustmentSource::Admin,
            }],
            Utc::now(),
        );
        let stored = engine.threshold(dt).unwrap().unwrap();
        prop_assert!(stored.current_value >= stored.lower_bound);
        prop_assert!(stored.current_value <= stored.upper_bound);
        if (0.5..=2.0).contains(&factor) {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(result.is_err());
        }
    }
}

// ── Alerts ──

/// TS-ENG-06: alerts survive a round trip including the investigation.
#[test]
fn test_alert_round_trip_with_investigation() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let now = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
    let mut a = alert("a-1", DetectorType::BrandCrisis, Scope::brand("Acme"), now);
    a.status = AlertStatus::Investigated;
    a.confidence = Some(72);
    a.investigation = Some(Investigation {
        steps: vec![StepResult {
            kind: StepKind::SituationAssessment,
            status: StepStatus::Completed,
            content: "Coverage is hostile".into(),
            confidence: 72,
            attempts: 1,
            likely_causes: vec![],
            recommended_actions: vec![],
            frameworks: vec![],
            error: None,
        }],
        chain_status: ChainStatus::Partial,
        overall_confidence: Some(72),
        recommendation: Recommendation::Monitor,
        summary: "Brand crisis alert".into(),
    });
    engine.insert_alert(&a).unwrap();

    let stored = engine.alert("a-1").unwrap().unwrap();
    assert_eq!(stored, a);
}

/// TS-ENG-07: filters narrow results, newest first.
#[test]
fn test_query_alerts_filters() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let t0 = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
    engine
        .insert_alert(&alert("a-1", DetectorType::MoodShift, Scope::Global, t0))
        .unwrap();
    engine
        .insert_alert(&alert(
            "a-2",
            DetectorType::BrandNewsSurge,
            Scope::brand("Acme"),
            t0 + Duration::hours(1),
        ))
        .unwrap();
    engine
        .insert_alert(&alert(
            "a-3",
            DetectorType::BrandNewsSurge,
            Scope::brand("Globex"),
            t0 + Duration::hours(2),
        ))
        .unwrap();

    let all = engine.query_alerts(&AlertFilter::default()).unwrap();
    let ids: Vec<_> = all.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["a-3", "a-2", "a-1"]);

    let surges = engine
        .query_alerts(&AlertFilter {
            detector_type: Some(DetectorType::BrandNewsSurge),
            limit: Some(1),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(surges.len(), 1);
    assert_eq!(surges[0].id, "a-3");

    let acme = engine
        .query_alerts(&AlertFilter {
            scope: Some(Scope::brand("Acme")),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(acme.len(), 1);

    let recent = engine
        .query_alerts(&AlertFilter {
            since: Some(t0 + Duration::minutes(30)),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(recent.len(), 2);
}

/// TS-ENG-08: touching an alert only moves last_seen forward.
#[test]
fn test_touch_alert() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let t0 = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
    engine
        .insert_alert(&alert("a-1", DetectorType::BrandNewsSurge, Scope::brand("Acme"), t0))
        .unwrap();
    assert!(engine.touch_alert("a-1", t0 + Duration::hours(2)).unwrap());
    engine.touch_alert("a-1", t0).unwrap();
    let stored = engine.alert("a-1").unwrap().unwrap();
    assert_eq!(stored.last_seen, t0 + Duration::hours(2));
    assert_eq!(stored.created_at, t0);
}

// ── Situations ──

/// TS-ENG-09: situations link members and leave them out of the uncorrelated set.
#[test]
fn test_situation_links_members() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let t0 = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
    for id in ["a-1", "a-2", "a-3"] {
        engine
            .insert_alert(&alert(id, DetectorType::BrandCrisis, Scope::brand("Acme"), t0))
            .unwrap();
    }
    let report = SituationReport {
        id: "s-1".into(),
        title: "Situation Report: x + y".into(),
        member_alert_ids: vec!["a-1".into(), "a-2".into()],
        narrative: "narrative".into(),
        created_at: t0,
        window_start: t0 - Duration::hours(3),
    };
    assert_eq!(engine.insert_situation(&report).unwrap(), 2);

    let open = engine.uncorrelated_alerts_since(t0 - Duration::hours(1)).unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].id, "a-3");
    assert_eq!(engine.situation("s-1").unwrap().unwrap(), report);
    let correlated = engine
        .query_alerts(&AlertFilter {
            correlated_only: true,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(correlated.len(), 2);
}

// ── Feedback ──

/// TS-ENG-10: feedback is unique per (alert, user, action) and tallied after the watermark.
#[test]
fn test_feedback_window_and_watermark() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let now = Utc::now();
    engine
        .insert_alert(&alert("a-1", DetectorType::MoodShift, Scope::Global, now))
        .unwrap();

    let fb = |user: &str, action| AlertFeedback {
        alert_id: "a-1".into(),
        user: user.into(),
        action,
        timestamp: now,
    };
    assert!(engine.record_feedback(&fb("u1", FeedbackAction::ThumbsDown)).unwrap());
    assert!(!engine.record_feedback(&fb("u1", FeedbackAction::ThumbsDown)).unwrap());
    assert!(engine.record_feedback(&fb("u2", FeedbackAction::ThumbsUp)).unwrap());

    let window = engine.pending_feedback().unwrap();
    let tally = window.tallies[&DetectorType::MoodShift];
    assert_eq!((tally.thumbs_down, tally.thumbs_up), (1, 1));

    engine.advance_tuner_watermark(window.max_id, now).unwrap();
    assert!(engine.pending_feedback().unwrap().tallies.is_empty());

    engine.record_feedback(&fb("u3", FeedbackAction::Expand)).unwrap();
    let window = engine.pending_feedback().unwrap();
    assert_eq!(window.tallies[&DetectorType::MoodShift].expand, 1);
    assert_eq!(window.tallies[&DetectorType::MoodShift].total(), 1);
}

/// TS-ENG-11: feedback on an unknown alert is rejected.
#[test]
fn test_feedback_unknown_alert() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let result = engine.record_feedback(&AlertFeedback {
        alert_id: "missing".into(),
        user: "u1".into(),
        action: FeedbackAction::ThumbsUp,
        timestamp: Utc::now(),
    });
    assert!(result.is_err());
}

// ── Watchlist, competitive, runs ──

/// TS-ENG-12: watchlist add/remove and watcher lookup.
#[test]
fn test_watchlist() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let now = Utc::now();
    let w = |u: &str, b: &str| BrandWatch {
        user: u.into(),
        brand: b.into(),
    };
    assert!(engine.add_watch(&w("u1", "Acme"), now).unwrap());
    assert!(!engine.add_watch(&w("u1", "Acme"), now).unwrap());
    engine.add_watch(&w("u2", "Acme"), now).unwrap();
    engine.add_watch(&w("u2", "Globex"), now).unwrap();

    assert_eq!(engine.watched_brands().unwrap(), vec!["Acme", "Globex"]);
    assert_eq!(engine.watchers_of("Acme").unwrap(), vec!["u1", "u2"]);
    assert!(engine.remove_watch(&w("u2", "Globex")).unwrap());
    assert_eq!(engine.watched_brands().unwrap(), vec!["Acme"]);
}

/// TS-ENG-13: the previous competitive snapshot excludes today.
#[test]
fn test_previous_competitive_snapshot() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let d1 = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    let d2 = d1 + Duration::days(1);
    let snap = |date, mentions| CompetitiveSnapshot {
        brand: "Acme".into(),
        date,
        brand_mentions: mentions,
        competitor_mentions: Default::default(),
        share_of_voice: Default::default(),
        brand_vlds: None,
        competitor_vlds: Default::default(),
        gaps: Default::default(),
    };
    engine.upsert_competitive_snapshot(&snap(d1, 5)).unwrap();
    engine.upsert_competitive_snapshot(&snap(d2, 9)).unwrap();
    engine.upsert_competitive_snapshot(&snap(d2, 11)).unwrap();

    let prev = engine.previous_competitive_snapshot("Acme", d2).unwrap().unwrap();
    assert_eq!(prev.brand_mentions, 5);
    assert!(engine.previous_competitive_snapshot("Acme", d1).unwrap().is_none());
}

/// TS-ENG-14: pipeline runs record completion.
#[test]
fn test_pipeline_runs() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let now = Utc::now();
    let id = engine.start_run(now).unwrap();
    engine
        .complete_run(id, now, RunStatus::Failed, 0, Some("feed unavailable"))
        .unwrap();
    let runs = engine.recent_runs(5).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, RunStatus::Failed);
    assert_eq!(runs[0].error_message.as_deref(), Some("feed unavailable"));
}

/// TS-ENG-15: run counts cover a half-open time range.
#[test]
fn test_runs_started_between() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let midnight = Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap();
    for at in [
        midnight - Duration::hours(1),
        midnight,
        midnight + Duration::hours(23),
        midnight + Duration::days(1),
    ] {
        engine.start_run(at).unwrap();
    }
    let day = engine
        .runs_started_between(midnight, midnight + Duration::days(1))
        .unwrap();
    assert_eq!(day, 2);
    assert_eq!(
        engine
            .runs_started_between(midnight - Duration::days(1), midnight)
            .unwrap(),
        1
    );
}
