//! Tests for the data model.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use sentinel_core::types::*;

// ── Scope ──

/// TC-TYP-01: scopes render and parse symmetrically.
#[test]
fn test_scope_text_form() {
    assert_eq!(Scope::Global.to_string(), "global");
    assert_eq!(Scope::brand("Acme").to_string(), "brand:Acme");
    assert_eq!("competitor:Globex".parse::<Scope>().unwrap(), Scope::competitor("Globex"));
    assert!("brand:".parse::<Scope>().is_err());
    assert!("team:x".parse::<Scope>().is_err());
}

// ── Detector types ──

/// TC-TYP-02: 21 detectors split 7/8/3/3 by class.
#[test]
fn test_detector_inventory() {
    let all = DetectorType::all();
    assert_eq!(all.len(), 21);
    let count = |class| all.iter().filter(|d| d.class() == class).count();
    assert_eq!(count(DetectorClass::Global), 7);
    assert_eq!(count(DetectorClass::Brand), 8);
    assert_eq!(count(DetectorClass::Competitive), 3);
    assert_eq!(count(DetectorClass::Predictive), 3);
}

/// TC-TYP-03: names parse back and predictive detectors use the long window.
#[test]
fn test_detector_names_and_windows() {
    for dt in DetectorType::all() {
        assert_eq!(dt.as_str().parse::<DetectorType>().unwrap(), *dt);
        assert!(dt.default_threshold() > 0.0);
        let expected = if dt.is_predictive() { 24 * 3600 } else { 6 * 3600 };
        assert_eq!(dt.cooldown_secs(), expected);
    }
    assert!("not_a_detector".parse::<DetectorType>().is_err());
}

// ── Cooldown keys ──

/// TC-TYP-04: detections inside one window share a key.
#[test]
fn test_cooldown_key_bucketing() {
    let t0 = Utc.with_ymd_and_hms(2026, 3, 2, 1, 0, 0).unwrap();
    let scope = Scope::brand("Acme");
    let a = CooldownKey::new(DetectorType::BrandNewsSurge, scope.clone(), t0);
    let b = CooldownKey::new(DetectorType::BrandNewsSurge, scope.clone(), t0 + Duration::hours(2));
    let c = CooldownKey::new(DetectorType::BrandNewsSurge, scope, t0 + Duration::hours(6));
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(a.bucket_start() <= t0 && t0 < a.expires_at());
}

/// TC-TYP-05: key text form is `type|scope|bucket` and survives serde.
#[test]
fn test_cooldown_key_text_form() {
    let now = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
    let key = CooldownKey::new(DetectorType::BrandVelocitySpike, Scope::brand("A|B"), now);
    let text = key.to_string();
    assert!(text.starts_with("brand_velocity_spike|brand:A|B|"));
    assert_eq!(text.parse::<CooldownKey>().unwrap(), key);

    let json = serde_json::to_string(&key).unwrap();
    assert_eq!(serde_json::from_str::<CooldownKey>(&json).unwrap(), key);
}

// ── Thresholds ──

/// TC-TYP-06: seeded bounds are 0.5x and 2x the default.
#[test]
fn test_threshold_seed_bounds() {
    let t = AlertThreshold::seeded(DetectorType::BrandVelocitySpike, Utc::now());
    assert_eq!(t.current_value, 3.0);
    assert_eq!(t.lower_bound, 1.5);
    assert_eq!(t.upper_bound, 6.0);
    assert!(t.contains(6.0));
    assert!(!t.contains(6.01));
    assert_eq!(t.clamp(0.1), 1.5);
}

// ── Snapshots ──

/// TC-TYP-07: prefixed metric families iterate without leaking neighbours.
#[test]
fn test_snapshot_prefix_iteration() {
    let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    let snap = MetricSnapshot::new(Scope::Global, date)
        .with_metric(metrics::topic_share("economy"), 0.3)
        .with_metric(metrics::topic_share("sport"), 0.1)
        .with_metric(metrics::breaking_sources("economy"), 4.0)
        .with_metric(metrics::VOLUME, 120.0)
        .with_metric(metrics::AVG_EMPATHY, f64::NAN);

    let topics: Vec<_> = snap.with_prefix(metrics::TOPIC_SHARE_PREFIX).collect();
    assert_eq!(topics, vec![("economy", 0.3), ("sport", 0.1)]);
    assert_eq!(snap.get(metrics::AVG_EMPATHY), None);
    assert_eq!(snap.get_or_zero("missing"), 0.0);
}

// ── Feedback ──

/// TC-TYP-08: 8 dismissals and 1 approval is a noisy detector.
#[test]
fn test_feedback_ratios() {
    let mut tally = FeedbackTally::default();
    for _ in 0..8 {
        tally.record(FeedbackAction::ThumbsDown);
    }
    tally.record(FeedbackAction::ThumbsUp);
    assert_eq!(tally.total(), 9);
    assert!((tally.noise_ratio() - 8.0 / 9.0).abs() < 1e-6);
    assert!((tally.value_ratio() - 1.0 / 9.0).abs() < 1e-9);
    assert_eq!(FeedbackTally::default().value_ratio(), 0.0);
}

// ── Alerts ──

/// TC-TYP-09: drafts become open alerts; notification follows severity or promotion.
#[test]
fn test_alert_from_draft() {
    let now = Utc::now();
    let draft = AlertDraft::new(
        DetectorType::PredictiveMomentum,
        Scope::Global,
        Severity::Predictive,
        now,
    )
    .titled("Momentum building", "Emotion ratio accelerating")
    .metric("relative_acceleration", 0.2);
    let alert = Alert::from_draft(draft.clone(), "a-1".into(), now);
    assert_eq!(alert.status, AlertStatus::Open);
    assert!(!alert.should_notify());
    assert!(!alert.is_correlated());

    let mut promoted = draft;
    promoted.promoted = true;
    promoted.severity = Severity::Warning;
    assert!(Alert::from_draft(promoted, "a-2".into(), now).should_notify());
}

/// TC-TYP-10: scored content matches brands case-insensitively.
#[test]
fn test_content_mentions() {
    let item = ContentItem {
        id: "c1".into(),
        channel: Channel::News,
        source: "Daily Wire Service".into(),
        title: "ACME posts record quarter".into(),
        text: String::new(),
        published_at: Utc::now(),
        score: None,
    };
    assert!(item.mentions("acme"));
    assert!(item.mentions("wire"));
    assert!(!item.mentions("globex"));
    assert!(!item.mentions(""));
}
