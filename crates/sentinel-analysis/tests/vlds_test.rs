//! VLDS scoring tests.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use sentinel_analysis::vlds::{self, VldsPolicy};
use sentinel_core::types::{metrics, MetricSnapshot, Scope};

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
}

fn series(scope: &Scope, volumes: &[f64]) -> Vec<MetricSnapshot> {
    let n = volumes.len() as i64;
    volumes
        .iter()
        .enumerate()
        .map(|(i, v)| {
            MetricSnapshot::new(scope.clone(), date() - Duration::days(n - 1 - i as i64))
                .with_metric(metrics::VOLUME, *v)
        })
        .collect()
}

/// TS-VLD-01: velocity is recent volume over the baseline mean.
#[test]
fn test_velocity_ratio() {
    let scope = Scope::brand("Acme");
    let history = series(&scope, &[100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 340.0]);
    let s = vlds::score(&VldsPolicy::default(), &scope, date(), &history);
    assert!(!s.cold_start);
    assert!((s.velocity - 3.4).abs() < 1e-9);
    assert_eq!(s.longevity, 8);
    assert_eq!(s.density, 1.0);
    assert_eq!(s.scarcity, 0.0);
}

/// TS-VLD-02: missing baseline days count as zero volume.
#[test]
fn test_missing_days_count_as_zero() {
    let scope = Scope::brand("Acme");
    let mut history = series(&scope, &[70.0; 5]);
    history.remove(3);
    let s = vlds::score(&VldsPolicy::default(), &scope, date(), &history);
    assert!(!s.cold_start);
    // three of seven baseline days carry 70 each
    assert!((s.velocity - 70.0 / 30.0).abs() < 1e-9);
    assert_eq!(s.longevity, 1);
}

/// TS-VLD-03: fewer than three baseline days is a cold start with neutral velocity.
#[test]
fn test_cold_start() {
    let scope = Scope::brand("Acme");
    let history = series(&scope, &[5.0, 50.0]);
    let s = vlds::score(&VldsPolicy::default(), &scope, date(), &history);
    assert!(s.cold_start);
    assert_eq!(s.velocity, 1.0);
}

/// TS-VLD-04: other scopes and future days are ignored.
#[test]
fn test_scope_and_date_filtering() {
    let scope = Scope::brand("Acme");
    let mut history = series(&scope, &[10.0, 10.0, 10.0, 10.0]);
    history.extend(series(&Scope::brand("Globex"), &[999.0; 4]));
    history.push(
        MetricSnapshot::new(scope.clone(), date() + Duration::days(1))
            .with_metric(metrics::VOLUME, 999.0),
    );
    let s = vlds::score(&VldsPolicy::default(), &scope, date(), &history);
    assert!((s.density - 0.4).abs() < 1e-9);
}

/// TS-VLD-05: the series covers only days with snapshots, oldest first.
#[test]
fn test_score_series() {
    let scope = Scope::brand("Acme");
    let mut history = series(&scope, &[1.0, 2.0, 3.0, 4.0, 5.0]);
    history.remove(1);
    let out = vlds::score_series(&VldsPolicy::default(), &scope, date(), 7, &history);
    assert_eq!(out.len(), 4);
    assert!(out.windows(2).all(|w| w[0].date < w[1].date));
    assert_eq!(out.last().unwrap().date, date());
}

proptest! {
    /// TS-VLD-06: more coverage never raises scarcity, and scores stay in range.
    #[test]
    fn prop_scarcity_monotonic(
        volumes in prop::collection::vec(0.0f64..60.0, 8),
        extra in 0.0f64..100.0,
    ) {
        let scope = Scope::brand("Acme");
        let policy = VldsPolicy::default();
        let base = series(&scope, &volumes);
        let mut louder = volumes.clone();
        *louder.last_mut().unwrap() += extra;
        let a = vlds::score(&policy, &scope, date(), &base);
        let b = vlds::score(&policy, &scope, date(), &series(&scope, &louder));
        prop_assert!(b.scarcity <= a.scarcity);
        for s in [&a, &b] {
            prop_assert!((0.0..=1.0).contains(&s.density));
            prop_assert!((0.0..=1.0).contains(&s.scarcity));
            prop_assert!((s.density + s.scarcity - 1.0).abs() < 1e-9);
            prop_assert!(s.velocity >= 0.0);
        }
    }
}
