//! In-process cooldown ledger tests.

use std::sync::Arc;
use std::thread;

use chrono::{Duration, TimeZone, Utc};
use sentinel_analysis::MemoryCooldownLedger;
use sentinel_core::traits::{CooldownLedger, Reservation};
use sentinel_core::types::{CooldownKey, DetectorType, Scope};

/// TS-MCD-01: the first reservation wins and later ones see its alert id.
#[test]
fn test_held_by_first_alert() {
    let ledger = MemoryCooldownLedger::new();
    let t0 = Utc.with_ymd_and_hms(2026, 3, 2, 0, 30, 0).unwrap();
    let key = CooldownKey::new(DetectorType::BreakingSignal, Scope::Global, t0);

    assert!(ledger.reserve(&key, "a-1", t0).unwrap().is_granted());
    assert_eq!(
        ledger.reserve(&key, "a-2", t0 + Duration::minutes(5)).unwrap(),
        Reservation::Held {
            alert_id: "a-1".into()
        }
    );
    assert_eq!(ledger.len(), 1);
}

/// TS-MCD-02: release frees the key for the next alert.
#[test]
fn test_release_frees_key() {
    let ledger = MemoryCooldownLedger::new();
    let now = Utc::now();
    let key = CooldownKey::new(DetectorType::BrandCrisis, Scope::brand("Acme"), now);
    assert!(ledger.reserve(&key, "a-1", now).unwrap().is_granted());
    ledger.release(&key).unwrap();
    assert!(ledger.is_empty());
    assert!(ledger.reserve(&key, "a-2", now).unwrap().is_granted());
}

/// TS-MCD-03: an expired hold is replaced, and purge drops only expired holds.
#[test]
fn test_expiry_and_purge() {
    let ledger = MemoryCooldownLedger::new();
    let t0 = Utc.with_ymd_and_hms(2026, 3, 2, 1, 0, 0).unwrap();
    let key = CooldownKey::new(DetectorType::MoodShift, Scope::Global, t0);
    let late = key.expires_at();
    let next = CooldownKey::new(DetectorType::MoodShift, Scope::Global, late);
    assert_ne!(next, key);
    ledger.reserve(&key, "a-1", t0).unwrap();
    ledger.reserve(&next, "a-2", late).unwrap();

    assert!(ledger.reserve(&key, "a-3", late).unwrap().is_granted());
    assert_eq!(ledger.purge_expired(late), 1);
    assert_eq!(ledger.len(), 1);
}

/// TS-MCD-04: racing threads on one key produce exactly one grant.
#[test]
fn test_concurrent_single_winner() {
    let ledger = Arc::new(MemoryCooldownLedger::new());
    let now = Utc::now();
    let key = CooldownKey::new(DetectorType::ShareOfVoiceShift, Scope::brand("Acme"), now);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let ledger = Arc::clone(&ledger);
            let key = key.clone();
            thread::spawn(move || ledger.reserve(&key, &format!("a-{i}"), now).unwrap().is_granted())
        })
        .collect();
    let grants = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|granted| *granted)
        .count();
    assert_eq!(grants, 1);
}
