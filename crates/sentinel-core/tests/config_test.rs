//! Tests for configuration loading and validation.

use std::sync::Mutex;

use sentinel_core::config::{
    CliOverrides, ConfidencePolicy, CooldownBackend, SentinelConfig,
};
use sentinel_core::errors::ConfigError;

/// Serializes tests that read SENTINEL_* variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// TC-CFG-01: an empty config yields the documented defaults.
#[test]
fn test_defaults() {
    let config = SentinelConfig::default();
    assert_eq!(config.vlds.effective_recent_days(), 1);
    assert_eq!(config.vlds.effective_baseline_days(), 7);
    assert_eq!(config.vlds.effective_min_baseline_days(), 3);
    assert_eq!(config.cooldown.effective_backend(), CooldownBackend::Sqlite);
    assert_eq!(config.reasoning.effective_bailout_confidence(), 20);
    assert_eq!(config.reasoning.effective_max_retries(), 2);
    assert_eq!(config.reasoning.effective_step_timeout_ms(), 30_000);
    assert_eq!(config.reasoning.effective_confidence_policy(), ConfidencePolicy::Latest);
    assert_eq!(config.tuning.effective_min_feedback_samples(), 5);
    assert!((config.tuning.effective_max_step() - 0.10).abs() < f64::EPSILON);
    assert_eq!(config.correlation.effective_lookback_secs(), 3 * 3600);
    assert_eq!(config.correlation.effective_proximity_secs(), 2 * 3600);
    assert_eq!(config.storage.effective_read_pool_size(), 4);
}

/// TC-CFG-02: TOML sections map onto sub-configs.
#[test]
fn test_from_toml() {
    let config = SentinelConfig::from_toml(
        r#"
        [cooldown]
        backend = "memory"

        [reasoning]
        confidence_policy = "mean"
        max_concurrent_chains = 2

        [detection]
        disabled_detectors = ["breaking_signal"]

        [unknown_section]
        ignored = true
        "#,
    )
    .unwrap();
    assert_eq!(config.cooldown.effective_backend(), CooldownBackend::Memory);
    assert_eq!(config.reasoning.effective_confidence_policy(), ConfidencePolicy::Mean);
    assert_eq!(config.reasoning.effective_max_concurrent_chains(), 2);
    assert!(!config.detection.is_enabled("breaking_signal"));
    assert!(config.detection.is_enabled("mood_shift"));
}

/// TC-CFG-03: invalid TOML is a parse error.
#[test]
fn test_invalid_toml() {
    let err = SentinelConfig::from_toml("[tuning\nmax_step = ").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

/// TC-CFG-04: out-of-range values fail validation with the field name.
#[test]
fn test_validation() {
    let config = SentinelConfig::from_toml("[tuning]\nmax_step = 0.25").unwrap();
    match SentinelConfig::validate(&config) {
        Err(ConfigError::ValidationFailed { field, .. }) => assert_eq!(field, "tuning.max_step"),
        other => panic!("expected validation failure, got {other:?}"),
    }

    let config = SentinelConfig::from_toml("[storage]\nread_pool_size = 12").unwrap();
    assert!(SentinelConfig::validate(&config).is_err());

    let config = SentinelConfig::from_toml("[vlds]\ncoverage_capacity = 0.0").unwrap();
    assert!(SentinelConfig::validate(&config).is_err());
}

/// TC-CFG-05: project file, env and CLI layer in priority order.
#[test]
fn test_layered_load() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("sentinel.toml"),
        "[reasoning]\nmodel = \"project-model\"\nmax_concurrent_chains = 3\n\n[tuning]\nenabled = false\n",
    )
    .unwrap();

    std::env::set_var("SENTINEL_REASONING_MODEL", "env-model");
    let cli = CliOverrides {
        max_concurrent_chains: Some(6),
        ..Default::default()
    };
    let config = SentinelConfig::load(dir.path(), Some(&cli)).unwrap();
    std::env::remove_var("SENTINEL_REASONING_MODEL");

    assert_eq!(config.reasoning.model.as_deref(), Some("env-model"));
    assert_eq!(config.reasoning.effective_max_concurrent_chains(), 6);
    assert!(!config.tuning.effective_enabled());
}

/// TC-CFG-06: serialized config parses back.
#[test]
fn test_to_toml_reparses() {
    let config = SentinelConfig::from_toml("[correlation]\nmin_score = 4").unwrap();
    let text = config.to_toml().unwrap();
    let again = SentinelConfig::from_toml(&text).unwrap();
    assert_eq!(again.correlation.effective_min_score(), 4);
}
