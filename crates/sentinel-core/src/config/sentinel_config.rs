//! Top-level Sentinel configuration with 4-layer resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{
    CompetitiveConfig, CooldownBackend, CooldownConfig, CorrelationConfig, DetectionConfig,
    ReasoningConfig, StorageConfig, TuningConfig, VldsConfig,
};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`SENTINEL_*`)
/// 3. Project config (`sentinel.toml` in project root)
/// 4. User config (`~/.sentinel/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SentinelConfig {
    pub detection: DetectionConfig,
    pub vlds: VldsConfig,
    pub cooldown: CooldownConfig,
    pub reasoning: ReasoningConfig,
    pub tuning: TuningConfig,
    pub correlation: CorrelationConfig,
    pub competitive: CompetitiveConfig,
    pub storage: StorageConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub db_path: Option<PathBuf>,
    pub reasoning_enabled: Option<bool>,
    pub tuning_enabled: Option<bool>,
    pub cooldown_backend: Option<CooldownBackend>,
    pub max_concurrent_chains: Option<usize>,
}

impl SentinelConfig {
    /// Load configuration with 4-layer resolution.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 4 (lowest priority): user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        // Layer 3: project config
        let project_config_path = root.join("sentinel.toml");
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config);

        // Layer 1 (highest priority): CLI flags
        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &SentinelConfig) -> Result<(), ConfigError> {
        fn fail(field: &str, message: &str) -> Result<(), ConfigError> {
            Err(ConfigError::ValidationFailed {
                field: field.to_string(),
                message: message.to_string(),
            })
        }

        if let Some(capacity) = config.vlds.coverage_capacity {
            if !(capacity.is_finite() && capacity > 0.0) {
                return fail("vlds.coverage_capacity", "must be greater than 0");
            }
        }
        if config.vlds.recent_days == Some(0) {
            return fail("vlds.recent_days", "must be at least 1");
        }
        if config.vlds.baseline_days == Some(0) {
            return fail("vlds.baseline_days", "must be at least 1");
        }
        if let Some(step) = config.tuning.max_step {
            if !(step > 0.0 && step <= 0.10) {
                return fail("tuning.max_step", "must be in (0, 0.10]");
            }
        }
        for (field, ratio) in [
            ("tuning.noise_high", config.tuning.noise_high),
            ("tuning.value_high", config.tuning.value_high),
            ("competitive.min_confidence", config.competitive.min_confidence),
            ("detection.crisis_empathy_floor", config.detection.crisis_empathy_floor),
            ("detection.crisis_negative_floor", config.detection.crisis_negative_floor),
        ] {
            if let Some(v) = ratio {
                if !(0.0..=1.0).contains(&v) {
                    return fail(field, "must be between 0.0 and 1.0");
                }
            }
        }
        if let Some(c) = config.reasoning.bailout_confidence {
            if c > 100 {
                return fail("reasoning.bailout_confidence", "must be between 0 and 100");
            }
        }
        if config.reasoning.step_timeout_ms == Some(0) {
            return fail("reasoning.step_timeout_ms", "must be greater than 0");
        }
        for (field, secs) in [
            ("correlation.lookback_secs", config.correlation.lookback_secs),
            ("correlation.proximity_secs", config.correlation.proximity_secs),
        ] {
            if let Some(v) = secs {
                if v <= 0 {
                    return fail(field, "must be greater than 0");
                }
            }
        }
        if let Some(size) = config.storage.read_pool_size {
            if size == 0 || size > 8 {
                return fail("storage.read_pool_size", "must be between 1 and 8");
            }
        }
        Ok(())
    }

    /// Returns the user config path: `~/.sentinel/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        dirs_path().map(|d| d.join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut SentinelConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: SentinelConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`, where `other` values override `base` values
    /// only when `other` has a `Some` value.
    fn merge(base: &mut SentinelConfig, other: &SentinelConfig) {
        // Detection
        let (b, o) = (&mut base.detection, &other.detection);
        if !o.disabled_detectors.is_empty() {
            b.disabled_detectors = o.disabled_detectors.clone();
        }
        overlay(&mut b.history_days, &o.history_days);
        overlay(&mut b.topic_absence_days, &o.topic_absence_days);
        overlay(&mut b.regulatory_min_items, &o.regulatory_min_items);
        overlay(&mut b.crisis_empathy_floor, &o.crisis_empathy_floor);
        overlay(&mut b.crisis_negative_floor, &o.crisis_negative_floor);
        overlay(&mut b.predictive_lookback_days, &o.predictive_lookback_days);
        overlay(&mut b.predictive_horizon_days, &o.predictive_horizon_days);
        overlay(&mut b.parallel, &o.parallel);

        // VLDS
        let (b, o) = (&mut base.vlds, &other.vlds);
        overlay(&mut b.recent_days, &o.recent_days);
        overlay(&mut b.baseline_days, &o.baseline_days);
        overlay(&mut b.density_days, &o.density_days);
        overlay(&mut b.coverage_capacity, &o.coverage_capacity);
        overlay(&mut b.presence_floor, &o.presence_floor);
        overlay(&mut b.min_baseline_days, &o.min_baseline_days);

        // Cooldown
        let (b, o) = (&mut base.cooldown, &other.cooldown);
        overlay(&mut b.backend, &o.backend);

        // Reasoning
        let (b, o) = (&mut base.reasoning, &other.reasoning);
        overlay(&mut b.enabled, &o.enabled);
        overlay(&mut b.confidence_policy, &o.confidence_policy);
        overlay(&mut b.bailout_confidence, &o.bailout_confidence);
        overlay(&mut b.max_retries, &o.max_retries);
        overlay(&mut b.initial_backoff_ms, &o.initial_backoff_ms);
        overlay(&mut b.max_backoff_ms, &o.max_backoff_ms);
        overlay(&mut b.step_timeout_ms, &o.step_timeout_ms);
        overlay(&mut b.max_concurrent_chains, &o.max_concurrent_chains);
        overlay(&mut b.precedent_days, &o.precedent_days);
        overlay(&mut b.endpoint, &o.endpoint);
        overlay(&mut b.model, &o.model);
        overlay(&mut b.api_key_env, &o.api_key_env);

        // Tuning
        let (b, o) = (&mut base.tuning, &other.tuning);
        overlay(&mut b.enabled, &o.enabled);
        overlay(&mut b.min_feedback_samples, &o.min_feedback_samples);
        overlay(&mut b.noise_high, &o.noise_high);
        overlay(&mut b.value_high, &o.value_high);
        overlay(&mut b.max_step, &o.max_step);

        // Correlation
        let (b, o) = (&mut base.correlation, &other.correlation);
        overlay(&mut b.enabled, &o.enabled);
        overlay(&mut b.lookback_secs, &o.lookback_secs);
        overlay(&mut b.proximity_secs, &o.proximity_secs);
        overlay(&mut b.min_score, &o.min_score);
        overlay(&mut b.title_members, &o.title_members);

        // Competitive
        let (b, o) = (&mut base.competitive, &other.competitive);
        overlay(&mut b.enabled, &o.enabled);
        overlay(&mut b.discovery_ttl_secs, &o.discovery_ttl_secs);
        overlay(&mut b.max_competitors, &o.max_competitors);
        overlay(&mut b.min_confidence, &o.min_confidence);

        // Storage
        let (b, o) = (&mut base.storage, &other.storage);
        overlay(&mut b.db_path, &o.db_path);
        overlay(&mut b.read_pool_size, &o.read_pool_size);
    }

    /// Apply environment variable overrides.
    /// Pattern: `SENTINEL_TUNING_ENABLED`, `SENTINEL_REASONING_ENDPOINT`, etc.
    fn apply_env_overrides(config: &mut SentinelConfig) {
        if let Ok(val) = std::env::var("SENTINEL_DB_PATH") {
            config.storage.db_path = Some(PathBuf::from(val));
        }
        if let Ok(val) = std::env::var("SENTINEL_COOLDOWN_BACKEND") {
            match val.to_ascii_lowercase().as_str() {
                "sqlite" => config.cooldown.backend = Some(CooldownBackend::Sqlite),
                "memory" => config.cooldown.backend = Some(CooldownBackend::Memory),
                other => tracing::warn!(value = other, "unknown SENTINEL_COOLDOWN_BACKEND"),
            }
        }
        if let Ok(val) = std::env::var("SENTINEL_REASONING_ENABLED") {
            if let Ok(v) = val.parse::<bool>() {
                config.reasoning.enabled = Some(v);
            }
        }
        if let Ok(val) = std::env::var("SENTINEL_REASONING_ENDPOINT") {
            config.reasoning.endpoint = Some(val);
        }
        if let Ok(val) = std::env::var("SENTINEL_REASONING_MODEL") {
            config.reasoning.model = Some(val);
        }
        if let Ok(val) = std::env::var("SENTINEL_REASONING_MAX_CONCURRENT_CHAINS") {
            if let Ok(v) = val.parse::<usize>() {
                config.reasoning.max_concurrent_chains = Some(v);
            }
        }
        if let Ok(val) = std::env::var("SENTINEL_REASONING_STEP_TIMEOUT_MS") {
            if let Ok(v) = val.parse::<u64>() {
                config.reasoning.step_timeout_ms = Some(v);
            }
        }
        if let Ok(val) = std::env::var("SENTINEL_TUNING_ENABLED") {
            if let Ok(v) = val.parse::<bool>() {
                config.tuning.enabled = Some(v);
            }
        }
        if let Ok(val) = std::env::var("SENTINEL_TUNING_MIN_FEEDBACK_SAMPLES") {
            if let Ok(v) = val.parse::<u64>() {
                config.tuning.min_feedback_samples = Some(v);
            }
        }
        if let Ok(val) = std::env::var("SENTINEL_COMPETITIVE_ENABLED") {
            if let Ok(v) = val.parse::<bool>() {
                config.competitive.enabled = Some(v);
            }
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut SentinelConfig, cli: &CliOverrides) {
        if let Some(ref v) = cli.db_path {
            config.storage.db_path = Some(v.clone());
        }
        if let Some(v) = cli.reasoning_enabled {
            config.reasoning.enabled = Some(v);
        }
        if let Some(v) = cli.tuning_enabled {
            config.tuning.enabled = Some(v);
        }
        if let Some(v) = cli.cooldown_backend {
            config.cooldown.backend = Some(v);
        }
        if let Some(v) = cli.max_concurrent_chains {
            config.reasoning.max_concurrent_chains = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn overlay<T: Clone>(base: &mut Option<T>, other: &Option<T>) {
    if other.is_some() {
        base.clone_from(other);
    }
}

/// Returns the user-level sentinel config directory: `~/.sentinel/`.
fn dirs_path() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".sentinel"))
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
