//! Structured span field names shared across Sentinel subsystems.

/// Pipeline: whole-cycle duration in milliseconds.
pub const CYCLE_DURATION: &str = "cycle_duration_ms";

/// Snapshot capture: snapshots written this cycle.
pub const SNAPSHOTS_CAPTURED: &str = "snapshots_captured";

/// Detectors: evaluation time across all scopes in milliseconds.
pub const DETECTION_TIME: &str = "detection_time_ms";

/// Detectors: drafts produced before cooldown filtering.
pub const DRAFTS_EVALUATED: &str = "drafts_evaluated";

/// Cooldown: drafts suppressed by a held key.
pub const ALERTS_SUPPRESSED: &str = "alerts_suppressed";

/// Reasoning: chain duration in milliseconds.
pub const CHAIN_DURATION: &str = "chain_duration_ms";

/// Reasoning: attempts used by a step.
pub const STEP_ATTEMPTS: &str = "step_attempts";

/// Tuner: thresholds changed in a pass.
pub const THRESHOLDS_ADJUSTED: &str = "thresholds_adjusted";

/// Correlation: situation reports formed.
pub const SITUATIONS_FORMED: &str = "situations_formed";

/// Competitor cache: hit rate (0.0 - 1.0).
pub const CACHE_HIT_RATE: &str = "cache_hit_rate";
