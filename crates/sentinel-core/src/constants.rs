//! Shared constants for the Sentinel engine.

/// Sentinel version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Cooldown window for global, brand and competitive detectors (6h).
pub const REACTIVE_COOLDOWN_SECS: i64 = 6 * 3600;

/// Cooldown window for predictive detectors (24h).
pub const PREDICTIVE_COOLDOWN_SECS: i64 = 24 * 3600;

/// Lower threshold bound as a multiple of the default value.
pub const THRESHOLD_LOWER_FACTOR: f64 = 0.5;

/// Upper threshold bound as a multiple of the default value.
pub const THRESHOLD_UPPER_FACTOR: f64 = 2.0;

/// Running confidence (0-100) below which a reasoning chain bails out.
pub const BAILOUT_CONFIDENCE: u8 = 20;

/// Fit quality (R²) above which a predictive alert is promoted.
pub const PROMOTION_FIT_QUALITY: f64 = 0.7;

/// Compound score at or above which a predictive alert is promoted.
pub const PROMOTION_COMPOUND_SCORE: u32 = 4;

/// Empathy score above which an item counts as high-emotion.
pub const HIGH_EMOTION_EMPATHY: f64 = 0.7;

/// Intensity (1-5) at or above which an item counts toward a breaking signal.
pub const BREAKING_INTENSITY: f64 = 4.0;

/// Hours of publication recency that count toward a breaking signal.
pub const BREAKING_WINDOW_HOURS: i64 = 6;

/// Topic label excluded from emergence and share metrics.
pub const CATCH_ALL_TOPIC: &str = "other";

/// Topics aggregated into the geopolitical intensity metric.
pub const GEOPOLITICAL_TOPICS: &[&str] = &[
    "war & foreign policy",
    "immigration",
    "crime & safety",
];

/// Topics counted as regulatory or policy coverage.
pub const REGULATORY_TOPICS: &[&str] = &[
    "politics & policy",
    "regulation",
    "law & courts",
];

/// Emotions counted toward the negative emotion share.
pub const NEGATIVE_EMOTIONS: &[&str] = &[
    "anger",
    "fear",
    "sadness",
    "disgust",
    "grief",
    "nervousness",
    "disappointment",
    "annoyance",
];
