//! v001: metric snapshots, alert thresholds, threshold audit log.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS metric_snapshots (
    scope TEXT NOT NULL,
    date TEXT NOT NULL,
    metrics TEXT NOT NULL,
    captured_at INTEGER NOT NULL,
    PRIMARY KEY (scope, date)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_snapshots_date ON metric_snapshots(date);

CREATE TABLE IF NOT EXISTS alert_thresholds (
    detector_type TEXT PRIMARY KEY,
    default_value REAL NOT NULL,
    current_value REAL NOT NULL,
    lower_bound REAL NOT NULL,
    upper_bound REAL NOT NULL,
    last_updated INTEGER NOT NULL,
    CHECK (current_value >= lower_bound AND current_value <= upper_bound)
) STRICT;

CREATE TABLE IF NOT EXISTS threshold_audit (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    detector_type TEXT NOT NULL REFERENCES alert_thresholds(detector_type),
    old_value REAL NOT NULL,
    new_value REAL NOT NULL,
    reason TEXT NOT NULL,
    source TEXT NOT NULL CHECK (source IN ('tuner', 'admin')),
    timestamp INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_threshold_audit_type ON threshold_audit(detector_type, id);
"#;
