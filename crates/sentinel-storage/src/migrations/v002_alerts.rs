//! v002: situation reports, alerts, cooldown reservations.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS situation_reports (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    narrative TEXT NOT NULL,
    member_alert_ids TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    window_start INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_situations_created ON situation_reports(created_at);

CREATE TABLE IF NOT EXISTS alerts (
    id TEXT PRIMARY KEY,
    detector_type TEXT NOT NULL,
    scope TEXT NOT NULL,
    severity TEXT NOT NULL CHECK (severity IN ('info', 'predictive', 'warning', 'critical')),
    title TEXT NOT NULL,
    summary TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    last_seen INTEGER NOT NULL,
    cooldown_key TEXT NOT NULL,
    raw_metric_values TEXT NOT NULL,
    investigation TEXT,
    confidence INTEGER CHECK (confidence IS NULL OR (confidence >= 0 AND confidence <= 100)),
    status TEXT NOT NULL CHECK (status IN ('open', 'investigated', 'bailout', 'suppressed')),
    promoted INTEGER NOT NULL DEFAULT 0,
    notified INTEGER NOT NULL DEFAULT 0,
    situation_id TEXT REFERENCES situation_reports(id)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_alerts_created ON alerts(created_at);
CREATE INDEX IF NOT EXISTS idx_alerts_type_created ON alerts(detector_type, created_at);
CREATE INDEX IF NOT EXISTS idx_alerts_scope ON alerts(scope);
CREATE INDEX IF NOT EXISTS idx_alerts_cooldown_key ON alerts(cooldown_key);
CREATE INDEX IF NOT EXISTS idx_alerts_situation ON alerts(situation_id);

CREATE TABLE IF NOT EXISTS cooldown_reservations (
    cooldown_key TEXT PRIMARY KEY,
    alert_id TEXT NOT NULL,
    reserved_at INTEGER NOT NULL,
    expires_at INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_cooldown_expires ON cooldown_reservations(expires_at);
"#;
