//! v003: feedback, tuner watermark, brand watchlist, competitive snapshots, pipeline runs.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS alert_feedback (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    alert_id TEXT NOT NULL REFERENCES alerts(id) ON DELETE CASCADE,
    user TEXT NOT NULL,
    action TEXT NOT NULL CHECK (action IN ('expand', 'thumbs_up', 'thumbs_down')),
    timestamp INTEGER NOT NULL,
    UNIQUE (alert_id, user, action)
) STRICT;

CREATE TABLE IF NOT EXISTS tuner_state (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    last_feedback_id INTEGER NOT NULL DEFAULT 0,
    last_run_at INTEGER
) STRICT;

INSERT OR IGNORE INTO tuner_state (id, last_feedback_id) VALUES (1, 0);

CREATE TABLE IF NOT EXISTS brand_watchlist (
    user TEXT NOT NULL,
    brand TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    PRIMARY KEY (user, brand)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_watchlist_brand ON brand_watchlist(brand);

CREATE TABLE IF NOT EXISTS competitive_snapshots (
    brand TEXT NOT NULL,
    date TEXT NOT NULL,
    payload TEXT NOT NULL,
    PRIMARY KEY (brand, date)
) STRICT;

CREATE TABLE IF NOT EXISTS pipeline_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at INTEGER NOT NULL,
    completed_at INTEGER,
    status TEXT NOT NULL CHECK (status IN ('running', 'success', 'failed')),
    alerts_created INTEGER NOT NULL DEFAULT 0,
    error_message TEXT
) STRICT;
"#;
