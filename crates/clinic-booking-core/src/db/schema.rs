//! SQLite schema definition.

/// Complete schema for the local appointment cache.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Local State (key -> JSON document, overwritten on every mutation)
-- ============================================================================

CREATE TABLE IF NOT EXISTS local_state (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,                          -- JSON document
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Start with an empty appointment mirror
INSERT OR IGNORE INTO local_state (key, value) VALUES ('appointments', '[]');
"#;

/// Key holding the full appointment array.
pub const APPOINTMENTS_KEY: &str = "appointments";
