//! Database schema SQL.

/// One row per client; the history aggregate is stored as JSON so the bond
/// list and its derived total are always written together.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS client_histories (
    client_id TEXT PRIMARY KEY,
    history_json TEXT NOT NULL,
    bond_count INTEGER NOT NULL,
    total_months INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_client_histories_updated ON client_histories(updated_at);
"#;
