//! v001 -- Initial schema creation.
//!
//! Creates the single `records` table. The store is deliberately a named
//! key-value instance rather than a relational schema: both backends
//! persist the whole post collection as one JSON array under one key, so
//! there is never partial/delta state to reconcile.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS records (
    key        TEXT PRIMARY KEY NOT NULL,
    value      TEXT NOT NULL,               -- JSON document
    updated_at TEXT NOT NULL                -- ISO-8601 / RFC-3339
);
"#;

/// Apply the initial schema.
pub fn up(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(UP_SQL)
}
