//! Versioned schema for the local store.
//!
//! Upgrades are applied in place, one migration per version step, so data
//! written by an older build (queued offline submissions in particular) is
//! never lost on an app update.

/// Schema version the current build expects. `PRAGMA user_version` on disk
/// is raised to this value by [`super::LocalStore::open`].
pub const SCHEMA_VERSION: i32 = 2;

/// Ordered migrations; `MIGRATIONS[i]` upgrades a database at version `i`
/// to version `i + 1`.
pub const MIGRATIONS: [&str; SCHEMA_VERSION as usize] = [V1_INITIAL, V2_OUTBOX_STATUS_INDEX];

const V1_INITIAL: &str = r#"
-- Generic record cache (stores serialized JSON). Each collection keys by
-- the entity's own primary key; idx_a/idx_b hold up to two foreign-key
-- values for secondary lookups (e.g. courses by teacher).
CREATE TABLE IF NOT EXISTS records (
    collection TEXT NOT NULL,
    key TEXT NOT NULL,
    idx_a TEXT,
    idx_b TEXT,
    data BLOB NOT NULL,
    cached_at INTEGER NOT NULL,
    PRIMARY KEY (collection, key)
);

CREATE INDEX IF NOT EXISTS idx_records_a ON records(collection, idx_a);
CREATE INDEX IF NOT EXISTS idx_records_b ON records(collection, idx_b);

-- Durable outbox for submissions made while disconnected. The id is local
-- to this device and never shared with the backend.
CREATE TABLE IF NOT EXISTS pending_submissions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    assignment_id TEXT NOT NULL,
    student_id TEXT NOT NULL,
    payload BLOB NOT NULL,
    due_at TEXT,
    created_at INTEGER NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    last_error TEXT
);
"#;

const V2_OUTBOX_STATUS_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_pending_submissions_status
    ON pending_submissions(status);
"#;
