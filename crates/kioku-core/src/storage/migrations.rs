//! Database Migrations
//!
//! Schema migration definitions for the storage layer.

use chrono::{Datelike, NaiveDate};

/// Migration definitions
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema: vocabulary progress with SM-2 state",
        up: MIGRATION_V1_UP,
    },
    Migration {
        version: 2,
        description: "Optimistic concurrency version column",
        up: MIGRATION_V2_UP,
    },
    Migration {
        version: 3,
        description: "Numeric review day for the due query",
        up: MIGRATION_V3_UP,
    },
];

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Version number
    pub version: u32,
    /// Description
    pub description: &'static str,
    /// SQL to apply
    pub up: &'static str,
}

/// V1: Initial schema
const MIGRATION_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS vocabulary_progress (
    learner_id TEXT NOT NULL,
    item_id TEXT NOT NULL,

    -- SM-2 state
    ease_factor REAL NOT NULL DEFAULT 2.5,
    interval_days INTEGER NOT NULL DEFAULT 1,
    repetitions INTEGER NOT NULL DEFAULT 0,
    next_review_date TEXT NOT NULL,

    -- Review history
    last_reviewed_at TEXT,
    total_reviews INTEGER NOT NULL DEFAULT 0,
    correct_reviews INTEGER NOT NULL DEFAULT 0,

    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,

    PRIMARY KEY (learner_id, item_id)
);

-- ISO dates sort lexically, so the due query can range-scan this index
CREATE INDEX IF NOT EXISTS idx_progress_due ON vocabulary_progress(learner_id, next_review_date);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, datetime('now'));
"#;

/// V2: Version column for stale-write detection
const MIGRATION_V2_UP: &str = r#"
ALTER TABLE vocabulary_progress ADD COLUMN version INTEGER NOT NULL DEFAULT 1;

UPDATE schema_version SET version = 2, applied_at = datetime('now');
"#;

/// V3: Review date as a day number.
///
/// chrono writes years past 9999 with a leading `+`, which breaks text
/// ordering. `next_review_day` holds `NaiveDate::num_days_from_ce()`; rows
/// written before this migration are filled in by [`backfill_review_days`].
const MIGRATION_V3_UP: &str = r#"
ALTER TABLE vocabulary_progress ADD COLUMN next_review_day INTEGER;

DROP INDEX IF EXISTS idx_progress_due;
CREATE INDEX IF NOT EXISTS idx_progress_due_day ON vocabulary_progress(learner_id, next_review_day);

UPDATE schema_version SET version = 3, applied_at = datetime('now');
"#;

/// Get current schema version from database
pub fn get_current_version(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .or(Ok(0))
}

/// Apply pending migrations
pub fn apply_migrations(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    let current_version = get_current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::info!(
                "Applying migration v{}: {}",
                migration.version,
                migration.description
            );

            conn.execute_batch(migration.up)?;
            applied += 1;
        }
    }

    Ok(applied)
}

/// Fill `next_review_day` for rows that predate it, from the text date
pub fn backfill_review_days(conn: &rusqlite::Connection) -> rusqlite::Result<usize> {
    let pending: Vec<(String, String, String)> = {
        let mut stmt = conn.prepare(
            "SELECT learner_id, item_id, next_review_date FROM vocabulary_progress
             WHERE next_review_day IS NULL",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?;
        rows.collect::<rusqlite::Result<_>>()?
    };

    let mut filled = 0;
    for (learner_id, item_id, date) in pending {
        let day = date
            .parse::<NaiveDate>()
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?
            .num_days_from_ce();

        filled += conn.execute(
            "UPDATE vocabulary_progress SET next_review_day = ?1
             WHERE learner_id = ?2 AND item_id = ?3",
            rusqlite::params![day, learner_id, item_id],
        )?;
    }

    if filled > 0 {
        tracing::info!(filled, "Backfilled review day numbers");
    }

    Ok(filled)
}
