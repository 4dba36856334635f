//! SQLite Storage Implementation
//!
//! Progress records keyed by (learner_id, item_id) with a version column for
//! optimistic concurrency.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use std::sync::Mutex;

use super::store::{ProgressStore, Result, StorageError};
use crate::progress::VocabularyProgress;
use crate::sm2::RetentionState;

const PROGRESS_COLUMNS: &str = "learner_id, item_id, ease_factor, interval_days, repetitions,
     next_review_day, last_reviewed_at, total_reviews, correct_reviews, version,
     created_at, updated_at";

/// File name of the progress database inside a data directory
pub const DB_FILE_NAME: &str = "kioku.db";

// ============================================================================
// STORAGE
// ============================================================================

/// SQLite-backed [`ProgressStore`]
///
/// Uses separate reader/writer connections for interior mutability.
/// All methods take `&self`, so the store can be shared as `Arc<SqliteStore>`.
pub struct SqliteStore {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
    path: PathBuf,
}

impl SqliteStore {
    /// Apply PRAGMAs and optional encryption to a connection
    fn configure_connection(conn: &Connection) -> Result<()> {
        // Apply encryption key if SQLCipher is enabled and key is provided
        #[cfg(feature = "encryption")]
        {
            if let Ok(key) = std::env::var("KIOKU_ENCRYPTION_KEY") {
                if !key.is_empty() {
                    conn.pragma_update(None, "key", &key)?;
                }
            }
        }

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;

        Ok(())
    }

    /// Default database location under the platform data directory
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "kioku", "core").ok_or_else(|| {
            StorageError::Init("Could not determine project directories".to_string())
        })?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;
        // Restrict directory permissions to owner-only on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            let _ = std::fs::set_permissions(data_dir, perms);
        }
        Ok(data_dir.join(DB_FILE_NAME))
    }

    /// Database location inside an explicit data directory
    pub fn path_in(data_dir: impl AsRef<std::path::Path>) -> PathBuf {
        data_dir.as_ref().join(DB_FILE_NAME)
    }

    /// Open (or create) a store. `None` uses [`SqliteStore::default_path`].
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(p) => p,
            None => Self::default_path()?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let writer_conn = Connection::open(&path)?;

        // Restrict database file permissions to owner-only on Unix
        #[cfg(unix)]
        if path.exists() {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&path, perms);
        }

        Self::configure_connection(&writer_conn)?;

        // Apply migrations on writer only
        let applied = super::migrations::apply_migrations(&writer_conn)?;
        if applied > 0 {
            tracing::debug!(applied, path = %path.display(), "Schema migrated");
            super::migrations::backfill_review_days(&writer_conn)?;
        }

        let reader_conn = Connection::open(&path)?;
        Self::configure_connection(&reader_conn)?;

        Ok(Self {
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
            path,
        })
    }

    /// Location of the database file
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn writer(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.writer
            .lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))
    }

    fn reader(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))
    }

    /// Parse RFC3339 timestamp from the database
    fn parse_timestamp(value: &str, field_name: &str) -> rusqlite::Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Self::conversion_error(field_name, value, e.to_string()))
    }

    /// Calendar date from a `num_days_from_ce` day number
    fn parse_day(day: i32, field_name: &str) -> rusqlite::Result<NaiveDate> {
        NaiveDate::from_num_days_from_ce_opt(day).ok_or_else(|| {
            Self::conversion_error(field_name, &day.to_string(), "out of range".to_string())
        })
    }

    fn conversion_error(field_name: &str, value: &str, reason: String) -> rusqlite::Error {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(StorageError::InvalidDate(format!(
                "{} '{}': {}",
                field_name, value, reason
            ))),
        )
    }

    /// Convert a row to VocabularyProgress
    fn row_to_progress(row: &rusqlite::Row) -> rusqlite::Result<VocabularyProgress> {
        let next_review_day: i32 = row.get("next_review_day")?;
        let last_reviewed_at: Option<String> = row.get("last_reviewed_at")?;
        let created_at: String = row.get("created_at")?;
        let updated_at: String = row.get("updated_at")?;

        let last_reviewed_at = match last_reviewed_at {
            Some(s) => Some(Self::parse_timestamp(&s, "last_reviewed_at")?),
            None => None,
        };

        Ok(VocabularyProgress {
            learner_id: row.get("learner_id")?,
            item_id: row.get("item_id")?,
            retention: RetentionState {
                ease_factor: row.get("ease_factor")?,
                interval: row.get("interval_days")?,
                repetitions: row.get("repetitions")?,
                next_review_date: Self::parse_day(next_review_day, "next_review_day")?,
            },
            last_reviewed_at,
            total_reviews: row.get("total_reviews")?,
            correct_reviews: row.get("correct_reviews")?,
            version: row.get("version")?,
            created_at: Self::parse_timestamp(&created_at, "created_at")?,
            updated_at: Self::parse_timestamp(&updated_at, "updated_at")?,
        })
    }
}

impl ProgressStore for SqliteStore {
    fn load(&self, learner_id: &str, item_id: &str) -> Result<VocabularyProgress> {
        let reader = self.reader()?;
        let sql = format!(
            "SELECT {} FROM vocabulary_progress WHERE learner_id = ?1 AND item_id = ?2",
            PROGRESS_COLUMNS
        );

        reader
            .query_row(&sql, params![learner_id, item_id], Self::row_to_progress)
            .optional()?
            .ok_or_else(|| StorageError::not_found(learner_id, item_id))
    }

    fn create(&self, progress: &VocabularyProgress) -> Result<VocabularyProgress> {
        let writer = self.writer()?;
        let rows = writer.execute(
            "INSERT OR IGNORE INTO vocabulary_progress (
                learner_id, item_id, ease_factor, interval_days, repetitions,
                next_review_date, next_review_day, last_reviewed_at, total_reviews,
                correct_reviews, version, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                progress.learner_id,
                progress.item_id,
                progress.retention.ease_factor,
                progress.retention.interval,
                progress.retention.repetitions,
                progress.retention.next_review_date.to_string(),
                progress.retention.next_review_date.num_days_from_ce(),
                progress.last_reviewed_at.map(|at| at.to_rfc3339()),
                progress.total_reviews,
                progress.correct_reviews,
                progress.version,
                progress.created_at.to_rfc3339(),
                progress.updated_at.to_rfc3339(),
            ],
        )?;

        if rows == 0 {
            return Err(StorageError::conflict(
                &progress.learner_id,
                &progress.item_id,
                "progress already exists",
            ));
        }

        Ok(progress.clone())
    }

    fn save(&self, progress: &VocabularyProgress) -> Result<VocabularyProgress> {
        let writer = self.writer()?;
        let rows = writer.execute(
            "UPDATE vocabulary_progress SET
                ease_factor = ?1,
                interval_days = ?2,
                repetitions = ?3,
                next_review_date = ?4,
                next_review_day = ?5,
                last_reviewed_at = ?6,
                total_reviews = ?7,
                correct_reviews = ?8,
                updated_at = ?9,
                version = version + 1
            WHERE learner_id = ?10 AND item_id = ?11 AND version = ?12",
            params![
                progress.retention.ease_factor,
                progress.retention.interval,
                progress.retention.repetitions,
                progress.retention.next_review_date.to_string(),
                progress.retention.next_review_date.num_days_from_ce(),
                progress.last_reviewed_at.map(|at| at.to_rfc3339()),
                progress.total_reviews,
                progress.correct_reviews,
                progress.updated_at.to_rfc3339(),
                progress.learner_id,
                progress.item_id,
                progress.version,
            ],
        )?;

        if rows == 0 {
            let stored: Option<i64> = writer
                .query_row(
                    "SELECT version FROM vocabulary_progress WHERE learner_id = ?1 AND item_id = ?2",
                    params![progress.learner_id, progress.item_id],
                    |row| row.get(0),
                )
                .optional()?;

            return Err(match stored {
                None => StorageError::not_found(&progress.learner_id, &progress.item_id),
                Some(current) => StorageError::conflict(
                    &progress.learner_id,
                    &progress.item_id,
                    format!(
                        "stale version {} (stored version is {})",
                        progress.version, current
                    ),
                ),
            });
        }

        Ok(VocabularyProgress {
            version: progress.version + 1,
            ..progress.clone()
        })
    }

    fn due(
        &self,
        learner_id: &str,
        today: NaiveDate,
        limit: usize,
    ) -> Result<Vec<VocabularyProgress>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let reader = self.reader()?;
        let sql = format!(
            "SELECT {} FROM vocabulary_progress
             WHERE learner_id = ?1 AND next_review_day <= ?2
             ORDER BY next_review_day ASC, item_id ASC
             LIMIT ?3",
            PROGRESS_COLUMNS
        );
        let mut stmt = reader.prepare(&sql)?;

        let rows = stmt.query_map(
            params![learner_id, today.num_days_from_ce(), limit],
            Self::row_to_progress,
        )?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    fn delete(&self, learner_id: &str, item_id: &str) -> Result<bool> {
        let writer = self.writer()?;
        let rows = writer.execute(
            "DELETE FROM vocabulary_progress WHERE learner_id = ?1 AND item_id = ?2",
            params![learner_id, item_id],
        )?;
        Ok(rows > 0)
    }
}

// ============================================================================
// TESTS
// ============================================================================
