//! Storage contract
//!
//! What the review workflow needs from persistence. The scheduler assumes the
//! state it is handed is the latest committed one; `save` enforces that by
//! rejecting writes based on a stale version.

use chrono::NaiveDate;

use crate::progress::VocabularyProgress;
use crate::sm2::SchedulerError;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// No progress record for the pair
    #[error("Progress not found for learner {learner_id} and item {item_id}")]
    NotFound { learner_id: String, item_id: String },
    /// A record already exists, or the write was based on a stale version
    #[error("Conflict for learner {learner_id} and item {item_id}: {reason}")]
    Conflict {
        learner_id: String,
        item_id: String,
        reason: String,
    },
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid stored date or timestamp
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
    /// Scheduling rejected the input
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

impl StorageError {
    pub(crate) fn not_found(learner_id: &str, item_id: &str) -> Self {
        StorageError::NotFound {
            learner_id: learner_id.to_string(),
            item_id: item_id.to_string(),
        }
    }

    pub(crate) fn conflict(learner_id: &str, item_id: &str, reason: impl Into<String>) -> Self {
        StorageError::Conflict {
            learner_id: learner_id.to_string(),
            item_id: item_id.to_string(),
            reason: reason.into(),
        }
    }

    /// True for `NotFound`
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }

    /// True for `Conflict`
    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::Conflict { .. })
    }
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

// ============================================================================
// CONTRACT
// ============================================================================

/// Persistence for per-(learner, item) progress records
pub trait ProgressStore: Send + Sync {
    /// Latest committed record; `NotFound` if the pair has none
    fn load(&self, learner_id: &str, item_id: &str) -> Result<VocabularyProgress>;

    /// Insert a new record; `Conflict` if the pair already has one
    fn create(&self, progress: &VocabularyProgress) -> Result<VocabularyProgress>;

    /// Write `progress` if the stored version still equals `progress.version`.
    ///
    /// Returns the stored record with its version bumped by one. A stale
    /// version yields `Conflict`; a missing row yields `NotFound`.
    fn save(&self, progress: &VocabularyProgress) -> Result<VocabularyProgress>;

    /// Records with `next_review_date <= today`, earliest first
    fn due(&self, learner_id: &str, today: NaiveDate, limit: usize)
    -> Result<Vec<VocabularyProgress>>;

    /// Remove a record; false if there was none
    fn delete(&self, learner_id: &str, item_id: &str) -> Result<bool>;
}

impl<S: ProgressStore + ?Sized> ProgressStore for std::sync::Arc<S> {
    fn load(&self, learner_id: &str, item_id: &str) -> Result<VocabularyProgress> {
        (**self).load(learner_id, item_id)
    }

    fn create(&self, progress: &VocabularyProgress) -> Result<VocabularyProgress> {
        (**self).create(progress)
    }

    fn save(&self, progress: &VocabularyProgress) -> Result<VocabularyProgress> {
        (**self).save(progress)
    }

    fn due(
        &self,
        learner_id: &str,
        today: NaiveDate,
        limit: usize,
    ) -> Result<Vec<VocabularyProgress>> {
        (**self).due(learner_id, today, limit)
    }

    fn delete(&self, learner_id: &str, item_id: &str) -> Result<bool> {
        (**self).delete(learner_id, item_id)
    }
}
