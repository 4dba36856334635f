//! Test Database Manager
//!
//! Provides isolated progress stores for testing:
//! - Temporary databases that are automatically cleaned up
//! - A shared manual clock so tests can step through days
//! - Pre-seeded study sets in known retention states

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use kioku_core::{ManualClock, ProgressStore, ReviewService, SqliteStore, VocabularyProgress};
use tempfile::TempDir;

/// Manager for test databases
///
/// Creates an isolated store per test. The temporary directory lives as long
/// as the manager does.
///
/// # Example
///
/// ```rust,ignore
/// let db = TestDatabaseManager::new_temp();
/// let service = db.service();
///
/// service.start_studying("learner-1", "taberu")?;
/// db.advance_days(1);
/// ```
pub struct TestDatabaseManager {
    /// The store, shareable across services and threads
    pub store: Arc<SqliteStore>,
    /// Clock shared by every service this manager hands out
    pub clock: Arc<ManualClock>,
    _temp_dir: Option<TempDir>,
    db_path: PathBuf,
}

impl TestDatabaseManager {
    /// Default start date for the manual clock
    pub fn start_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date")
    }

    /// Create a new test database in a temporary directory
    pub fn new_temp() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test_kioku.db");

        let mut db = Self::new_at_path(db_path);
        db._temp_dir = Some(temp_dir);
        db
    }

    /// Create a test database at a specific path
    ///
    /// The database is NOT automatically deleted.
    pub fn new_at_path(path: PathBuf) -> Self {
        let store = SqliteStore::new(Some(path.clone())).expect("Failed to create test store");

        Self {
            store: Arc::new(store),
            clock: Arc::new(ManualClock::new(Self::start_date())),
            _temp_dir: None,
            db_path: path,
        }
    }

    /// Get the database path
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    /// A review service over the shared store and clock
    pub fn service(&self) -> ReviewService<Arc<SqliteStore>, Arc<ManualClock>> {
        ReviewService::with_clock(Arc::clone(&self.store), Arc::clone(&self.clock))
    }

    /// Current date on the manual clock
    pub fn today(&self) -> NaiveDate {
        kioku_core::Clock::today(&*self.clock)
    }

    pub fn advance_days(&self, days: u64) {
        self.clock.advance(days);
    }

    /// Every record the learner has, in review-date order
    pub fn all_items(&self, learner_id: &str) -> Vec<VocabularyProgress> {
        self.store
            .due(learner_id, NaiveDate::MAX, usize::MAX)
            .unwrap_or_default()
    }

    pub fn item_count(&self, learner_id: &str) -> usize {
        self.all_items(learner_id).len()
    }

    // ========================================================================
    // SEEDING METHODS
    // ========================================================================

    /// Start studying the first `count` words of the deck
    pub fn seed_items(&self, learner_id: &str, count: usize) -> Vec<String> {
        let service = self.service();
        let mut ids = Vec::with_capacity(count);

        for item_id in crate::mocks::TestDataFactory::item_ids(count) {
            if service.start_studying(learner_id, &item_id).is_ok() {
                ids.push(item_id);
            }
        }

        ids
    }

    /// Seed three items with distinct histories: new, well learned, struggling
    pub fn seed_with_retention_states(&self, learner_id: &str) -> [String; 3] {
        let service = self.service();
        let ids = [
            "new-word".to_string(),
            "learned-word".to_string(),
            "struggling-word".to_string(),
        ];

        let _ = service.start_studying(learner_id, &ids[0]);

        for quality in [4, 4, 5] {
            let _ = service.submit_review(learner_id, &ids[1], quality);
        }

        for quality in [0, 3, 1] {
            let _ = service.submit_review(learner_id, &ids[2], quality);
        }

        ids
    }

    // ========================================================================
    // CLEANUP
    // ========================================================================

    /// Remove every record the learner has
    pub fn clear(&self, learner_id: &str) {
        for progress in self.all_items(learner_id) {
            let _ = self.store.delete(learner_id, &progress.item_id);
        }
    }

    /// Reopen the database file, as a restarted process would
    pub fn reopen(&mut self) {
        self.store = Arc::new(
            SqliteStore::new(Some(self.db_path.clone())).expect("Failed to reopen store"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_database_creation() {
        let db = TestDatabaseManager::new_temp();
        assert_eq!(db.item_count("learner-1"), 0);
        assert!(db.path().exists());
    }

    #[test]
    fn test_seed_items() {
        let db = TestDatabaseManager::new_temp();
        let ids = db.seed_items("learner-1", 10);

        assert_eq!(ids.len(), 10);
        assert_eq!(db.item_count("learner-1"), 10);
        assert_eq!(db.item_count("learner-2"), 0);
    }

    #[test]
    fn test_seed_with_retention_states() {
        let db = TestDatabaseManager::new_temp();
        let [new, learned, struggling] = db.seed_with_retention_states("learner-1");

        let new = db.store.load("learner-1", &new).unwrap();
        let learned = db.store.load("learner-1", &learned).unwrap();
        let struggling = db.store.load("learner-1", &struggling).unwrap();

        assert_eq!(new.total_reviews, 0);
        assert_eq!(learned.retention.repetitions, 3);
        assert_eq!(struggling.retention.repetitions, 0);
        assert!(struggling.retention.ease_factor < learned.retention.ease_factor);
    }

    #[test]
    fn test_clear_database() {
        let db = TestDatabaseManager::new_temp();
        db.seed_items("learner-1", 5);
        db.seed_items("learner-2", 2);

        db.clear("learner-1");
        assert_eq!(db.item_count("learner-1"), 0);
        assert_eq!(db.item_count("learner-2"), 2);
    }

    #[test]
    fn test_clock_is_shared() {
        let db = TestDatabaseManager::new_temp();
        let service = db.service();

        db.advance_days(3);
        assert_eq!(service.engine().today(), db.today());
        assert_eq!(db.today(), NaiveDate::from_ymd_opt(2026, 10, 22).unwrap());
    }
}
