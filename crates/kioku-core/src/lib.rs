//! # Kioku Core
//!
//! Spaced-repetition scheduling for vocabulary study.
//!
//! - **SM-2 engine**: pure transition from an item's retention state and a
//!   0-5 recall quality to the next retention state and review date
//! - **Injectable clock**: "today" is a dependency, so scheduling is
//!   deterministic under test
//! - **Progress records**: per learner and item, with review counters and an
//!   optimistic-concurrency version
//! - **SQLite storage**: load/save with stale-write rejection and a due-item query
//! - **Review service**: the load, compute, save sequence wired together
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kioku_core::{ReviewService, SqliteStore};
//!
//! let store = SqliteStore::new(None)?;
//! let service = ReviewService::new(store);
//!
//! service.start_studying("learner-1", "taberu")?;
//! let progress = service.submit_review("learner-1", "taberu", 5)?;
//! println!("next review on {}", progress.retention.next_review_date);
//! ```
//!
//! ## Feature Flags
//!
//! - `bundled-sqlite` (default): compile SQLite into the crate
//! - `encryption`: SQLCipher, keyed by `KIOKU_ENCRYPTION_KEY`

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod clock;
pub mod progress;
pub mod review;
pub mod sm2;
pub mod storage;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Injectable time source
pub use clock::{Clock, FixedClock, ManualClock, SystemClock};

// SM-2 algorithm
pub use sm2::{
    compute_next_on,
    describe_quality,
    quality_from_correct,
    quality_labels,
    Quality,
    QualityButton,
    QualityTier,
    RetentionState,
    ReviewPreview,
    SchedulerError,
    SchedulingEngine,
    DEFAULT_EASE_FACTOR,
    MIN_EASE_FACTOR,
    PASSING_QUALITY,
};

// Progress records
pub use progress::{ReviewStats, VocabularyProgress};

// Storage layer
pub use storage::{ProgressStore, Result, SqliteStore, StorageError, DB_FILE_NAME};

// Review workflow
pub use review::ReviewService;

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        Clock, ProgressStore, Quality, Result, RetentionState, ReviewService, SchedulingEngine,
        SqliteStore, StorageError, VocabularyProgress,
    };
}
