//! Progress module - per-learner review records
//!
//! Wraps a [`RetentionState`] with the bookkeeping a review history needs:
//! - Review counters (total and correct)
//! - Last review timestamp
//! - An optimistic-concurrency version for the storage layer

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::sm2::{Quality, RetentionState};

// ============================================================================
// VOCABULARY PROGRESS
// ============================================================================

/// A learner's progress on one vocabulary item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyProgress {
    /// Owning learner
    pub learner_id: String,
    /// Vocabulary item being studied
    pub item_id: String,
    /// SM-2 scheduling state
    pub retention: RetentionState,
    /// When the item was last reviewed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reviewed_at: Option<DateTime<Utc>>,
    /// Every review event
    pub total_reviews: u32,
    /// Review events with a passing quality
    pub correct_reviews: u32,
    /// Bumped by the store on every successful save
    pub version: i64,
    /// When the item entered the study set
    pub created_at: DateTime<Utc>,
    /// When the record was last written
    pub updated_at: DateTime<Utc>,
}

impl VocabularyProgress {
    /// Fresh record, as created when a learner starts studying an item
    pub fn new(
        learner_id: impl Into<String>,
        item_id: impl Into<String>,
        retention: RetentionState,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            learner_id: learner_id.into(),
            item_id: item_id.into(),
            retention,
            last_reviewed_at: None,
            total_reviews: 0,
            correct_reviews: 0,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a review that produced `next`.
    ///
    /// Returns a new record; the version is left for the store to bump.
    pub fn with_review(&self, next: RetentionState, quality: Quality, now: DateTime<Utc>) -> Self {
        let correct = u32::from(quality.is_passing());
        Self {
            retention: next,
            last_reviewed_at: Some(now),
            total_reviews: self.total_reviews.saturating_add(1),
            correct_reviews: self.correct_reviews.saturating_add(correct),
            updated_at: now,
            ..self.clone()
        }
    }

    /// Due on or before `today`
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.retention.is_due(today)
    }

    /// Summary for display
    pub fn stats(&self, today: NaiveDate) -> ReviewStats {
        let success_rate = if self.total_reviews > 0 {
            f64::from(self.correct_reviews) / f64::from(self.total_reviews) * 100.0
        } else {
            0.0
        };

        let days_since_last_review = self
            .last_reviewed_at
            .map(|at| (today - at.date_naive()).num_days().max(0));

        let days_until_next_review = (self.retention.next_review_date - today).num_days().max(0);

        ReviewStats {
            success_rate,
            total_reviews: self.total_reviews,
            correct_reviews: self.correct_reviews,
            current_interval_days: self.retention.interval,
            repetitions: self.retention.repetitions,
            ease_factor: self.retention.ease_factor,
            days_since_last_review,
            days_until_next_review,
            is_due: self.is_due(today),
        }
    }
}

// ============================================================================
// REVIEW STATS
// ============================================================================

/// Review statistics for one learner and item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    /// Percentage of passing reviews (0-100)
    pub success_rate: f64,
    pub total_reviews: u32,
    pub correct_reviews: u32,
    pub current_interval_days: i32,
    pub repetitions: i32,
    pub ease_factor: f64,
    /// None if never reviewed
    pub days_since_last_review: Option<i64>,
    /// Zero once the item is due
    pub days_until_next_review: i64,
    pub is_due: bool,
}
