//! Review workflow
//!
//! Runs the read-compute-write sequence around the scheduler: load the latest
//! committed progress, apply the learner's rating, save against the version
//! that was read. A concurrent review of the same item makes the second save
//! fail with `Conflict`; the caller decides whether to reload and retry.

use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::progress::{ReviewStats, VocabularyProgress};
use crate::sm2::{quality_from_correct, Quality, ReviewPreview, SchedulingEngine};
use crate::storage::{ProgressStore, Result, StorageError};

/// Review operations over a [`ProgressStore`]
pub struct ReviewService<S, C = SystemClock> {
    store: S,
    engine: SchedulingEngine<C>,
}

impl<S: ProgressStore> ReviewService<S, SystemClock> {
    /// Service using the wall clock
    pub fn new(store: S) -> Self {
        Self {
            store,
            engine: SchedulingEngine::new(),
        }
    }
}

impl<S: ProgressStore, C: Clock> ReviewService<S, C> {
    /// Service with an injected clock
    pub fn with_clock(store: S, clock: C) -> Self {
        Self {
            store,
            engine: SchedulingEngine::with_clock(clock),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn engine(&self) -> &SchedulingEngine<C> {
        &self.engine
    }

    /// Put an item into the learner's study set, due today
    pub fn start_studying(&self, learner_id: &str, item_id: &str) -> Result<VocabularyProgress> {
        let progress = self.initial_progress(learner_id, item_id);
        let created = self.store.create(&progress)?;

        info!(learner_id, item_id, "Started studying vocabulary");
        Ok(created)
    }

    /// Apply a 0-5 rating to an item.
    ///
    /// An item the learner never started is initialized first. The rating is
    /// validated before storage is touched.
    pub fn submit_review(
        &self,
        learner_id: &str,
        item_id: &str,
        quality: i32,
    ) -> Result<VocabularyProgress> {
        let quality = Quality::new(quality)?;
        self.apply(learner_id, item_id, quality)
    }

    /// Apply a plain correct/incorrect answer (quality 4 or 1)
    pub fn submit_answer(
        &self,
        learner_id: &str,
        item_id: &str,
        correct: bool,
    ) -> Result<VocabularyProgress> {
        self.apply(learner_id, item_id, quality_from_correct(correct))
    }

    /// Items due for the learner today, earliest first
    pub fn due_items(&self, learner_id: &str, limit: usize) -> Result<Vec<VocabularyProgress>> {
        self.store.due(learner_id, self.engine.today(), limit)
    }

    /// Statistics for one item
    pub fn review_stats(&self, learner_id: &str, item_id: &str) -> Result<ReviewStats> {
        let progress = self.store.load(learner_id, item_id)?;
        Ok(progress.stats(self.engine.today()))
    }

    /// Outcome of each answer button, without saving anything
    pub fn preview(&self, learner_id: &str, item_id: &str) -> Result<ReviewPreview> {
        let progress = self.store.load(learner_id, item_id)?;
        Ok(self.engine.preview(&progress.retention)?)
    }

    fn apply(&self, learner_id: &str, item_id: &str, quality: Quality) -> Result<VocabularyProgress> {
        let current = match self.store.load(learner_id, item_id) {
            Ok(progress) => progress,
            Err(e) if e.is_not_found() => {
                self.store.create(&self.initial_progress(learner_id, item_id))?
            }
            Err(e) => return Err(e),
        };

        let next = self.engine.review(&current.retention, quality)?;
        let updated = current.with_review(next, quality, self.engine.clock().now());

        let saved = match self.store.save(&updated) {
            Ok(saved) => saved,
            Err(e @ StorageError::Conflict { .. }) => {
                warn!(learner_id, item_id, version = current.version, "Review lost a concurrent write");
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        info!(
            learner_id,
            item_id,
            quality = quality.value(),
            repetitions = saved.retention.repetitions,
            interval = saved.retention.interval,
            ease_factor = saved.retention.ease_factor,
            next_review_date = %saved.retention.next_review_date,
            "Review submitted"
        );

        Ok(saved)
    }

    fn initial_progress(&self, learner_id: &str, item_id: &str) -> VocabularyProgress {
        VocabularyProgress::new(
            learner_id,
            item_id,
            self.engine.initialize(),
            self.engine.clock().now(),
        )
    }
}
