//! SM-2 Scheduler
//!
//! Retention state, validation, and the engine that applies a review.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::algorithm::{
    next_ease_factor, next_interval, next_review_date, DEFAULT_EASE_FACTOR, INITIAL_INTERVAL,
    MIN_EASE_FACTOR,
};
use super::quality::{quality_labels, Quality};
use crate::clock::{Clock, SystemClock};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Scheduler error type
///
/// Every variant is a caller contract violation; none are transient.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchedulerError {
    /// Quality rating outside [0, 5]
    #[error("Invalid quality {0}: must be between 0 and 5")]
    InvalidQuality(i32),
    /// Stored state violates its invariants
    #[error("Invalid prior state: {0}")]
    InvalidPriorState(String),
    /// Interval or review date does not fit the representable range
    #[error("Interval overflow: next review date is out of range")]
    IntervalOverflow,
}

// ============================================================================
// RETENTION STATE
// ============================================================================

/// Scheduling state for one learner and one vocabulary item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionState {
    /// Difficulty multiplier controlling how fast intervals grow (>= 1.3)
    pub ease_factor: f64,
    /// Days until the next review, as of the last update
    pub interval: i32,
    /// Consecutive successful reviews since creation or the last failure
    pub repetitions: i32,
    /// Calendar date the item becomes due again
    pub next_review_date: NaiveDate,
}

impl RetentionState {
    /// State for an item that just entered the study set
    pub fn initial(today: NaiveDate) -> Self {
        Self {
            ease_factor: DEFAULT_EASE_FACTOR,
            interval: INITIAL_INTERVAL,
            repetitions: 0,
            next_review_date: today,
        }
    }

    /// Check the invariants a stored record must satisfy.
    ///
    /// Violations are reported, never repaired.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if !self.ease_factor.is_finite() {
            return Err(SchedulerError::InvalidPriorState(format!(
                "ease factor {} is not a finite number",
                self.ease_factor
            )));
        }
        if self.ease_factor < MIN_EASE_FACTOR {
            return Err(SchedulerError::InvalidPriorState(format!(
                "ease factor {} is below the {} floor",
                self.ease_factor, MIN_EASE_FACTOR
            )));
        }
        if self.interval < 0 {
            return Err(SchedulerError::InvalidPriorState(format!(
                "interval {} is negative",
                self.interval
            )));
        }
        if self.repetitions < 0 {
            return Err(SchedulerError::InvalidPriorState(format!(
                "repetitions {} is negative",
                self.repetitions
            )));
        }
        // A reviewed item always waits at least a day
        if self.repetitions >= 1 && self.interval < INITIAL_INTERVAL {
            return Err(SchedulerError::InvalidPriorState(format!(
                "interval {} after {} successful reviews",
                self.interval, self.repetitions
            )));
        }
        Ok(())
    }

    /// Due on or before `today`
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_review_date <= today
    }
}

/// Apply one review to `current`, evaluated on `today`.
///
/// All four fields are recomputed together; on error nothing is produced.
pub fn compute_next_on(
    current: &RetentionState,
    quality: Quality,
    today: NaiveDate,
) -> Result<RetentionState, SchedulerError> {
    current.validate()?;

    // Failing still moves the ease factor
    let ease_factor = next_ease_factor(current.ease_factor, quality);

    let (interval, repetitions) = if quality.is_passing() {
        let repetitions = current.repetitions.saturating_add(1);
        let interval = next_interval(current.interval, repetitions, ease_factor)?;
        (interval, repetitions)
    } else {
        (INITIAL_INTERVAL, 0)
    };

    Ok(RetentionState {
        ease_factor,
        interval,
        repetitions,
        next_review_date: next_review_date(today, interval)?,
    })
}

// ============================================================================
// PREVIEW
// ============================================================================

/// Resulting state for each answer button
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPreview {
    pub again: RetentionState,
    pub hard: RetentionState,
    pub good: RetentionState,
    pub easy: RetentionState,
}

// ============================================================================
// ENGINE
// ============================================================================

/// SM-2 scheduling engine
///
/// Holds nothing but the clock that answers "what day is it". Every call is
/// an independent computation over caller-supplied state.
#[derive(Debug, Clone, Default)]
pub struct SchedulingEngine<C = SystemClock> {
    clock: C,
}

impl SchedulingEngine<SystemClock> {
    /// Engine reading the local wall-clock date
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock> SchedulingEngine<C> {
    /// Engine with an injected clock
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// The injected clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Current calendar date according to the clock
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Initial state for a new item, due today
    pub fn initialize(&self) -> RetentionState {
        RetentionState::initial(self.today())
    }

    /// Validate a raw quality rating and apply it.
    ///
    /// The rating is checked before the prior state is looked at.
    pub fn compute_next(
        &self,
        current: &RetentionState,
        quality: i32,
    ) -> Result<RetentionState, SchedulerError> {
        let quality = Quality::new(quality)?;
        self.review(current, quality)
    }

    /// Apply an already validated rating
    pub fn review(
        &self,
        current: &RetentionState,
        quality: Quality,
    ) -> Result<RetentionState, SchedulerError> {
        compute_next_on(current, quality, self.today())
    }

    /// What each answer button would do to `current`
    pub fn preview(&self, current: &RetentionState) -> Result<ReviewPreview, SchedulerError> {
        let today = self.today();
        let [again, hard, good, easy] = quality_labels();

        Ok(ReviewPreview {
            again: compute_next_on(current, again.quality, today)?,
            hard: compute_next_on(current, hard.quality, today)?,
            good: compute_next_on(current, good.quality, today)?,
            easy: compute_next_on(current, easy.quality, today)?,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
