//! SM-2 core formulas
//!
//! Stateless building blocks. Validation of inputs happens one level up in
//! the scheduler; these functions assume a valid quality and a non-negative
//! interval.

use chrono::{Days, NaiveDate};

use super::quality::Quality;
use super::scheduler::SchedulerError;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Ease factor every new item starts with
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Floor for the ease factor; items never get harder than this
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Interval after the first successful review (and after any failure)
pub const INITIAL_INTERVAL: i32 = 1;

/// Interval after the second consecutive successful review
pub const SECOND_INTERVAL: i32 = 6;

// ============================================================================
// FORMULAS
// ============================================================================

/// Recompute the ease factor for a review of the given quality.
///
/// EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)), clamped below at
/// [`MIN_EASE_FACTOR`]. There is no upper bound.
pub fn next_ease_factor(ease_factor: f64, quality: Quality) -> f64 {
    let distance = 5.0 - f64::from(quality.value());
    let ease_factor = ease_factor + (0.1 - distance * (0.08 + distance * 0.02));

    if ease_factor < MIN_EASE_FACTOR {
        MIN_EASE_FACTOR
    } else {
        ease_factor
    }
}

/// Interval for a successful review.
///
/// `repetitions` is the count *after* this review has been counted and
/// `ease_factor` is the newly computed one. Rounds half away from zero.
pub fn next_interval(
    previous_interval: i32,
    repetitions: i32,
    ease_factor: f64,
) -> Result<i32, SchedulerError> {
    match repetitions {
        1 => Ok(INITIAL_INTERVAL),
        2 => Ok(SECOND_INTERVAL),
        _ => {
            let days = (f64::from(previous_interval) * ease_factor).round();
            if days > f64::from(i32::MAX) {
                return Err(SchedulerError::IntervalOverflow);
            }
            Ok(days as i32)
        }
    }
}

/// Calendar date `interval` days after `today`.
///
/// Plain date arithmetic, so daylight-saving transitions never shift the
/// result.
pub fn next_review_date(today: NaiveDate, interval: i32) -> Result<NaiveDate, SchedulerError> {
    let days = u64::try_from(interval).map_err(|_| SchedulerError::IntervalOverflow)?;
    today
        .checked_add_days(Days::new(days))
        .ok_or(SchedulerError::IntervalOverflow)
}

// ============================================================================
// TESTS
// ============================================================================
