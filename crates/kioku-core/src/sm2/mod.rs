//! SM-2 (SuperMemo 2) Scheduling Module
//!
//! Decides, for a single learned item, how strongly it is retained and when it
//! must be reviewed again.
//!
//! Reference: https://www.supermemo.com/en/archives1990-2015/english/ol/sm2
//!
//! ## Core Formulas:
//! - Ease factor: EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)), floored at 1.3
//! - Interval: I(1) = 1, I(2) = 6, I(n) = round(I(n-1) * EF')
//! - A quality below 3 resets repetitions to 0 and the interval to 1 day,
//!   but the ease factor penalty is still applied

mod algorithm;
mod quality;
mod scheduler;

pub use algorithm::{
    // Core functions
    next_ease_factor,
    next_interval,
    next_review_date,
    // Constants
    DEFAULT_EASE_FACTOR,
    INITIAL_INTERVAL,
    MIN_EASE_FACTOR,
    SECOND_INTERVAL,
};

pub use quality::{
    describe_quality, quality_from_correct, quality_labels, Quality, QualityButton, QualityTier,
    PASSING_QUALITY,
};

pub use scheduler::{
    compute_next_on, RetentionState, ReviewPreview, SchedulerError, SchedulingEngine,
};
