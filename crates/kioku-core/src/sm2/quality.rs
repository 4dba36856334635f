//! Recall quality ratings
//!
//! The engine accepts the full six-point SM-2 scale. Review screens collapse
//! it to four buttons (Again, Hard, Good, Easy); that mapping lives here as
//! presentation metadata and has no influence on scheduling.

use serde::{Deserialize, Serialize};

use super::scheduler::SchedulerError;

/// Lowest quality that counts as a successful recall
pub const PASSING_QUALITY: u8 = 3;

/// A validated SM-2 quality rating in the closed range [0, 5]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Quality(u8);

impl Quality {
    /// Complete blackout
    pub const BLACKOUT: Quality = Quality(0);
    /// Incorrect, but the answer felt easy once shown
    pub const INCORRECT: Quality = Quality(1);
    /// Incorrect, but the answer was remembered once shown
    pub const INCORRECT_REMEMBERED: Quality = Quality(2);
    /// Correct with serious difficulty
    pub const CORRECT_HARD: Quality = Quality(3);
    /// Correct after hesitation
    pub const CORRECT_HESITANT: Quality = Quality(4);
    /// Perfect recall
    pub const PERFECT: Quality = Quality(5);

    /// Validate a raw rating
    pub fn new(value: i32) -> Result<Self, SchedulerError> {
        match value {
            0..=5 => Ok(Quality(value as u8)),
            _ => Err(SchedulerError::InvalidQuality(value)),
        }
    }

    /// Numeric value (0-5)
    pub fn value(self) -> u8 {
        self.0
    }

    /// Whether this rating counts as a successful review
    pub fn is_passing(self) -> bool {
        self.0 >= PASSING_QUALITY
    }

    /// Human-readable description
    pub fn description(self) -> &'static str {
        match self.0 {
            0 => "Complete blackout",
            1 => "Incorrect, but felt easy",
            2 => "Incorrect, but remembered",
            3 => "Correct with difficulty",
            4 => "Correct with hesitation",
            _ => "Perfect!",
        }
    }

    /// All six ratings, lowest first
    pub fn all() -> impl Iterator<Item = Quality> {
        (0..=5).map(Quality)
    }
}

impl TryFrom<i32> for Quality {
    type Error = SchedulerError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Quality::new(value)
    }
}

impl From<Quality> for i32 {
    fn from(quality: Quality) -> Self {
        i32::from(quality.0)
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Quality {
    type Err = String;

    /// Accepts a digit (`"0"`..`"5"`) or a button label (`"again"`, `"hard"`,
    /// `"good"`, `"easy"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(value) = s.parse::<i32>() {
            return Quality::new(value).map_err(|e| e.to_string());
        }

        quality_labels()
            .into_iter()
            .find(|button| button.label.eq_ignore_ascii_case(s))
            .map(|button| button.quality)
            .ok_or_else(|| format!("Unknown quality: {}", s))
    }
}

/// Describe a raw rating; `"Unknown"` outside [0, 5]
pub fn describe_quality(quality: i32) -> &'static str {
    match Quality::new(quality) {
        Ok(q) => q.description(),
        Err(_) => "Unknown",
    }
}

/// Map a plain correct/incorrect answer onto the scale (4 or 1)
pub fn quality_from_correct(correct: bool) -> Quality {
    if correct {
        Quality::CORRECT_HESITANT
    } else {
        Quality::INCORRECT
    }
}

// ============================================================================
// ANSWER BUTTONS
// ============================================================================

/// Visual tier of an answer button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Danger,
    Warning,
    Primary,
    Success,
}

impl QualityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Danger => "danger",
            QualityTier::Warning => "warning",
            QualityTier::Primary => "primary",
            QualityTier::Success => "success",
        }
    }
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One answer button on a review screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QualityButton {
    pub quality: Quality,
    pub label: &'static str,
    pub tier: QualityTier,
}

/// The four answer buttons, in display order.
///
/// Qualities 1 and 2 have no button of their own.
pub fn quality_labels() -> [QualityButton; 4] {
    [
        QualityButton {
            quality: Quality::BLACKOUT,
            label: "Again",
            tier: QualityTier::Danger,
        },
        QualityButton {
            quality: Quality::CORRECT_HARD,
            label: "Hard",
            tier: QualityTier::Warning,
        },
        QualityButton {
            quality: Quality::CORRECT_HESITANT,
            label: "Good",
            tier: QualityTier::Primary,
        },
        QualityButton {
            quality: Quality::PERFECT,
            label: "Easy",
            tier: QualityTier::Success,
        },
    ]
}
