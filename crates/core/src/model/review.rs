use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::CardId;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors that can occur during review operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error("invalid rating value: {0} (expected 1 = easy, 2 = medium, 3 = hard)")]
    InvalidRating(i64),
}

//
// ─── DIFFICULTY ───────────────────────────────────────────────────────────────
//

/// Difficulty level stored on a card.
///
/// The scheduler only ever produces `EASY`, `MEDIUM` or `HARD`, and `NEW` is
/// the level of a card that was never rated. Levels outside `0..=3` can still
/// arrive from storage; they are kept verbatim and ordered numerically.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Difficulty(i64);

impl Difficulty {
    pub const NEW: Self = Self(0);
    pub const EASY: Self = Self(1);
    pub const MEDIUM: Self = Self(2);
    pub const HARD: Self = Self(3);

    #[must_use]
    pub const fn from_level(level: i64) -> Self {
        Self(level)
    }

    #[must_use]
    pub const fn level(self) -> i64 {
        self.0
    }

    /// Human-readable label, `None` for levels outside the known range.
    #[must_use]
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::NEW => Some("New"),
            Self::EASY => Some("Easy"),
            Self::MEDIUM => Some("Medium"),
            Self::HARD => Some("Hard"),
            _ => None,
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::NEW
    }
}

impl fmt::Debug for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Some(label) => write!(f, "Difficulty::{label}"),
            None => write!(f, "Difficulty({})", self.0),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Some(label) => f.write_str(label),
            None => write!(f, "Unknown({})", self.0),
        }
    }
}

//
// ─── RATING ───────────────────────────────────────────────────────────────────
//

/// Feedback a user gives after revealing the back of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rating {
    /// Recalled without effort. Shown much less often.
    Easy,
    /// Recalled with some effort.
    Medium,
    /// Struggled to recall. Resurfaces quickly.
    Hard,
}

impl Rating {
    /// Parses the numeric rating used by the study screen (1 = easy, 2 = medium, 3 = hard).
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::InvalidRating` for any other value.
    pub fn from_level(value: i64) -> Result<Self, ReviewError> {
        match value {
            1 => Ok(Self::Easy),
            2 => Ok(Self::Medium),
            3 => Ok(Self::Hard),
            _ => Err(ReviewError::InvalidRating(value)),
        }
    }

    /// Difficulty level a card takes on after being rated.
    #[must_use]
    pub fn difficulty(self) -> Difficulty {
        match self {
            Rating::Easy => Difficulty::EASY,
            Rating::Medium => Difficulty::MEDIUM,
            Rating::Hard => Difficulty::HARD,
        }
    }
}

//
// ─── REVIEW OUTCOME ──────────────────────────────────────────────────────────
//

/// What a single rating event did to a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub card_id: CardId,
    pub rating: Rating,
    pub reviewed_at: DateTime<Utc>,
    /// Review count including this rating.
    pub review_count: u32,
    pub interval_days: u32,
    pub next_review_at: DateTime<Utc>,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
