use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{CardId, DeckId};
use crate::model::review::{Difficulty, Rating, ReviewOutcome};
use crate::scheduler;

/// Review count from which an easy card is displayed as mastered.
pub const MASTERED_MIN_REVIEWS: u32 = 3;

//
// ─── GENERATED PAIRS ───────────────────────────────────────────────────────────
//

/// A front/back pair produced by a card generator, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedCard {
    pub front: String,
    pub back: String,
}

impl GeneratedCard {
    #[must_use]
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
        }
    }

    /// True when either side is empty after trimming.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.front.trim().is_empty() || self.back.trim().is_empty()
    }
}

//
// ─── CARD ──────────────────────────────────────────────────────────────────────
//

/// A study card together with its scheduling state.
///
/// `front` and `back` are carried as opaque text. Scheduling fields only change
/// through [`Card::apply_rating`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    id: CardId,
    deck_id: DeckId,
    front: String,
    back: String,
    difficulty: Difficulty,
    review_count: u32,
    next_review_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Card {
    /// Creates a never-reviewed card that is due immediately.
    #[must_use]
    pub fn new(
        id: CardId,
        deck_id: DeckId,
        front: impl Into<String>,
        back: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            deck_id,
            front: front.into(),
            back: back.into(),
            difficulty: Difficulty::NEW,
            review_count: 0,
            next_review_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuilds a card from stored fields without touching any of them.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: CardId,
        deck_id: DeckId,
        front: String,
        back: String,
        difficulty: Difficulty,
        review_count: u32,
        next_review_at: DateTime<Utc>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            deck_id,
            front,
            back,
            difficulty,
            review_count,
            next_review_at,
            created_at,
            updated_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> CardId {
        self.id
    }

    #[must_use]
    pub fn deck_id(&self) -> DeckId {
        self.deck_id
    }

    #[must_use]
    pub fn front(&self) -> &str {
        &self.front
    }

    #[must_use]
    pub fn back(&self) -> &str {
        &self.back
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn review_count(&self) -> u32 {
        self.review_count
    }

    #[must_use]
    pub fn next_review_at(&self) -> DateTime<Utc> {
        self.next_review_at
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// A card is due once its next review instant is at or before `now`.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at <= now
    }

    /// Never rated yet.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.review_count == 0
    }

    /// Display label only; it has no effect on scheduling or ordering.
    #[must_use]
    pub fn is_mastered(&self) -> bool {
        self.difficulty == Difficulty::EASY && self.review_count >= MASTERED_MIN_REVIEWS
    }

    /// Applies one rating event: bumps the review count, records the rating as
    /// the card's difficulty and schedules the next review from `reviewed_at`.
    pub fn apply_rating(&mut self, rating: Rating, reviewed_at: DateTime<Utc>) -> ReviewOutcome {
        let review_count = self.review_count.saturating_add(1);
        let difficulty = rating.difficulty();
        let interval_days = scheduler::interval_days(difficulty, review_count);
        let next_review_at = scheduler::compute_next_review(difficulty, review_count, reviewed_at);

        self.difficulty = difficulty;
        self.review_count = review_count;
        self.next_review_at = next_review_at;
        self.updated_at = reviewed_at;

        ReviewOutcome {
            card_id: self.id,
            rating,
            reviewed_at,
            review_count,
            interval_days,
            next_review_at,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
