use chrono::{DateTime, Utc};

use storage::repository::CardRepository;
use studydeck_core::{
    model::{Card, CardId, DeckId, Rating, ReviewOutcome},
    time::Clock,
};

use crate::error::ReviewServiceError;

//
// ─── REVIEW RESULT ─────────────────────────────────────────────────────────────
//

/// A rating that was applied and stored.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedReview {
    pub card: Card,
    pub outcome: ReviewOutcome,
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Applies a user's rating to a card and schedules its next review.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewService {
    clock: Clock,
}

impl ReviewService {
    /// Create a review service using the real-time clock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the clock (usually for deterministic testing).
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Current time according to the service's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Apply a rating to an in-memory card.
    ///
    /// ```
    /// # use services::ReviewService;
    /// # use studydeck_core::model::{Card, CardId, DeckId, Rating};
    /// # use studydeck_core::time::fixed_clock;
    /// let service = ReviewService::new().with_clock(fixed_clock());
    /// let mut card = Card::new(CardId::new(1), DeckId::new(1), "Q", "A", service.now());
    /// let outcome = service.review_card(&mut card, Rating::Medium, service.now());
    /// assert_eq!(outcome.interval_days, 1);
    /// assert_eq!(card.review_count(), 1);
    /// ```
    pub fn review_card(
        &self,
        card: &mut Card,
        rating: Rating,
        reviewed_at: DateTime<Utc>,
    ) -> ReviewOutcome {
        let outcome = card.apply_rating(rating, reviewed_at);
        log::debug!(
            "Card {} rated {:?}: review #{} due in {} day(s)",
            card.id(),
            rating,
            outcome.review_count,
            outcome.interval_days
        );
        outcome
    }

    /// Apply a rating and store the new scheduling state.
    ///
    /// If persistence fails, the card is rolled back to its original state.
    ///
    /// # Errors
    ///
    /// Returns storage errors if persistence fails, including
    /// `StorageError::Conflict` when the card was rated elsewhere meanwhile.
    pub async fn review_card_persisted(
        &self,
        card: &mut Card,
        rating: Rating,
        reviewed_at: DateTime<Utc>,
        cards: &dyn CardRepository,
    ) -> Result<ReviewOutcome, ReviewServiceError> {
        let original = card.clone();
        let outcome = self.review_card(card, rating, reviewed_at);

        match cards.record_review(card, original.review_count()).await {
            Ok(()) => Ok(outcome),
            Err(err) => {
                log::warn!("Could not store rating for card {}: {err}", card.id());
                *card = original;
                Err(err.into())
            }
        }
    }

    /// Load a card, apply a rating at the service clock's time, and store it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the card is missing, or other
    /// storage errors if loading or persisting fails.
    pub async fn review_card_by_id(
        &self,
        deck_id: DeckId,
        card_id: CardId,
        rating: Rating,
        cards: &dyn CardRepository,
    ) -> Result<PersistedReview, ReviewServiceError> {
        let mut card = cards.get_card(deck_id, card_id).await?;
        let reviewed_at = self.now();
        let outcome = self
            .review_card_persisted(&mut card, rating, reviewed_at, cards)
            .await?;
        Ok(PersistedReview { card, outcome })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
