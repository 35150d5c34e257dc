use std::sync::Arc;

use storage::repository::{CardRepository, DeckRepository, StorageError};
use studydeck_core::model::{DeckId, Rating};

use super::service::{SessionReview, StudySession};
use crate::Clock;
use crate::error::SessionError;
use crate::review_service::ReviewService;

/// Result of answering a single card in a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionAnswerResult {
    pub review: SessionReview,
    pub is_complete: bool,
}

/// Orchestrates session start and persisted answering.
#[derive(Clone)]
pub struct SessionLoopService {
    clock: Clock,
    decks: Arc<dyn DeckRepository>,
    cards: Arc<dyn CardRepository>,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(clock: Clock, decks: Arc<dyn DeckRepository>, cards: Arc<dyn CardRepository>) -> Self {
        Self {
            clock,
            decks,
            cards,
        }
    }

    /// Load every card of a deck and start a session ordered at the current time.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for an unknown deck,
    /// `SessionError::Empty` for a deck without cards, or other storage errors.
    pub async fn start_session(&self, deck_id: DeckId) -> Result<StudySession, SessionError> {
        if self.decks.get_deck(deck_id).await?.is_none() {
            return Err(StorageError::NotFound.into());
        }

        let cards = self.cards.cards_for_deck(deck_id).await?;
        let started_at = self.clock.now();
        log::debug!("Starting session for deck {deck_id} with {} card(s)", cards.len());
        StudySession::new(deck_id, cards, started_at)
    }

    /// Rate the current card, store it, and report where the session stands.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` for review or persistence failures.
    pub async fn answer_current(
        &self,
        session: &mut StudySession,
        rating: Rating,
    ) -> Result<SessionAnswerResult, SessionError> {
        let review_service = ReviewService::new().with_clock(self.clock);
        let reviewed_at = review_service.now();
        let review = session
            .answer_current_persisted(&review_service, rating, reviewed_at, self.cards.as_ref())
            .await?
            .clone();

        Ok(SessionAnswerResult {
            review,
            is_complete: session.is_complete(),
        })
    }
}
