use chrono::{DateTime, Utc};

use storage::repository::CardRepository;
use studydeck_core::model::{Card, CardId, DeckId, Rating, ReviewOutcome};
use studydeck_core::priority::sort_by_priority;

use super::progress::SessionProgress;
use crate::error::SessionError;
use crate::review_service::ReviewService;

//
// ─── REVIEW RESULT WITH CARD ───────────────────────────────────────────────────
//

/// Captures the outcome of rating a card within a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReview {
    pub card_id: CardId,
    pub outcome: ReviewOutcome,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory study session over every card of a deck.
///
/// Cards are put in priority order once, at `started_at`, and the order stays
/// fixed while the session runs even though ratings move cards' due dates.
#[derive(Debug, Clone)]
pub struct StudySession {
    deck_id: DeckId,
    cards: Vec<Card>,
    current: usize,
    results: Vec<SessionReview>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl StudySession {
    /// Create a session over `cards`, ordered by priority at `started_at`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no cards are provided.
    pub fn new(
        deck_id: DeckId,
        mut cards: Vec<Card>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if cards.is_empty() {
            return Err(SessionError::Empty);
        }

        sort_by_priority(&mut cards, started_at);

        Ok(Self {
            deck_id,
            cards,
            current: 0,
            results: Vec::new(),
            started_at,
            completed_at: None,
        })
    }

    #[must_use]
    pub fn deck_id(&self) -> DeckId {
        self.deck_id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn results(&self) -> &[SessionReview] {
        &self.results
    }

    /// Cards in presentation order.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.cards.len(),
            studied: self.results.len(),
            remaining: self.cards.len().saturating_sub(self.current),
            is_complete: self.is_complete(),
        }
    }

    #[must_use]
    pub fn current_card(&self) -> Option<&Card> {
        self.cards.get(self.current)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Rate the current card in memory and advance.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` if the session is already finished.
    pub fn answer_current(
        &mut self,
        review_service: &ReviewService,
        rating: Rating,
        reviewed_at: DateTime<Utc>,
    ) -> Result<&SessionReview, SessionError> {
        let Some(card) = self.cards.get_mut(self.current) else {
            return Err(SessionError::Completed);
        };
        let outcome = review_service.review_card(card, rating, reviewed_at);
        Ok(self.record_review(outcome, reviewed_at))
    }

    /// Rate the current card, store it, and advance only once it is stored.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` if the session is already finished,
    /// or `SessionError::Review` if the rating could not be stored; the session
    /// then stays on the same card.
    pub async fn answer_current_persisted(
        &mut self,
        review_service: &ReviewService,
        rating: Rating,
        reviewed_at: DateTime<Utc>,
        cards: &dyn CardRepository,
    ) -> Result<&SessionReview, SessionError> {
        let Some(card) = self.cards.get_mut(self.current) else {
            return Err(SessionError::Completed);
        };
        let outcome = review_service
            .review_card_persisted(card, rating, reviewed_at, cards)
            .await?;
        Ok(self.record_review(outcome, reviewed_at))
    }

    fn record_review(&mut self, outcome: ReviewOutcome, reviewed_at: DateTime<Utc>) -> &SessionReview {
        self.results.push(SessionReview {
            card_id: outcome.card_id,
            outcome,
        });
        self.current += 1;
        if self.current >= self.cards.len() {
            self.completed_at = Some(reviewed_at);
            log::debug!(
                "Session for deck {} completed: {} card(s)",
                self.deck_id,
                self.results.len()
            );
        }
        &self.results[self.results.len() - 1]
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use storage::repository::{InMemoryRepository, StorageError};
    use studydeck_core::model::Difficulty;
    use studydeck_core::time::fixed_now;

    fn card(id: u64, difficulty: Difficulty, review_count: u32, due_in_days: i64) -> Card {
        let now = fixed_now();
        Card::from_persisted(
            CardId::new(id),
            DeckId::new(1),
            format!("Q{id}"),
            format!("A{id}"),
            difficulty,
            review_count,
            now + Duration::days(due_in_days),
            now,
            now,
        )
    }

    fn deck_cards() -> Vec<Card> {
        vec![
            card(1, Difficulty::MEDIUM, 2, 5),
            card(2, Difficulty::NEW, 0, 1),
            card(3, Difficulty::EASY, 1, -1),
            card(4, Difficulty::HARD, 1, -1),
        ]
    }

    fn order(session: &StudySession) -> Vec<u64> {
        session.cards().iter().map(|c| c.id().value()).collect()
    }

    #[test]
    fn empty_deck_cannot_start() {
        let err = StudySession::new(DeckId::new(1), Vec::new(), fixed_now()).unwrap_err();
        assert!(matches!(err, SessionError::Empty));
    }

    #[test]
    fn session_presents_cards_in_priority_order() {
        let session = StudySession::new(DeckId::new(1), deck_cards(), fixed_now()).unwrap();
        assert_eq!(order(&session), vec![4, 3, 2, 1]);
        assert_eq!(session.current_card().unwrap().id(), CardId::new(4));
    }

    #[test]
    fn order_is_frozen_while_rating() {
        let service = ReviewService::new();
        let mut session = StudySession::new(DeckId::new(1), deck_cards(), fixed_now()).unwrap();
        let before = order(&session);

        session
            .answer_current(&service, Rating::Easy, fixed_now())
            .unwrap();

        assert_eq!(order(&session), before);
        assert_eq!(session.current_card().unwrap().id(), CardId::new(3));
    }

    #[test]
    fn session_completes_after_last_card() {
        let service = ReviewService::new();
        let mut session = StudySession::new(DeckId::new(1), deck_cards(), fixed_now()).unwrap();

        while !session.is_complete() {
            session
                .answer_current(&service, Rating::Medium, fixed_now())
                .unwrap();
        }

        let progress = session.progress();
        assert_eq!(progress.studied, 4);
        assert_eq!(progress.remaining, 0);
        assert_eq!(progress.percent(), 100);
        assert_eq!(session.completed_at(), Some(fixed_now()));
        assert!(session.current_card().is_none());

        let err = session
            .answer_current(&service, Rating::Hard, fixed_now())
            .unwrap_err();
        assert!(matches!(err, SessionError::Completed));
    }

    #[test]
    fn results_track_each_rating() {
        let service = ReviewService::new();
        let mut session = StudySession::new(DeckId::new(1), deck_cards(), fixed_now()).unwrap();
        let review = session
            .answer_current(&service, Rating::Hard, fixed_now())
            .unwrap()
            .clone();

        assert_eq!(review.card_id, CardId::new(4));
        // card 4 had one review already, so this is review #2
        assert_eq!(review.outcome.review_count, 2);
        assert_eq!(review.outcome.interval_days, 1);
        assert_eq!(session.results().len(), 1);
    }

    #[tokio::test]
    async fn failed_save_keeps_session_on_the_same_card() {
        let repo = InMemoryRepository::new();
        let service = ReviewService::new();
        let mut session = StudySession::new(DeckId::new(1), deck_cards(), fixed_now()).unwrap();
        let before = session.current_card().unwrap().clone();

        let err = session
            .answer_current_persisted(&service, Rating::Easy, fixed_now(), &repo)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SessionError::Review(crate::error::ReviewServiceError::Storage(
                StorageError::NotFound
            ))
        ));
        assert_eq!(session.current_card(), Some(&before));
        assert_eq!(session.progress().studied, 0);
    }
}
