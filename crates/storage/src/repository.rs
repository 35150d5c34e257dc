use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use studydeck_core::model::{Card, CardId, Deck, DeckId};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for decks.
#[async_trait]
pub trait DeckRepository: Send + Sync {
    /// Persist or update a deck.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the deck cannot be stored.
    async fn upsert_deck(&self, deck: &Deck) -> Result<(), StorageError>;

    /// Fetch a deck by ID, `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn get_deck(&self, id: DeckId) -> Result<Option<Deck>, StorageError>;

    /// All decks, most recently created first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn list_decks(&self) -> Result<Vec<Deck>, StorageError>;

    /// Persist a deck and a batch of its cards as one unit.
    ///
    /// Either the deck and every card are stored, or none of them are.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any write fails; nothing is kept in that case.
    async fn save_deck_with_cards(&self, deck: &Deck, cards: &[Card]) -> Result<(), StorageError>;
}

/// Repository contract for cards.
#[async_trait]
pub trait CardRepository: Send + Sync {
    /// Persist or update a card.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the card cannot be stored.
    async fn upsert_card(&self, card: &Card) -> Result<(), StorageError>;

    /// Fetch one card of a deck.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_card(&self, deck_id: DeckId, id: CardId) -> Result<Card, StorageError>;

    /// Every card of a deck, in ascending id order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn cards_for_deck(&self, deck_id: DeckId) -> Result<Vec<Card>, StorageError>;

    /// Store the scheduling state of a freshly rated card.
    ///
    /// The write only happens if the stored review count still equals
    /// `expected_review_count`, i.e. nobody rated the card in between.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the card is missing and
    /// `StorageError::Conflict` if the stored review count moved on.
    async fn record_review(
        &self,
        card: &Card,
        expected_review_count: u32,
    ) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    decks: Arc<Mutex<HashMap<DeckId, Deck>>>,
    cards: Arc<Mutex<HashMap<(DeckId, CardId), Card>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeckRepository for InMemoryRepository {
    async fn upsert_deck(&self, deck: &Deck) -> Result<(), StorageError> {
        let mut guard = self
            .decks
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(deck.id(), deck.clone());
        Ok(())
    }

    async fn get_deck(&self, id: DeckId) -> Result<Option<Deck>, StorageError> {
        let guard = self
            .decks
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&id).cloned())
    }

    async fn list_decks(&self) -> Result<Vec<Deck>, StorageError> {
        let guard = self
            .decks
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut decks: Vec<Deck> = guard.values().cloned().collect();
        decks.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        Ok(decks)
    }

    async fn save_deck_with_cards(&self, deck: &Deck, cards: &[Card]) -> Result<(), StorageError> {
        // Lock order: decks, then cards.
        let mut decks = self
            .decks
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut stored = self
            .cards
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        decks.insert(deck.id(), deck.clone());
        for card in cards {
            stored.insert((card.deck_id(), card.id()), card.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl CardRepository for InMemoryRepository {
    async fn upsert_card(&self, card: &Card) -> Result<(), StorageError> {
        let mut guard = self
            .cards
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert((card.deck_id(), card.id()), card.clone());
        Ok(())
    }

    async fn get_card(&self, deck_id: DeckId, id: CardId) -> Result<Card, StorageError> {
        let guard = self
            .cards
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(&(deck_id, id)).cloned().ok_or(StorageError::NotFound)
    }

    async fn cards_for_deck(&self, deck_id: DeckId) -> Result<Vec<Card>, StorageError> {
        let guard = self
            .cards
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut cards: Vec<Card> = guard
            .values()
            .filter(|c| c.deck_id() == deck_id)
            .cloned()
            .collect();
        cards.sort_by_key(Card::id);
        Ok(cards)
    }

    async fn record_review(
        &self,
        card: &Card,
        expected_review_count: u32,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .cards
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let stored = guard
            .get_mut(&(card.deck_id(), card.id()))
            .ok_or(StorageError::NotFound)?;
        if stored.review_count() != expected_review_count {
            return Err(StorageError::Conflict);
        }
        *stored = card.clone();
        Ok(())
    }
}

/// Aggregates deck and card repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub decks: Arc<dyn DeckRepository>,
    pub cards: Arc<dyn CardRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let decks: Arc<dyn DeckRepository> = Arc::new(repo.clone());
        let cards: Arc<dyn CardRepository> = Arc::new(repo);
        Self { decks, cards }
    }
}
