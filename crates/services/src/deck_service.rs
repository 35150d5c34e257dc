use std::sync::Arc;

use chrono::{DateTime, Utc};
use storage::repository::{CardRepository, DeckRepository, StorageError};
use studydeck_core::model::{Card, CardId, Deck, DeckId, GeneratedCard, SourceKind};
use studydeck_core::stats::DeckStats;

use crate::Clock;
use crate::error::DeckServiceError;
use crate::generator::CardGenerator;

/// A deck together with its cards and the counts shown on its overview.
#[derive(Debug, Clone, PartialEq)]
pub struct DeckOverview {
    pub deck: Deck,
    pub cards: Vec<Card>,
    pub stats: DeckStats,
}

/// Orchestrates deck creation, card import and deck overviews.
#[derive(Clone)]
pub struct DeckService {
    clock: Clock,
    decks: Arc<dyn DeckRepository>,
    cards: Arc<dyn CardRepository>,
}

impl DeckService {
    #[must_use]
    pub fn new(clock: Clock, decks: Arc<dyn DeckRepository>, cards: Arc<dyn CardRepository>) -> Self {
        Self {
            clock,
            decks,
            cards,
        }
    }

    /// Create and persist an empty deck.
    ///
    /// # Errors
    ///
    /// Returns `DeckServiceError::Deck` for validation failures.
    /// Returns `DeckServiceError::Storage` if persistence fails.
    pub async fn create_deck(
        &self,
        title: String,
        description: Option<String>,
        source: SourceKind,
    ) -> Result<Deck, DeckServiceError> {
        let deck = self.new_deck(title, description, source).await?;
        self.decks.upsert_deck(&deck).await?;
        log::debug!("Created deck {} ({})", deck.id(), deck.title());
        Ok(deck)
    }

    /// Store generated pairs as new cards of an existing deck.
    ///
    /// Pairs with a blank side are dropped. New cards start unrated and due
    /// immediately. The cards and the deck's new `updated_at` are written
    /// together, so a storage failure adds no cards.
    ///
    /// # Errors
    ///
    /// Returns `DeckServiceError::NoCards` if nothing usable remains.
    /// Returns `StorageError::NotFound` if the deck does not exist.
    pub async fn add_cards(
        &self,
        deck_id: DeckId,
        pairs: Vec<GeneratedCard>,
    ) -> Result<Vec<Card>, DeckServiceError> {
        let mut deck = self
            .decks
            .get_deck(deck_id)
            .await?
            .ok_or(StorageError::NotFound)?;

        let usable = usable_pairs(pairs)?;
        let now = self.clock.now();

        let first_id = self
            .cards
            .cards_for_deck(deck_id)
            .await?
            .iter()
            .map(Card::id)
            .max()
            .map_or(CardId::new(1), CardId::next);

        let created = build_cards(deck_id, first_id, usable, now);
        deck.touch(now);
        self.decks.save_deck_with_cards(&deck, &created).await?;

        log::debug!("Added {} card(s) to deck {deck_id}", created.len());
        Ok(created)
    }

    /// Run a generator over source material and store the result as a new deck.
    ///
    /// The deck and its cards are written in one step: nothing is stored when
    /// the generator fails, yields no usable pairs, or the write fails.
    ///
    /// # Errors
    ///
    /// Returns `DeckServiceError::Generator` for generator failures,
    /// `DeckServiceError::NoCards` for an empty result, and validation or
    /// storage errors from deck creation.
    pub async fn create_from_source(
        &self,
        generator: &dyn CardGenerator,
        title: String,
        description: Option<String>,
        source: SourceKind,
        material: &str,
    ) -> Result<DeckOverview, DeckServiceError> {
        let pairs = usable_pairs(generator.generate(material).await?)?;
        let deck = self.new_deck(title, description, source).await?;
        let cards = build_cards(deck.id(), CardId::new(1), pairs, deck.created_at());
        self.decks.save_deck_with_cards(&deck, &cards).await?;
        log::debug!(
            "Created deck {} ({}) with {} card(s)",
            deck.id(),
            deck.title(),
            cards.len()
        );
        self.overview(deck.id()).await
    }

    /// All decks, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DeckServiceError::Storage` if repository access fails.
    pub async fn list_decks(&self) -> Result<Vec<Deck>, DeckServiceError> {
        Ok(self.decks.list_decks().await?)
    }

    /// A deck with its cards and statistics at the clock's current time.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the deck does not exist.
    pub async fn overview(&self, deck_id: DeckId) -> Result<DeckOverview, DeckServiceError> {
        let deck = self
            .decks
            .get_deck(deck_id)
            .await?
            .ok_or(StorageError::NotFound)?;
        let cards = self.cards.cards_for_deck(deck_id).await?;
        let stats = DeckStats::from_cards(&cards, self.clock.now());
        Ok(DeckOverview { deck, cards, stats })
    }

    /// Validate a deck under the next free id without storing it.
    async fn new_deck(
        &self,
        title: String,
        description: Option<String>,
        source: SourceKind,
    ) -> Result<Deck, DeckServiceError> {
        let id = self
            .decks
            .list_decks()
            .await?
            .iter()
            .map(Deck::id)
            .max()
            .map_or(DeckId::new(1), DeckId::next);

        Ok(Deck::new(id, title, description, source, self.clock.now())?)
    }
}

fn build_cards(
    deck_id: DeckId,
    first_id: CardId,
    pairs: Vec<GeneratedCard>,
    now: DateTime<Utc>,
) -> Vec<Card> {
    let mut next_id = first_id;
    pairs
        .into_iter()
        .map(|pair| {
            let card = Card::new(next_id, deck_id, pair.front, pair.back, now);
            next_id = next_id.next();
            card
        })
        .collect()
}

fn usable_pairs(pairs: Vec<GeneratedCard>) -> Result<Vec<GeneratedCard>, DeckServiceError> {
    let total = pairs.len();
    let usable: Vec<GeneratedCard> = pairs.into_iter().filter(|p| !p.is_blank()).collect();
    if usable.len() < total {
        log::warn!("Dropped {} blank card(s)", total - usable.len());
    }
    if usable.is_empty() {
        return Err(DeckServiceError::NoCards);
    }
    Ok(usable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeneratorError;
    use crate::generator::TabSeparatedGenerator;
    use storage::repository::InMemoryRepository;
    use studydeck_core::model::{Difficulty, Rating};
    use studydeck_core::time::{fixed_clock, fixed_now};

    fn service(repo: &InMemoryRepository) -> DeckService {
        DeckService::new(fixed_clock(), Arc::new(repo.clone()), Arc::new(repo.clone()))
    }

    struct FailingGenerator;

    /// Reads from memory but refuses every batched deck write.
    struct ReadOnlyDecks(InMemoryRepository);

    #[async_trait::async_trait]
    impl DeckRepository for ReadOnlyDecks {
        async fn upsert_deck(&self, _deck: &Deck) -> Result<(), StorageError> {
            Err(StorageError::Connection("read-only".into()))
        }

        async fn get_deck(&self, id: DeckId) -> Result<Option<Deck>, StorageError> {
            self.0.get_deck(id).await
        }

        async fn list_decks(&self) -> Result<Vec<Deck>, StorageError> {
            self.0.list_decks().await
        }

        async fn save_deck_with_cards(
            &self,
            _deck: &Deck,
            _cards: &[Card],
        ) -> Result<(), StorageError> {
            Err(StorageError::Connection("read-only".into()))
        }
    }

    #[async_trait::async_trait]
    impl CardGenerator for FailingGenerator {
        async fn generate(&self, _source: &str) -> Result<Vec<GeneratedCard>, GeneratorError> {
            Err(GeneratorError::Backend("quota exceeded".into()))
        }
    }

    #[tokio::test]
    async fn create_deck_assigns_increasing_ids() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let first = svc.create_deck("One".into(), None, SourceKind::Text).await.unwrap();
        let second = svc.create_deck("Two".into(), None, SourceKind::Pdf).await.unwrap();
        assert_eq!(first.id(), DeckId::new(1));
        assert_eq!(second.id(), DeckId::new(2));
    }

    #[tokio::test]
    async fn create_deck_rejects_blank_title() {
        let repo = InMemoryRepository::new();
        let err = service(&repo)
            .create_deck("   ".into(), None, SourceKind::Text)
            .await
            .unwrap_err();
        assert!(matches!(err, DeckServiceError::Deck(_)));
    }

    #[tokio::test]
    async fn add_cards_starts_cards_new_and_due() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let deck = svc.create_deck("Bio".into(), None, SourceKind::Text).await.unwrap();

        let created = svc
            .add_cards(
                deck.id(),
                vec![
                    GeneratedCard::new("Q1", "A1"),
                    GeneratedCard::new(" ", "A2"),
                    GeneratedCard::new("Q3", "A3"),
                ],
            )
            .await
            .unwrap();

        assert_eq!(created.len(), 2);
        for card in &created {
            assert_eq!(card.difficulty(), Difficulty::NEW);
            assert_eq!(card.review_count(), 0);
            assert_eq!(card.next_review_at(), fixed_now());
        }

        let more = svc
            .add_cards(deck.id(), vec![GeneratedCard::new("Q4", "A4")])
            .await
            .unwrap();
        assert_eq!(more[0].id(), CardId::new(3));
    }

    #[tokio::test]
    async fn add_cards_needs_an_existing_deck_and_usable_pairs() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let err = svc
            .add_cards(DeckId::new(7), vec![GeneratedCard::new("Q", "A")])
            .await
            .unwrap_err();
        assert!(matches!(err, DeckServiceError::Storage(StorageError::NotFound)));

        let deck = svc.create_deck("Bio".into(), None, SourceKind::Text).await.unwrap();
        let err = svc
            .add_cards(deck.id(), vec![GeneratedCard::new("", "")])
            .await
            .unwrap_err();
        assert!(matches!(err, DeckServiceError::NoCards));
    }

    #[tokio::test]
    async fn create_from_source_builds_deck_with_stats() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let overview = svc
            .create_from_source(
                &TabSeparatedGenerator,
                "Capitals".into(),
                Some("Europe".into()),
                SourceKind::Text,
                "France\tParis\nItaly\tRome\n",
            )
            .await
            .unwrap();

        assert_eq!(overview.deck.title(), "Capitals");
        assert_eq!(overview.cards.len(), 2);
        assert_eq!(overview.stats.total, 2);
        assert_eq!(overview.stats.due, 2);
        assert_eq!(overview.stats.new, 2);
        assert_eq!(overview.stats.mastered, 0);
    }

    #[tokio::test]
    async fn generator_failure_stores_nothing() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let err = svc
            .create_from_source(
                &FailingGenerator,
                "Capitals".into(),
                None,
                SourceKind::Text,
                "France\tParis",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DeckServiceError::Generator(_)));
        assert!(svc.list_decks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn overview_counts_mastered_cards() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let deck = svc.create_deck("Bio".into(), None, SourceKind::Text).await.unwrap();
        let mut cards = svc
            .add_cards(deck.id(), vec![GeneratedCard::new("Q", "A")])
            .await
            .unwrap();

        let card = &mut cards[0];
        for _ in 0..3 {
            card.apply_rating(Rating::Easy, fixed_now());
        }
        repo.upsert_card(card).await.unwrap();

        let overview = svc.overview(deck.id()).await.unwrap();
        assert_eq!(overview.stats.mastered, 1);
        assert_eq!(overview.stats.due, 0);
    }

    #[tokio::test]
    async fn failed_import_write_leaves_no_deck_behind() {
        let repo = InMemoryRepository::new();
        let svc = DeckService::new(
            fixed_clock(),
            Arc::new(ReadOnlyDecks(repo.clone())),
            Arc::new(repo.clone()),
        );

        let err = svc
            .create_from_source(
                &TabSeparatedGenerator,
                "Capitals".into(),
                None,
                SourceKind::Text,
                "France\tParis\nItaly\tRome\n",
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DeckServiceError::Storage(StorageError::Connection(_))));
        assert!(repo.list_decks().await.unwrap().is_empty());
        assert!(repo.cards_for_deck(DeckId::new(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_card_write_adds_no_cards() {
        let repo = InMemoryRepository::new();
        let deck = Deck::new(DeckId::new(1), "Bio", None, SourceKind::Text, fixed_now()).unwrap();
        repo.upsert_deck(&deck).await.unwrap();
        let svc = DeckService::new(
            fixed_clock(),
            Arc::new(ReadOnlyDecks(repo.clone())),
            Arc::new(repo.clone()),
        );

        let err = svc
            .add_cards(deck.id(), vec![GeneratedCard::new("Q1", "A1"), GeneratedCard::new("Q2", "A2")])
            .await
            .unwrap_err();

        assert!(matches!(err, DeckServiceError::Storage(_)));
        assert!(repo.cards_for_deck(deck.id()).await.unwrap().is_empty());
        assert_eq!(repo.get_deck(deck.id()).await.unwrap(), Some(deck));
    }
}
