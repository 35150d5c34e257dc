use sqlx::SqliteExecutor;
use studydeck_core::model::{Card, Deck, DeckId};

use super::SqliteRepository;
use super::card_repo::write_card;
use super::mapping::{deck_id_to_i64, map_deck_row};
use crate::repository::{DeckRepository, StorageError};

pub(super) async fn write_deck<'e, E>(executor: E, deck: &Deck) -> Result<(), StorageError>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r"
        INSERT INTO decks (id, title, description, source, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            description = excluded.description,
            source = excluded.source,
            updated_at = excluded.updated_at
        ",
    )
    .bind(deck_id_to_i64(deck.id())?)
    .bind(deck.title().to_owned())
    .bind(deck.description().map(ToOwned::to_owned))
    .bind(deck.source().as_str())
    .bind(deck.created_at())
    .bind(deck.updated_at())
    .execute(executor)
    .await
    .map_err(|e| StorageError::Connection(e.to_string()))?;

    Ok(())
}

#[async_trait::async_trait]
impl DeckRepository for SqliteRepository {
    async fn upsert_deck(&self, deck: &Deck) -> Result<(), StorageError> {
        write_deck(&self.pool, deck).await
    }

    async fn get_deck(&self, id: DeckId) -> Result<Option<Deck>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, title, description, source, created_at, updated_at
            FROM decks
            WHERE id = ?1
            ",
        )
        .bind(deck_id_to_i64(id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_deck_row).transpose()
    }

    async fn list_decks(&self) -> Result<Vec<Deck>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, title, description, source, created_at, updated_at
            FROM decks
            ORDER BY created_at DESC, id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_deck_row).collect()
    }

    async fn save_deck_with_cards(&self, deck: &Deck, cards: &[Card]) -> Result<(), StorageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        // Dropping `tx` on an early return rolls everything back.
        write_deck(&mut *tx, deck).await?;
        for card in cards {
            write_card(&mut *tx, card).await?;
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        log::debug!("Saved deck {} with {} card(s)", deck.id(), cards.len());
        Ok(())
    }
}
