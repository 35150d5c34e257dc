use sqlx::SqliteExecutor;
use studydeck_core::model::{Card, CardId, DeckId};

use super::SqliteRepository;
use super::mapping::{card_id_to_i64, deck_id_to_i64, map_card_row};
use crate::repository::{CardRepository, StorageError};

const CARD_COLUMNS: &str = r"
    SELECT id, deck_id, front, back, difficulty, review_count,
           next_review_at, created_at, updated_at
    FROM cards
";

pub(super) async fn write_card<'e, E>(executor: E, card: &Card) -> Result<(), StorageError>
where
    E: SqliteExecutor<'e>,
{
    let card_id = card_id_to_i64(card.id())?;
    let deck_id = deck_id_to_i64(card.deck_id())?;

    sqlx::query(
        r"
        INSERT INTO cards (
            id, deck_id, front, back, difficulty, review_count,
            next_review_at, created_at, updated_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(id, deck_id) DO UPDATE SET
            front = excluded.front,
            back = excluded.back,
            difficulty = excluded.difficulty,
            review_count = excluded.review_count,
            next_review_at = excluded.next_review_at,
            updated_at = excluded.updated_at
        ",
    )
    .bind(card_id)
    .bind(deck_id)
    .bind(card.front().to_owned())
    .bind(card.back().to_owned())
    .bind(card.difficulty().level())
    .bind(i64::from(card.review_count()))
    .bind(card.next_review_at())
    .bind(card.created_at())
    .bind(card.updated_at())
    .execute(executor)
    .await
    .map_err(|e| StorageError::Connection(e.to_string()))?;

    Ok(())
}

#[async_trait::async_trait]
impl CardRepository for SqliteRepository {
    async fn upsert_card(&self, card: &Card) -> Result<(), StorageError> {
        write_card(&self.pool, card).await
    }

    async fn get_card(&self, deck_id: DeckId, id: CardId) -> Result<Card, StorageError> {
        let sql = format!("{CARD_COLUMNS} WHERE deck_id = ?1 AND id = ?2");
        let row = sqlx::query(&sql)
            .bind(deck_id_to_i64(deck_id)?)
            .bind(card_id_to_i64(id)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .ok_or(StorageError::NotFound)?;

        map_card_row(&row)
    }

    async fn cards_for_deck(&self, deck_id: DeckId) -> Result<Vec<Card>, StorageError> {
        let sql = format!("{CARD_COLUMNS} WHERE deck_id = ?1 ORDER BY id ASC");
        let rows = sqlx::query(&sql)
            .bind(deck_id_to_i64(deck_id)?)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_card_row).collect()
    }

    async fn record_review(
        &self,
        card: &Card,
        expected_review_count: u32,
    ) -> Result<(), StorageError> {
        let deck_id = deck_id_to_i64(card.deck_id())?;
        let card_id = card_id_to_i64(card.id())?;

        let res = sqlx::query(
            r"
            UPDATE cards
            SET difficulty = ?1,
                review_count = ?2,
                next_review_at = ?3,
                updated_at = ?4
            WHERE deck_id = ?5 AND id = ?6 AND review_count = ?7
            ",
        )
        .bind(card.difficulty().level())
        .bind(i64::from(card.review_count()))
        .bind(card.next_review_at())
        .bind(card.updated_at())
        .bind(deck_id)
        .bind(card_id)
        .bind(i64::from(expected_review_count))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        if res.rows_affected() == 1 {
            return Ok(());
        }

        let exists = sqlx::query("SELECT 1 FROM cards WHERE deck_id = ?1 AND id = ?2")
            .bind(deck_id)
            .bind(card_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        if exists.is_some() {
            log::warn!(
                "Card {} in deck {} was rated concurrently; refusing stale write",
                card.id(),
                card.deck_id()
            );
            Err(StorageError::Conflict)
        } else {
            Err(StorageError::NotFound)
        }
    }
}
