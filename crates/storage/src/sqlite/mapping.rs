use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use studydeck_core::model::{Card, CardId, Deck, DeckId, Difficulty, SourceKind};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn deck_id_from_i64(v: i64) -> Result<DeckId, StorageError> {
    Ok(DeckId::new(i64_to_u64("deck_id", v)?))
}

pub(crate) fn card_id_from_i64(v: i64) -> Result<CardId, StorageError> {
    Ok(CardId::new(i64_to_u64("card_id", v)?))
}

pub(crate) fn deck_id_to_i64(id: DeckId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("deck_id overflow".into()))
}

pub(crate) fn card_id_to_i64(id: CardId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("card_id overflow".into()))
}

pub(crate) fn map_deck_row(row: &SqliteRow) -> Result<Deck, StorageError> {
    let source_str: String = row.try_get("source").map_err(ser)?;
    let source = SourceKind::parse(&source_str).map_err(ser)?;

    Deck::from_persisted(
        deck_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        row.try_get("title").map_err(ser)?,
        row.try_get("description").map_err(ser)?,
        source,
        row.try_get("created_at").map_err(ser)?,
        row.try_get("updated_at").map_err(ser)?,
    )
    .map_err(ser)
}

/// Difficulty is read as-is, so out-of-range levels written by other tools
/// survive and keep their numeric ordering.
pub(crate) fn map_card_row(row: &SqliteRow) -> Result<Card, StorageError> {
    let review_count_i64: i64 = row.try_get("review_count").map_err(ser)?;
    let review_count: u32 = u32::try_from(review_count_i64).map_err(|_| {
        StorageError::Serialization(format!("invalid review_count: {review_count_i64}"))
    })?;

    Ok(Card::from_persisted(
        card_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        deck_id_from_i64(row.try_get::<i64, _>("deck_id").map_err(ser)?)?,
        row.try_get("front").map_err(ser)?,
        row.try_get("back").map_err(ser)?,
        Difficulty::from_level(row.try_get::<i64, _>("difficulty").map_err(ser)?),
        review_count,
        row.try_get("next_review_at").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
        row.try_get("updated_at").map_err(ser)?,
    ))
}
