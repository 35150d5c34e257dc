use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::Card;

/// Counts shown on a deck's overview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeckStats {
    pub total: usize,
    pub due: usize,
    pub new: usize,
    pub mastered: usize,
}

impl DeckStats {
    #[must_use]
    pub fn from_cards<'a>(cards: impl IntoIterator<Item = &'a Card>, now: DateTime<Utc>) -> Self {
        cards.into_iter().fold(Self::default(), |mut stats, card| {
            stats.total += 1;
            if card.is_due(now) {
                stats.due += 1;
            }
            if card.is_new() {
                stats.new += 1;
            }
            if card.is_mastered() {
                stats.mastered += 1;
            }
            stats
        })
    }
}
