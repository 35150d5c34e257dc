use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a card, unique within its deck.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(u64);

impl CardId {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }

    /// The identifier following this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Identifier of a deck (a flashcard set).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeckId(u64);

impl DeckId {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Debug for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CardId({})", self.0)
    }
}

impl fmt::Debug for DeckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeckId({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for DeckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── Parsing ───────────────────────────────────────────────────────────────────

/// A deck id given on the command line was not a non-negative integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    raw: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid deck id: {:?}", self.raw)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for DeckId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(DeckId::new).map_err(|_| ParseIdError {
            raw: s.to_owned(),
        })
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deck_id_display_and_parse() {
        let id: DeckId = " 123 ".parse().unwrap();
        assert_eq!(id, DeckId::new(123));
        assert_eq!(id.to_string(), "123");
        assert_eq!(CardId::new(9).to_string(), "9");
    }

    #[test]
    fn deck_id_parse_rejects_garbage() {
        let err = "not-a-number".parse::<DeckId>().unwrap_err();
        assert_eq!(err.to_string(), "invalid deck id: \"not-a-number\"");
        assert!("-1".parse::<DeckId>().is_err());
    }

    #[test]
    fn next_saturates() {
        assert_eq!(CardId::new(7).next(), CardId::new(8));
        assert_eq!(DeckId::new(u64::MAX).next(), DeckId::new(u64::MAX));
    }
}
