use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::DeckId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DeckError {
    #[error("deck title cannot be empty")]
    EmptyTitle,

    #[error("unknown deck source: {0}")]
    UnknownSource(String),
}

//
// ─── SOURCE ────────────────────────────────────────────────────────────────────
//

/// Kind of material a deck was generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Text,
    Pdf,
}

impl SourceKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Text => "text",
            SourceKind::Pdf => "pdf",
        }
    }

    /// Parses the stored representation.
    ///
    /// # Errors
    ///
    /// Returns `DeckError::UnknownSource` for anything but `text` or `pdf`.
    pub fn parse(raw: &str) -> Result<Self, DeckError> {
        match raw {
            "text" => Ok(SourceKind::Text),
            "pdf" => Ok(SourceKind::Pdf),
            other => Err(DeckError::UnknownSource(other.to_owned())),
        }
    }
}

//
// ─── DECK ──────────────────────────────────────────────────────────────────────
//

/// A named set of study cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    id: DeckId,
    title: String,
    description: Option<String>,
    source: SourceKind,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Deck {
    /// Creates a deck with a trimmed, non-empty title.
    ///
    /// Blank descriptions are stored as `None`.
    ///
    /// # Errors
    ///
    /// Returns `DeckError::EmptyTitle` if the title is blank.
    pub fn new(
        id: DeckId,
        title: impl Into<String>,
        description: Option<String>,
        source: SourceKind,
        now: DateTime<Utc>,
    ) -> Result<Self, DeckError> {
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(DeckError::EmptyTitle);
        }

        let description = description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty());

        Ok(Self {
            id,
            title,
            description,
            source,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuilds a deck from storage.
    ///
    /// # Errors
    ///
    /// Returns `DeckError::EmptyTitle` if the stored title is blank.
    pub fn from_persisted(
        id: DeckId,
        title: String,
        description: Option<String>,
        source: SourceKind,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DeckError> {
        let mut deck = Self::new(id, title, description, source, created_at)?;
        deck.updated_at = updated_at;
        Ok(deck)
    }

    #[must_use]
    pub fn id(&self) -> DeckId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn source(&self) -> SourceKind {
        self.source
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
