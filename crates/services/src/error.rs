//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use studydeck_core::model::DeckError;

/// Errors emitted by `ReviewService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReviewServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors reported by a `CardGenerator` backend.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GeneratorError {
    #[error("source material is empty")]
    EmptySource,
    #[error("malformed generator output at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("card generator failed: {0}")]
    Backend(String),
}

/// Errors emitted by `DeckService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DeckServiceError {
    #[error("no usable flashcards were generated")]
    NoCards,
    #[error(transparent)]
    Deck(#[from] DeckError),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no cards available for session")]
    Empty,
    #[error("session already completed")]
    Completed,
    #[error(transparent)]
    Review(#[from] ReviewServiceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
