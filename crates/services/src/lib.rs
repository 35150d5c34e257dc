#![forbid(unsafe_code)]

pub mod deck_service;
pub mod error;
pub mod generator;
pub mod review_service;
pub mod sessions;

pub use studydeck_core::Clock;

pub use deck_service::{DeckOverview, DeckService};
pub use error::{DeckServiceError, GeneratorError, ReviewServiceError, SessionError};
pub use generator::{CardGenerator, TabSeparatedGenerator};
pub use review_service::{PersistedReview, ReviewService};
pub use sessions::{SessionAnswerResult, SessionLoopService, SessionProgress, SessionReview, StudySession};
