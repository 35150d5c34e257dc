mod card;
mod deck;
mod ids;
mod review;

pub use ids::{CardId, DeckId, ParseIdError};

pub use card::{Card, GeneratedCard, MASTERED_MIN_REVIEWS};
pub use deck::{Deck, DeckError, SourceKind};
pub use review::{Difficulty, Rating, ReviewError, ReviewOutcome};
