use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use studydeck_core::model::{DeckId, SourceKind};

pub const DEFAULT_DB_URL: &str = "sqlite://studydeck.sqlite3";

#[derive(Debug, Parser)]
#[command(name = "studydeck", version, about = "Spaced-repetition flashcards", long_about = None)]
pub struct Cli {
    /// SQLite database URL or path.
    #[arg(long = "db", env = "STUDYDECK_DB_URL", default_value = DEFAULT_DB_URL, global = true)]
    pub db_url: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List decks with their statistics.
    Decks,
    /// Create an empty deck.
    Create {
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Create a deck from a tab-separated file of `front<TAB>back` lines.
    Import {
        file: PathBuf,
        /// Deck title, defaults to the file name.
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_enum, default_value_t = SourceArg::Text)]
        source: SourceArg,
    },
    /// Show a deck's cards in study order.
    Show { deck_id: DeckId },
    /// Study a deck interactively.
    Study { deck_id: DeckId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    Text,
    Pdf,
}

impl From<SourceArg> for SourceKind {
    fn from(value: SourceArg) -> Self {
        match value {
            SourceArg::Text => SourceKind::Text,
            SourceArg::Pdf => SourceKind::Pdf,
        }
    }
}
