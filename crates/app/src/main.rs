mod cli;
mod db;

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::Parser;
use services::{Clock, DeckService, SessionLoopService, StudySession, TabSeparatedGenerator};
use storage::repository::Storage;
use studydeck_core::model::{Card, DeckId, Rating, SourceKind};
use studydeck_core::priority::prioritized;

use crate::cli::{Cli, Command};
use crate::db::{normalize_sqlite_url, prepare_sqlite_file};

type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

async fn run() -> AppResult<()> {
    let cli = Cli::parse();

    // Open + migrate SQLite at startup so core/services stay storage-agnostic.
    let db_url = normalize_sqlite_url(&cli.db_url)?;
    prepare_sqlite_file(&db_url)?;
    let storage = Storage::sqlite(&db_url).await?;
    log::debug!("Opened database {db_url}");

    let clock = Clock::default_clock();
    let decks = DeckService::new(clock, Arc::clone(&storage.decks), Arc::clone(&storage.cards));

    match cli.command {
        Command::Decks => list_decks(&decks).await,
        Command::Create { title, description } => {
            let deck = decks.create_deck(title, description, SourceKind::Text).await?;
            println!("Created deck {} \"{}\".", deck.id(), deck.title());
            Ok(())
        }
        Command::Import {
            file,
            title,
            description,
            source,
        } => {
            let material = std::fs::read_to_string(&file)?;
            let title = title.unwrap_or_else(|| {
                file.file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default()
            });
            let overview = decks
                .create_from_source(
                    &TabSeparatedGenerator,
                    title,
                    description,
                    source.into(),
                    &material,
                )
                .await?;
            println!(
                "Imported {} card(s) into deck {} \"{}\".",
                overview.cards.len(),
                overview.deck.id(),
                overview.deck.title()
            );
            Ok(())
        }
        Command::Show { deck_id } => show_deck(&decks, clock, deck_id).await,
        Command::Study { deck_id } => {
            let session_loop = SessionLoopService::new(clock, storage.decks, storage.cards);
            study(&session_loop, deck_id).await
        }
    }
}

async fn list_decks(decks: &DeckService) -> AppResult<()> {
    let all = decks.list_decks().await?;
    if all.is_empty() {
        println!("No decks yet. Create one with `studydeck create <title>`.");
        return Ok(());
    }

    for deck in all {
        let stats = decks.overview(deck.id()).await?.stats;
        println!(
            "{}  {:<32} total {:>4}  due {:>4}  new {:>4}  mastered {:>4}",
            deck.id(),
            deck.title(),
            stats.total,
            stats.due,
            stats.new,
            stats.mastered
        );
    }
    Ok(())
}

async fn show_deck(decks: &DeckService, clock: Clock, deck_id: DeckId) -> AppResult<()> {
    let overview = decks.overview(deck_id).await?;
    println!("{}", overview.deck.title());
    if let Some(description) = overview.deck.description() {
        println!("{description}");
    }
    println!(
        "{} card(s), {} due, {} new, {} mastered",
        overview.stats.total, overview.stats.due, overview.stats.new, overview.stats.mastered
    );

    let now = clock.now();
    for card in prioritized(overview.cards, now) {
        println!(
            "{}  [{}] reviews {:>3}  next {}  {}",
            card.id(),
            card.difficulty(),
            card.review_count(),
            card.next_review_at().format("%Y-%m-%d %H:%M"),
            card.front()
        );
    }
    Ok(())
}

async fn study(session_loop: &SessionLoopService, deck_id: DeckId) -> AppResult<()> {
    let mut session = session_loop.start_session(deck_id).await?;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while let Some(card) = session.current_card() {
        present(card, &session)?;
        if read_line(&mut lines)?.is_none() {
            break;
        }
        println!("A: {}", card.back());

        let Some(rating) = read_rating(&mut lines)? else {
            break;
        };
        let result = session_loop.answer_current(&mut session, rating).await?;
        println!(
            "Next review in {} day(s).",
            result.review.outcome.interval_days
        );
        println!();
    }

    let progress = session.progress();
    println!(
        "Studied {}/{} card(s) ({}%).",
        progress.studied,
        progress.total,
        progress.percent()
    );
    Ok(())
}

fn present(card: &Card, session: &StudySession) -> io::Result<()> {
    let progress = session.progress();
    println!("[{}/{}] {}", progress.studied + 1, progress.total, card.difficulty());
    println!("Q: {}", card.front());
    print!("[press Enter to reveal]");
    io::stdout().flush()
}

fn read_line(lines: &mut impl Iterator<Item = io::Result<String>>) -> io::Result<Option<String>> {
    lines.next().transpose()
}

/// Prompt until the user enters 1, 2 or 3. `None` on end of input or `q`.
fn read_rating(lines: &mut impl Iterator<Item = io::Result<String>>) -> io::Result<Option<Rating>> {
    loop {
        print!("Rate: 1 = Easy, 2 = Medium, 3 = Hard (q to stop): ");
        io::stdout().flush()?;
        let Some(input) = read_line(lines)? else {
            return Ok(None);
        };
        let input = input.trim();
        if input.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        match input.parse::<i64>().map(Rating::from_level) {
            Ok(Ok(rating)) => return Ok(Some(rating)),
            _ => println!("Invalid input. Please enter 1, 2 or 3."),
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(input: &str) -> impl Iterator<Item = io::Result<String>> + '_ {
        input.lines().map(|line| Ok(line.to_owned()))
    }

    #[test]
    fn rating_prompt_retries_until_valid() {
        let mut input = lines("x\n7\n2\n");
        assert_eq!(read_rating(&mut input).unwrap(), Some(Rating::Medium));
    }

    #[test]
    fn rating_prompt_stops_on_quit_or_eof() {
        assert_eq!(read_rating(&mut lines("q\n")).unwrap(), None);
        assert_eq!(read_rating(&mut lines("")).unwrap(), None);
    }
}
