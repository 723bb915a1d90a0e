use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use log::info;
use stickysync::{
    deck::ops,
    Deck, DirLocator, KanjiTable, StickySyncError, SubsetMapping, Synchronizer,
};

#[derive(Parser)]
#[command(name = "stickysync", about = "Merge and synchronize StickyStudy decks", version)]
struct Cli {
    /// Deck directory (default: the StickyStudy iCloud documents folder)
    #[arg(long, global = true)]
    deck_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Synchronize a hierarchy of subset decks in both directions
    Sync {
        /// JSON file mapping each parent deck to its child decks
        #[arg(long)]
        mapping: PathBuf,
    },

    /// Merge two deck files, keeping the newer copy of duplicated cards
    Merge {
        a: PathBuf,
        b: PathBuf,
        /// Output deck file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Add a deck's cards to another deck as fresh, unstudied entries
    Fill {
        source: PathBuf,
        /// Target deck file (created if absent; existing progress is kept)
        target: PathBuf,
    },

    /// Keep only the cards whose kanji appear in a kanji table
    Filter {
        deck: PathBuf,
        /// TSV kanji table with a "kanji" column
        #[arg(long)]
        kanji_table: PathBuf,
        /// Restrict the table to these JLPT levels first
        #[arg(long, num_args = 1..)]
        levels: Vec<u8>,
        /// Also keep cards whose question has no kanji at all
        #[arg(long)]
        allow_pure_kana: bool,
        /// Output deck file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), StickySyncError> {
    match cli.command {
        Command::Sync { mapping } => {
            let locator = match cli.deck_dir {
                Some(dir) => DirLocator::new(dir),
                None => DirLocator::sticky_study_default()?,
            };
            let mapping = SubsetMapping::load(&mapping)?;
            let report = Synchronizer::new(mapping, &locator).run()?;
            info!(
                "sync complete: {} parent decks, {} child decks written",
                report.parents_written, report.children_written
            );
            Ok(())
        }
        Command::Merge { a, b, output } => {
            let merged = ops::union(&Deck::load(&a)?, &Deck::load(&b)?);
            info!("merged {} cards into {}", merged.len(), output.display());
            merged.save(&output)
        }
        Command::Fill { source, target } => {
            let source_deck = Deck::load(&source)?;
            let target_deck = if target.is_file() { Some(Deck::load(&target)?) } else { None };
            let result = ops::apply_new(&source_deck, target_deck.as_ref());
            info!("{}: {} cards after fill", target.display(), result.len());
            result.save(&target)
        }
        Command::Filter { deck, kanji_table, levels, allow_pure_kana, output } => {
            let deck_in = Deck::load(&deck)?;
            let allowed = load_kanji_set(&kanji_table, &levels)?;
            let result = ops::restrict_to_kanji(&deck_in, &allowed, !allow_pure_kana);
            info!(
                "kept {} of {} cards from {}",
                result.len(),
                deck_in.len(),
                deck.display()
            );
            result.save(&output)
        }
    }
}

fn load_kanji_set(path: &Path, levels: &[u8]) -> Result<HashSet<char>, StickySyncError> {
    let table = KanjiTable::load(path)?;
    if levels.is_empty() {
        return Ok(table.kanji_set());
    }
    let levels: HashSet<u8> = levels.iter().copied().collect();
    Ok(table.restrict_to_levels(&levels).kanji_set())
}
