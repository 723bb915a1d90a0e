pub mod card;
pub mod ops;
pub mod study_data;

pub use card::{Card, CardKey};

use std::{
    collections::{hash_map::Entry, HashMap, HashSet},
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use log::warn;

use crate::core::StickySyncError;

/// Number of tab-separated fields in a deck row.
pub const DECK_COLS: usize = 5;

/// Prefix of the second header line that marks "header present".
const HEADER_SENTINEL: &str = "-----";

/// The two-line metadata block StickyStudy writes at the top of a deck file.
/// The first line carries the deck's last-synced timestamp in its fifth
/// tab-separated field; the second is a dashed separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckHeader {
    lines: [String; 2],
}

impl DeckHeader {
    pub fn new(line1: impl Into<String>, line2: impl Into<String>) -> Self {
        DeckHeader { lines: [line1.into(), line2.into()] }
    }

    pub fn lines(&self) -> &[String; 2] {
        &self.lines
    }

    /// Deck-level "last synced at" timestamp, parsed from the first line.
    pub fn timestamp(&self) -> Option<i64> {
        let field = self.lines[0].split('\t').nth(4)?;
        field.split('_').next()?.parse().ok()
    }
}

/// An in-memory StickyStudy deck: an optional header plus an ordered card
/// table in which every identity key appears at most once.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Deck {
    pub header: Option<DeckHeader>,
    cards: Vec<Card>,
}

impl Deck {
    /// Builds a deck from cards already known to have unique keys.
    pub fn new(header: Option<DeckHeader>, cards: Vec<Card>) -> Self {
        Deck { header, cards }
    }

    /// Reads a deck file. The second line is treated as part of the header
    /// only when it starts with the dash sentinel; otherwise the file is a
    /// bare card table and parsing starts at line one.
    pub fn load(path: &Path) -> Result<Self, StickySyncError> {
        let file = File::open(path)?;
        let mut lines = Vec::new();
        for line in BufReader::new(file).lines() {
            lines.push(line?);
        }

        let has_header = lines.len() >= 2 && lines[1].starts_with(HEADER_SENTINEL);
        let (header, body, line_offset) = if has_header {
            let header = DeckHeader::new(lines[0].clone(), lines[1].clone());
            if header.timestamp().is_none() {
                return Err(StickySyncError::BadHeaderTimestamp(path.display().to_string()));
            }
            (Some(header), &lines[2..], 2)
        } else {
            (None, &lines[..], 0)
        };

        let mut cards: Vec<Card> = Vec::with_capacity(body.len());
        let mut index: HashMap<CardKey, usize> = HashMap::new();
        for (i, line) in body.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != DECK_COLS {
                return Err(StickySyncError::WrongColumnCount {
                    path: path.display().to_string(),
                    line: line_offset + i + 1,
                    found: fields.len(),
                });
            }
            let card = Card::new(fields[0], fields[1], fields[2], fields[3], fields[4]);
            match index.entry(card.key()) {
                Entry::Occupied(entry) => {
                    warn!(
                        "{}: duplicate card {:?}, keeping the later row",
                        path.display(),
                        card.question
                    );
                    cards[*entry.get()] = card;
                }
                Entry::Vacant(entry) => {
                    entry.insert(cards.len());
                    cards.push(card);
                }
            }
        }

        Ok(Deck { header, cards })
    }

    /// Writes the header verbatim (when present) followed by the card table,
    /// one tab-separated row per card.
    pub fn save(&self, path: &Path) -> Result<(), StickySyncError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        if let Some(header) = &self.header {
            for line in header.lines() {
                writeln!(writer, "{}", line)?;
            }
        }
        for card in &self.cards {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}",
                card.question, card.on_reading, card.kun_reading, card.answer, card.study_data
            )?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Deck-level timestamp from the header, if the deck has one.
    pub fn timestamp(&self) -> Option<i64> {
        self.header.as_ref().and_then(DeckHeader::timestamp)
    }

    pub fn key_set(&self) -> HashSet<CardKey> {
        self.cards.iter().map(Card::key).collect()
    }

    /// Same cards, different header.
    pub fn with_header(mut self, header: Option<DeckHeader>) -> Self {
        self.header = header;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn header_lines() -> (String, String) {
        ("Study Kanji\tON\tKUN\tanswer\t1671149661_v3".to_string(), "-".repeat(40))
    }

    fn write_deck_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn load_detects_header_by_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let (line1, line2) = header_lines();
        let contents = format!("{}\n{}\n木\tもく\tき\ttree\t[100_abc]\n", line1, line2);
        let path = write_deck_file(dir.path(), "headered.txt", &contents);

        let deck = Deck::load(&path).unwrap();
        assert_eq!(deck.len(), 1);
        assert_eq!(deck.timestamp(), Some(1671149661));
        assert_eq!(deck.cards()[0].question, "木");
    }

    #[test]
    fn load_without_sentinel_treats_all_lines_as_data() {
        let dir = tempfile::tempdir().unwrap();
        let contents = "木\tもく\tき\ttree\t\n水\tすい\tみず\twater\t[5_x]\n";
        let path = write_deck_file(dir.path(), "bare.txt", contents);

        let deck = Deck::load(&path).unwrap();
        assert!(deck.header.is_none());
        assert_eq!(deck.len(), 2);
    }

    #[test]
    fn load_rejects_wrong_column_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_deck_file(dir.path(), "ragged.txt", "木\tもく\tき\ttree\n");

        let err = Deck::load(&path).unwrap_err();
        match err {
            StickySyncError::WrongColumnCount { line, found, .. } => {
                assert_eq!(line, 1);
                assert_eq!(found, 4);
            }
            other => panic!("expected WrongColumnCount, got {:?}", other),
        }
    }

    #[test]
    fn load_rejects_unparsable_header_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let contents = format!("Study Kanji\tON\tKUN\tanswer\tnot-a-number\n{}\n", "-".repeat(40));
        let path = write_deck_file(dir.path(), "badheader.txt", &contents);

        let err = Deck::load(&path).unwrap_err();
        assert!(matches!(err, StickySyncError::BadHeaderTimestamp(_)));
    }

    #[test]
    fn load_keeps_later_row_for_duplicate_keys() {
        let dir = tempfile::tempdir().unwrap();
        let contents = "木\tもく\tき\ttree\t[1_a]\n木\tもく\tき\ttree\t[2_b]\n";
        let path = write_deck_file(dir.path(), "dup.txt", contents);

        let deck = Deck::load(&path).unwrap();
        assert_eq!(deck.len(), 1);
        assert_eq!(deck.cards()[0].study_data, "[2_b]");
    }

    #[test]
    fn save_load_round_trips_byte_for_byte() {
        let dir = tempfile::tempdir().unwrap();
        let (line1, line2) = header_lines();
        let contents =
            format!("{}\n{}\n木\tもく\tき\ttree\t[100_abc]\n水\tすい\tみず\twater\t\n", line1, line2);
        let path = write_deck_file(dir.path(), "roundtrip.txt", &contents);

        let deck = Deck::load(&path).unwrap();
        let out = dir.path().join("copy.txt");
        deck.save(&out).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), contents);
    }

    #[test]
    fn save_without_header_writes_only_rows() {
        let dir = tempfile::tempdir().unwrap();
        let deck = Deck::new(None, vec![Card::new("木", "もく", "き", "tree", "")]);
        let out = dir.path().join("noheader.txt");
        deck.save(&out).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "木\tもく\tき\ttree\t\n");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Deck::load(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, StickySyncError::Io(_)));
    }
}
