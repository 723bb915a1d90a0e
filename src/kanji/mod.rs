use std::{collections::HashSet, fs::File, path::Path};

use log::info;
use serde::Deserialize;

use crate::core::StickySyncError;

/// One row of the kanji reference table. Only the kanji character itself is
/// consumed by the deck filter; the rest of the row tags along for callers
/// that want to narrow the table first.
#[derive(Debug, Clone, Deserialize)]
pub struct KanjiEntry {
    pub kanji: String,
    #[serde(rename = "on'yomi", default)]
    pub on_reading: String,
    #[serde(rename = "kun'yomi", default)]
    pub kun_reading: String,
    #[serde(default)]
    pub meaning: String,
    #[serde(default)]
    pub jlpt: Option<u8>,
}

/// A kanji reference table loaded from a TSV file with a header row.
#[derive(Debug, Clone, Default)]
pub struct KanjiTable {
    entries: Vec<KanjiEntry>,
}

impl KanjiTable {
    pub fn new(entries: Vec<KanjiEntry>) -> Self {
        KanjiTable { entries }
    }

    pub fn load(path: &Path) -> Result<Self, StickySyncError> {
        let file = File::open(path)?;
        let mut reader = csv::ReaderBuilder::new().delimiter(b'\t').from_reader(file);

        if !reader.headers()?.iter().any(|h| h == "kanji") {
            return Err(StickySyncError::MissingKanjiColumn(path.display().to_string()));
        }

        let mut entries = Vec::new();
        for record in reader.deserialize() {
            entries.push(record?);
        }
        info!("loaded {} kanji from {}", entries.len(), path.display());
        Ok(KanjiTable { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[KanjiEntry] {
        &self.entries
    }

    /// The set of kanji characters in the table, for deck filtering.
    pub fn kanji_set(&self) -> HashSet<char> {
        self.entries.iter().filter_map(|e| e.kanji.chars().next()).collect()
    }

    /// A table narrowed to the given JLPT levels. Entries without a level are
    /// dropped.
    pub fn restrict_to_levels(&self, levels: &HashSet<u8>) -> KanjiTable {
        let entries = self
            .entries
            .iter()
            .filter(|e| e.jlpt.is_some_and(|level| levels.contains(&level)))
            .cloned()
            .collect();
        KanjiTable { entries }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const TABLE: &str = "kanji\ton'yomi\tkun'yomi\tmeaning\tjlpt\n\
                         木\tモク\tき\ttree\t5\n\
                         水\tスイ\tみず\twater\t5\n\
                         議\tギ\t\tdeliberation\t1\n\
                         圦\t\tいり\tsluice\t\n";

    fn write_table(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kanji.tsv");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn load_parses_all_rows() {
        let (_dir, path) = write_table(TABLE);
        let table = KanjiTable::load(&path).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.entries()[0].kanji, "木");
        assert_eq!(table.entries()[0].jlpt, Some(5));
        assert_eq!(table.entries()[3].jlpt, None);
    }

    #[test]
    fn kanji_set_contains_each_character() {
        let (_dir, path) = write_table(TABLE);
        let set = KanjiTable::load(&path).unwrap().kanji_set();
        assert_eq!(set.len(), 4);
        assert!(set.contains(&'木'));
        assert!(set.contains(&'圦'));
    }

    #[test]
    fn restrict_to_levels_drops_unleveled_entries() {
        let (_dir, path) = write_table(TABLE);
        let table = KanjiTable::load(&path).unwrap();
        let levels: HashSet<u8> = [5].into_iter().collect();
        let n5 = table.restrict_to_levels(&levels);
        assert_eq!(n5.len(), 2);
        assert!(n5.kanji_set().contains(&'水'));
    }

    #[test]
    fn load_requires_kanji_column() {
        let (_dir, path) = write_table("character\tmeaning\n木\ttree\n");
        let err = KanjiTable::load(&path).unwrap_err();
        assert!(matches!(err, StickySyncError::MissingKanjiColumn(_)));
    }
}
