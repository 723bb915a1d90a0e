use std::path::{Path, PathBuf};

use crate::core::StickySyncError;

/// Maps deck names to the files that back them. The synchronizer only ever
/// sees this trait, so tests and other storage layouts can swap in their own
/// naming scheme.
pub trait DeckLocator {
    fn deck_path(&self, name: &str) -> PathBuf;
}

/// The StickyStudy convention: decks live flat in one directory as
/// `<name>.txt`, with spaces in the name replaced by hyphens.
#[derive(Debug, Clone)]
pub struct DirLocator {
    root: PathBuf,
}

impl DirLocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirLocator { root: root.into() }
    }

    /// The StickyStudy deck directory inside the user's iCloud documents
    /// (the app's macOS storage location).
    pub fn sticky_study_default() -> Result<Self, StickySyncError> {
        let home = dirs::home_dir()
            .ok_or_else(|| StickySyncError::Custom("could not determine home directory".into()))?;
        let root =
            home.join("iCloud/iCloud~com~justinnightingale~stickystudykanji/Documents");
        if !root.is_dir() {
            return Err(StickySyncError::Custom(format!(
                "StickyStudy deck directory not found: {}",
                root.display()
            )));
        }
        Ok(DirLocator { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DeckLocator for DirLocator {
    fn deck_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.txt", name.replace(' ', "-")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spaces_become_hyphens() {
        let locator = DirLocator::new("/decks");
        assert_eq!(locator.deck_path("Study Kanji N5"), PathBuf::from("/decks/Study-Kanji-N5.txt"));
    }
}
