pub mod core;
pub mod deck;
pub mod kanji;
pub mod locator;
pub mod sync;

pub use crate::{
    core::StickySyncError,
    deck::{Card, Deck},
    kanji::KanjiTable,
    locator::{DeckLocator, DirLocator},
    sync::{SubsetMapping, Synchronizer},
};
