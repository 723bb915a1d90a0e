//! Pure deck operators. None of these touch the filesystem; callers persist
//! results explicitly.

use std::collections::{hash_map::Entry, HashMap, HashSet};

use wana_kana::IsJapaneseChar;

use super::{Card, CardKey, Deck, DeckHeader};

/// Reconciles two decks into the deck a device would hold after seeing both
/// sides' edits.
///
/// Duplicate identity keys keep the card with the greater timestamp; on a tie
/// (including both sides unstudied) the later occurrence wins, with `a`'s
/// cards considered to precede `b`'s. Output order is first-occurrence order.
pub fn union(a: &Deck, b: &Deck) -> Deck {
    let mut cards: Vec<Card> = Vec::with_capacity(a.len() + b.len());
    let mut index: HashMap<CardKey, usize> = HashMap::new();

    for card in a.cards().iter().chain(b.cards()) {
        match index.entry(card.key()) {
            Entry::Occupied(entry) => {
                let slot = *entry.get();
                if card.timestamp() >= cards[slot].timestamp() {
                    cards[slot] = card.clone();
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(cards.len());
                cards.push(card.clone());
            }
        }
    }

    Deck::new(pick_header(a, b), cards)
}

/// Keeps the header of the side with the newer deck timestamp, preferring `a`
/// on a tie and falling back to whichever side has a timestamp at all.
fn pick_header(a: &Deck, b: &Deck) -> Option<DeckHeader> {
    match (a.timestamp(), b.timestamp()) {
        (_, None) => a.header.clone(),
        (None, Some(_)) => b.header.clone(),
        (Some(ta), Some(tb)) => {
            if ta >= tb {
                a.header.clone()
            } else {
                b.header.clone()
            }
        }
    }
}

/// Folds `source`'s cards into `target` as fresh, unstudied entries.
///
/// Every source card has its study data wiped first, so a card already in
/// `target` always keeps `target`'s progress (first occurrence wins, the
/// inverse tie-break from [`union`]). With no target the result is exactly
/// the zeroed source cards, header-less.
pub fn apply_new(source: &Deck, target: Option<&Deck>) -> Deck {
    let zeroed = source.cards().iter().map(Card::without_study_data);

    let Some(target) = target else {
        return Deck::new(None, zeroed.collect());
    };

    let mut cards: Vec<Card> = Vec::with_capacity(target.len() + source.len());
    let mut seen: HashSet<CardKey> = HashSet::new();
    for card in target.cards().iter().cloned().chain(zeroed) {
        if seen.insert(card.key()) {
            cards.push(card);
        }
    }

    Deck::new(target.header.clone(), cards)
}

/// Keeps the cards whose question field draws all of its kanji from
/// `allowed`. With `require_kanji` the question must also contain at least
/// one kanji; non-kanji characters never disqualify a card.
pub fn restrict_to_kanji(deck: &Deck, allowed: &HashSet<char>, require_kanji: bool) -> Deck {
    let cards = deck
        .cards()
        .iter()
        .filter(|card| {
            let mut saw_kanji = false;
            for c in card.question.chars() {
                if c.is_kanji() {
                    if !allowed.contains(&c) {
                        return false;
                    }
                    saw_kanji = true;
                }
            }
            saw_kanji || !require_kanji
        })
        .cloned()
        .collect();

    Deck::new(deck.header.clone(), cards)
}

/// Keeps only the cards whose identity key is in `keys`.
pub fn retain_keys(deck: &Deck, keys: &HashSet<CardKey>) -> Deck {
    let cards = deck.cards().iter().filter(|card| keys.contains(&card.key())).cloned().collect();
    Deck::new(deck.header.clone(), cards)
}
