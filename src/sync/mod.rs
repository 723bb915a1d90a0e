//! Bidirectional synchronization of a hierarchy of subset decks.
//!
//! A subset mapping declares which decks are assembled from which child
//! decks. One run makes two passes over the hierarchy: pass 1 folds every
//! deck's children upward into it, pass 2 pushes study progress back down so
//! that working through a merged deck marks the same cards in the pools it
//! was assembled from.

use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    fs,
    path::Path,
};

use log::info;

use crate::{
    core::StickySyncError,
    deck::{ops, Deck},
    locator::DeckLocator,
};

/// Parent deck name → child deck names, as declared in the mapping file.
/// Child lists are kept in lexicographic order so that multi-child merges
/// fold deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubsetMapping {
    children: BTreeMap<String, Vec<String>>,
}

impl SubsetMapping {
    /// Reads a JSON object of the form `{"parent": ["child", ...], ...}`.
    /// Parents with an empty child list are treated as undeclared.
    pub fn load(path: &Path) -> Result<Self, StickySyncError> {
        let text = fs::read_to_string(path)?;
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(&text)?;
        Ok(Self::from_map(raw))
    }

    pub fn from_map(map: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        let mut children = BTreeMap::new();
        for (parent, mut kids) in map {
            kids.sort();
            kids.dedup();
            if !kids.is_empty() {
                children.insert(parent, kids);
            }
        }
        SubsetMapping { children }
    }

    pub fn children_of(&self, parent: &str) -> &[String] {
        self.children.get(parent).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every deck named in the mapping, parents and children alike.
    pub fn nodes(&self) -> BTreeSet<String> {
        let mut nodes = BTreeSet::new();
        for (parent, kids) in &self.children {
            nodes.insert(parent.clone());
            nodes.extend(kids.iter().cloned());
        }
        nodes
    }

    /// A children-first topological order over [`nodes`](Self::nodes), with
    /// lexicographic tie-breaking so reruns process decks identically.
    /// Fails if the declared subset relation contains a cycle.
    pub fn topo_order(&self) -> Result<Vec<String>, StickySyncError> {
        let nodes = self.nodes();

        // Edges run child -> parent: a parent is ready once every one of its
        // declared children has been emitted.
        let mut blocked_on: BTreeMap<&str, usize> =
            nodes.iter().map(|n| (n.as_str(), self.children_of(n).len())).collect();
        let mut parents_of: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (parent, kids) in &self.children {
            for kid in kids {
                parents_of.entry(kid.as_str()).or_default().push(parent.as_str());
            }
        }

        let mut ready: BTreeSet<&str> = blocked_on
            .iter()
            .filter(|(_, &count)| count == 0)
            .map(|(node, _)| *node)
            .collect();
        let mut order: Vec<String> = Vec::with_capacity(nodes.len());

        while let Some(node) = ready.pop_first() {
            order.push(node.to_string());
            for &parent in parents_of.get(node).into_iter().flatten() {
                if let Some(count) = blocked_on.get_mut(parent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert(parent);
                    }
                }
            }
        }

        if order.len() != nodes.len() {
            let emitted: HashSet<&str> = order.iter().map(String::as_str).collect();
            let stuck = nodes
                .iter()
                .find(|n| !emitted.contains(n.as_str()))
                .cloned()
                .unwrap_or_default();
            return Err(StickySyncError::CyclicMapping(stuck));
        }
        Ok(order)
    }
}

/// How many decks each pass persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub parents_written: usize,
    pub children_written: usize,
}

/// Drives one synchronization run over a subset hierarchy. Decks are read
/// fresh from storage, merged in memory, and written straight back; there is
/// no state carried across runs.
pub struct Synchronizer<'a, L: DeckLocator> {
    mapping: SubsetMapping,
    locator: &'a L,
}

impl<'a, L: DeckLocator> Synchronizer<'a, L> {
    pub fn new(mapping: SubsetMapping, locator: &'a L) -> Self {
        Synchronizer { mapping, locator }
    }

    /// Runs both passes. The acyclicity check happens before any file is
    /// touched; after that, each deck is persisted as soon as it is merged,
    /// so a failure part-way leaves earlier decks at their new state and
    /// later ones untouched. Reruns are safe: every step is idempotent.
    pub fn run(&self) -> Result<SyncReport, StickySyncError> {
        let order = self.mapping.topo_order()?;
        let mut report = SyncReport::default();

        // Pass 1: children -> parents.
        for name in &order {
            let children = self.mapping.children_of(name);
            if children.is_empty() {
                continue;
            }
            self.merge_children_into(name, children)?;
            report.parents_written += 1;
        }

        // Pass 2: parents -> children, over the reversed order so that a
        // parent's own parents have already pushed progress into it.
        for name in order.iter().rev() {
            let children = self.mapping.children_of(name);
            if children.is_empty() {
                continue;
            }
            let parent = self.load_deck(name)?;
            for child in children {
                self.push_progress_down(name, &parent, child)?;
                report.children_written += 1;
            }
        }

        Ok(report)
    }

    fn load_deck(&self, name: &str) -> Result<Deck, StickySyncError> {
        let path = self.locator.deck_path(name);
        if !path.is_file() {
            return Err(StickySyncError::MissingDeck {
                name: name.to_string(),
                path: path.display().to_string(),
            });
        }
        Deck::load(&path)
    }

    /// Pass-1 step: replace `name`'s deck with the union of its children,
    /// keeping `name`'s own progress for cards that survive and dropping
    /// cards no child carries anymore. Headers stay deck-local.
    fn merge_children_into(
        &self,
        name: &str,
        children: &[String],
    ) -> Result<(), StickySyncError> {
        let mut merged = self.load_deck(&children[0])?;
        for child in &children[1..] {
            merged = ops::union(&merged, &self.load_deck(child)?);
        }

        let path = self.locator.deck_path(name);
        let result = if path.is_file() {
            let existing = Deck::load(&path)?;
            let retained = ops::retain_keys(&existing, &merged.key_set());
            let header = existing.header.clone();
            ops::union(&merged, &retained).with_header(header)
        } else {
            merged.with_header(None)
        };

        info!("{}: merged {} children into {} cards", name, children.len(), result.len());
        result.save(&path)
    }

    /// Pass-2 step: push `parent`'s progress into `child` for the cards the
    /// child already has. The child never gains cards from this direction.
    fn push_progress_down(
        &self,
        parent_name: &str,
        parent: &Deck,
        child_name: &str,
    ) -> Result<(), StickySyncError> {
        let child = self.load_deck(child_name)?;
        let from_parent = ops::retain_keys(parent, &child.key_set());
        let header = child.header.clone();
        let result = ops::union(&from_parent, &child).with_header(header);

        info!("{}: updated {} cards from {}", child_name, result.len(), parent_name);
        result.save(&self.locator.deck_path(child_name))
    }
}
