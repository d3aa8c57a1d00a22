// File: src/store.rs
//! The data-store boundary consumed by the spelling pipeline and the
//! etymology graph, plus an in-memory implementation.

use crate::core::types::{
    is_virtual_symbol, AncestryEdge, EntryId, LexiconEntry, SoundMapping, Symbol, SymbolId,
};
use crate::error::{LexiconError, Result};
use crate::etymology::graph::AncestryGraph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Read access to the sound mappings flagged usable for auto-spelling.
pub trait SoundMappingSource {
    /// `(symbol, sound)` pairs, ascending by symbol id.
    fn usable_sound_mappings(&self) -> Vec<(SymbolId, String)>;
}

/// Which edges a deletion targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeFilter {
    /// Every edge where the entry is the child.
    Child(EntryId),
    /// Every edge where the entry is the ancestor.
    Ancestor(EntryId),
    Pair { child: EntryId, ancestor: EntryId },
}

impl EdgeFilter {
    pub fn matches(&self, edge: &AncestryEdge) -> bool {
        match *self {
            EdgeFilter::Child(id) => edge.child_id == id,
            EdgeFilter::Ancestor(id) => edge.ancestor_id == id,
            EdgeFilter::Pair { child, ancestor } => {
                edge.child_id == child && edge.ancestor_id == ancestor
            }
        }
    }
}

/// Storage primitives for ancestry edges. Mutations are only issued by
/// [`AncestryGraph`] after it has checked acyclicity.
pub trait AncestryStore {
    fn entry(&self, id: EntryId) -> Option<LexiconEntry>;

    fn contains_entry(&self, id: EntryId) -> bool {
        self.entry(id).is_some()
    }

    /// Edges where `child` is the child, ordered by position.
    fn ancestry_edges(&self, child: EntryId) -> Vec<AncestryEdge>;

    /// Edges where `ancestor` is the ancestor, ordered by child then position.
    fn descendant_edges(&self, ancestor: EntryId) -> Vec<AncestryEdge>;

    fn all_ancestry_edges(&self) -> Vec<AncestryEdge>;

    /// Inserts all edges or none. Fails with `EntryNotFound` for an unknown
    /// endpoint.
    fn insert_edges(&mut self, edges: Vec<AncestryEdge>) -> Result<()>;

    /// Returns the number of edges removed.
    fn delete_edges(&mut self, filter: EdgeFilter) -> usize;
}

/// The whole lexicon held in memory; serialized as one snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryLexicon {
    symbols: BTreeMap<SymbolId, Symbol>,
    /// Registration order is kept; it breaks ties within one symbol.
    mappings: Vec<SoundMapping>,
    entries: BTreeMap<EntryId, LexiconEntry>,
    edges: Vec<AncestryEdge>,
    next_symbol_id: SymbolId,
    next_entry_id: EntryId,
}

impl InMemoryLexicon {
    pub fn new() -> Self {
        Self { next_symbol_id: 1, next_entry_id: 1, ..Self::default() }
    }

    // --- symbols ---

    /// Adds a symbol with the next free id.
    pub fn add_symbol(&mut self, units: Vec<String>) -> Result<SymbolId> {
        let id = self.next_symbol_id;
        let next = id.checked_add(1).ok_or(LexiconError::SymbolIdsExhausted)?;
        self.symbols.insert(id, Symbol { id, units });
        self.next_symbol_id = next;
        Ok(id)
    }

    /// Adds or replaces a symbol under a caller-chosen id.
    pub fn insert_symbol(&mut self, id: SymbolId, units: Vec<String>) -> Result<()> {
        if is_virtual_symbol(id) {
            return Err(LexiconError::InvalidSymbolId(id));
        }
        self.symbols.insert(id, Symbol { id, units });
        self.next_symbol_id = self.next_symbol_id.max(id.saturating_add(1));
        Ok(())
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(&id)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    /// Removes a symbol and its sound mappings. Committed spellings keep the
    /// id; re-applying the spelling refreshes them.
    pub fn remove_symbol(&mut self, id: SymbolId) -> Result<Symbol> {
        let symbol = self.symbols.remove(&id).ok_or(LexiconError::SymbolNotFound(id))?;
        self.mappings.retain(|m| m.symbol_id != id);
        Ok(symbol)
    }

    // --- sound mappings ---

    pub fn add_sound_mapping(
        &mut self,
        symbol_id: SymbolId,
        sound: &str,
        usable: bool,
    ) -> Result<()> {
        if !self.symbols.contains_key(&symbol_id) {
            return Err(LexiconError::SymbolNotFound(symbol_id));
        }
        if sound.is_empty() {
            return Err(LexiconError::EmptySound);
        }
        self.mappings.push(SoundMapping {
            symbol_id,
            sound: sound.to_string(),
            usable_for_auto_spelling: usable,
        });
        Ok(())
    }

    /// Flips the auto-spelling flag on every mapping of `symbol_id` to `sound`.
    /// Returns how many mappings changed.
    pub fn set_mapping_usable(&mut self, symbol_id: SymbolId, sound: &str, usable: bool) -> usize {
        let mut changed = 0;
        for mapping in self.mappings.iter_mut() {
            if mapping.symbol_id == symbol_id
                && mapping.sound == sound
                && mapping.usable_for_auto_spelling != usable
            {
                mapping.usable_for_auto_spelling = usable;
                changed += 1;
            }
        }
        changed
    }

    pub fn sound_mappings(&self) -> &[SoundMapping] {
        &self.mappings
    }

    // --- entries ---

    pub fn add_entry(&mut self, headword: &str, pronunciation: Option<&str>) -> EntryId {
        let id = self.next_entry_id;
        self.entries.insert(
            id,
            LexiconEntry {
                id,
                headword: headword.to_string(),
                pronunciation: pronunciation.map(str::to_string),
                spelling: Vec::new(),
            },
        );
        self.next_entry_id += 1;
        id
    }

    pub fn entry_ref(&self, id: EntryId) -> Option<&LexiconEntry> {
        self.entries.get(&id)
    }

    pub fn entries(&self) -> impl Iterator<Item = &LexiconEntry> {
        self.entries.values()
    }

    pub fn set_pronunciation(&mut self, id: EntryId, pronunciation: Option<&str>) -> Result<()> {
        let entry = self.entries.get_mut(&id).ok_or(LexiconError::EntryNotFound(id))?;
        entry.pronunciation = pronunciation.map(str::to_string);
        Ok(())
    }

    pub fn set_spelling(&mut self, id: EntryId, spelling: Vec<SymbolId>) -> Result<()> {
        let entry = self.entries.get_mut(&id).ok_or(LexiconError::EntryNotFound(id))?;
        entry.spelling = spelling;
        Ok(())
    }

    /// Deletes an entry and, through the graph's cleanup hook, every edge
    /// that mentions it.
    pub fn delete_entry(&mut self, id: EntryId) -> Result<LexiconEntry> {
        let entry = self.entries.remove(&id).ok_or(LexiconError::EntryNotFound(id))?;
        AncestryGraph::on_entry_deleted(self, id);
        Ok(entry)
    }
}

impl SoundMappingSource for InMemoryLexicon {
    fn usable_sound_mappings(&self) -> Vec<(SymbolId, String)> {
        let mut pairs: Vec<(SymbolId, String)> = self
            .mappings
            .iter()
            .filter(|m| m.usable_for_auto_spelling)
            .map(|m| (m.symbol_id, m.sound.clone()))
            .collect();
        pairs.sort_by_key(|(id, _)| *id);
        pairs
    }
}

impl AncestryStore for InMemoryLexicon {
    fn entry(&self, id: EntryId) -> Option<LexiconEntry> {
        self.entries.get(&id).cloned()
    }

    fn contains_entry(&self, id: EntryId) -> bool {
        self.entries.contains_key(&id)
    }

    fn ancestry_edges(&self, child: EntryId) -> Vec<AncestryEdge> {
        let mut edges: Vec<AncestryEdge> =
            self.edges.iter().filter(|e| e.child_id == child).cloned().collect();
        edges.sort_by_key(|e| (e.position, e.ancestor_id));
        edges
    }

    fn descendant_edges(&self, ancestor: EntryId) -> Vec<AncestryEdge> {
        let mut edges: Vec<AncestryEdge> =
            self.edges.iter().filter(|e| e.ancestor_id == ancestor).cloned().collect();
        edges.sort_by_key(|e| (e.child_id, e.position));
        edges
    }

    fn all_ancestry_edges(&self) -> Vec<AncestryEdge> {
        self.edges.clone()
    }

    fn insert_edges(&mut self, edges: Vec<AncestryEdge>) -> Result<()> {
        for edge in &edges {
            for id in [edge.child_id, edge.ancestor_id] {
                if !self.entries.contains_key(&id) {
                    return Err(LexiconError::EntryNotFound(id));
                }
            }
        }
        self.edges.extend(edges);
        Ok(())
    }

    fn delete_edges(&mut self, filter: EdgeFilter) -> usize {
        let before = self.edges.len();
        self.edges.retain(|e| !filter.matches(e));
        before - self.edges.len()
    }
}
