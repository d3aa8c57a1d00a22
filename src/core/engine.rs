use crate::config::EngineConfig;
use crate::core::fallback::resolve_with_fallback;
use crate::core::phoneme_map::PhonemeMap;
use crate::core::result::{FallbackResult, StrictResult};
use crate::core::segmenter::resolve;
use crate::core::types::{AncestorLink, AncestryEdge, EntryId, LexiconEntry, RelationKind};
use crate::error::{LexiconError, Result};
use crate::etymology::{AncestryGraph, AncestryTree};
use crate::persistence::{load_from_disk, save_to_disk};
use crate::store::{AncestryStore, InMemoryLexicon, SoundMappingSource};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpellingMode {
    Strict,
    Fallback,
}

/// What `apply_spelling` computed; `committed` tells whether it was stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "mode")]
pub enum AppliedSpelling {
    Strict { committed: bool, result: StrictResult },
    Fallback { committed: bool, result: FallbackResult },
}

impl AppliedSpelling {
    pub fn committed(&self) -> bool {
        match self {
            AppliedSpelling::Strict { committed, .. }
            | AppliedSpelling::Fallback { committed, .. } => *committed,
        }
    }
}

/// The calling layer's entry point: one lexicon store plus the spelling
/// pipeline and the ancestry graph service working on it.
pub struct ConscriptEngine {
    store: InMemoryLexicon,
    graph: AncestryGraph,
    store_path: Option<PathBuf>,
}

impl ConscriptEngine {
    /// An empty, memory-only engine.
    pub fn new() -> Self {
        Self::with_store(InMemoryLexicon::new(), &EngineConfig::in_memory())
    }

    pub fn with_store(store: InMemoryLexicon, config: &EngineConfig) -> Self {
        Self {
            store,
            graph: AncestryGraph::new(config.default_max_depth),
            store_path: config.store_path.clone(),
        }
    }

    /// Opens the snapshot named by the config, or starts empty when there is
    /// none or it cannot be read.
    pub fn from_config(config: &EngineConfig) -> Self {
        let store = match &config.store_path {
            Some(path) if path.exists() => load_from_disk(path).unwrap_or_else(|err| {
                tracing::warn!(
                    path = %path.display(),
                    %err,
                    "could not load lexicon, starting empty"
                );
                InMemoryLexicon::new()
            }),
            _ => InMemoryLexicon::new(),
        };
        Self::with_store(store, config)
    }

    pub fn from_file_or_new(path: &Path) -> Self {
        let config =
            EngineConfig { store_path: Some(path.to_path_buf()), ..EngineConfig::default() };
        Self::from_config(&config)
    }

    pub fn store(&self) -> &InMemoryLexicon {
        &self.store
    }

    /// Direct CRUD access for symbols, sound mappings and entries.
    pub fn store_mut(&mut self) -> &mut InMemoryLexicon {
        &mut self.store
    }

    pub fn store_path(&self) -> Option<&Path> {
        self.store_path.as_deref()
    }

    /// Rebuilt on every call so it always reflects the current store.
    fn phoneme_map(&self) -> PhonemeMap {
        PhonemeMap::from_usable_pairs(self.store.usable_sound_mappings())
    }

    // --- spelling ---

    /// Strict resolution: no virtual symbols, gaps make it fail.
    pub fn resolve_spelling(&self, pronunciation: &str) -> StrictResult {
        resolve(pronunciation, &self.phoneme_map()).into()
    }

    /// Always-complete resolution for any non-empty pronunciation.
    pub fn resolve_spelling_with_fallback(&self, pronunciation: &str) -> FallbackResult {
        resolve_with_fallback(pronunciation, &self.phoneme_map()).into()
    }

    /// Same computation as [`Self::resolve_spelling`]; never writes anything.
    pub fn preview_spelling(&self, pronunciation: &str) -> StrictResult {
        tracing::debug!(pronunciation, "preview strict spelling");
        self.resolve_spelling(pronunciation)
    }

    /// Same computation as [`Self::resolve_spelling_with_fallback`]; never
    /// writes anything.
    pub fn preview_spelling_with_fallback(&self, pronunciation: &str) -> FallbackResult {
        tracing::debug!(pronunciation, "preview fallback spelling");
        self.resolve_spelling_with_fallback(pronunciation)
    }

    /// Spells an entry from its pronunciation and stores the spelling when
    /// the resolution succeeded.
    pub fn apply_spelling(
        &mut self,
        entry_id: EntryId,
        mode: SpellingMode,
    ) -> Result<AppliedSpelling> {
        let entry = self.store.entry(entry_id).ok_or(LexiconError::EntryNotFound(entry_id))?;
        let pronunciation = entry.pronunciation.unwrap_or_default();

        let (applied, spelling) = match mode {
            SpellingMode::Strict => {
                let result = self.resolve_spelling(&pronunciation);
                let spelling = result.success.then(|| result.symbol_ids());
                (AppliedSpelling::Strict { committed: result.success, result }, spelling)
            }
            SpellingMode::Fallback => {
                let result = self.resolve_spelling_with_fallback(&pronunciation);
                let spelling = result.success.then(|| result.symbol_ids());
                (AppliedSpelling::Fallback { committed: result.success, result }, spelling)
            }
        };
        if let Some(spelling) = spelling {
            tracing::info!(entry = entry_id, symbols = spelling.len(), "committed spelling");
            self.store.set_spelling(entry_id, spelling)?;
        }
        Ok(applied)
    }

    // --- etymology ---

    pub fn would_create_cycle(&self, child: EntryId, ancestor: EntryId) -> bool {
        self.graph.would_create_cycle(&self.store, child, ancestor)
    }

    pub fn add_ancestor(
        &mut self,
        child: EntryId,
        ancestor: EntryId,
        relation: RelationKind,
    ) -> Result<AncestryEdge> {
        self.graph.add_ancestor(&mut self.store, child, ancestor, relation)
    }

    pub fn set_ancestry(
        &mut self,
        child: EntryId,
        links: &[AncestorLink],
    ) -> Result<Vec<AncestryEdge>> {
        self.graph.set_ancestry(&mut self.store, child, links)
    }

    pub fn remove_ancestor(&mut self, child: EntryId, ancestor: EntryId) -> bool {
        self.graph.remove_ancestor(&mut self.store, child, ancestor)
    }

    pub fn direct_ancestors(&self, child: EntryId) -> Result<Vec<AncestryEdge>> {
        if !self.store.contains_entry(child) {
            return Err(LexiconError::EntryNotFound(child));
        }
        Ok(self.store.ancestry_edges(child))
    }

    pub fn full_ancestry_tree(
        &self,
        root: EntryId,
        max_depth: Option<usize>,
    ) -> Result<AncestryTree> {
        self.graph.full_ancestry_tree(&self.store, root, max_depth)
    }

    pub fn all_ancestor_ids(
        &self,
        root: EntryId,
        max_depth: Option<usize>,
    ) -> Result<BTreeSet<EntryId>> {
        self.graph.all_ancestor_ids(&self.store, root, max_depth)
    }

    pub fn all_descendant_ids(
        &self,
        root: EntryId,
        max_depth: Option<usize>,
    ) -> Result<BTreeSet<EntryId>> {
        self.graph.all_descendant_ids(&self.store, root, max_depth)
    }

    /// Deletes an entry together with every ancestry edge that mentions it.
    pub fn delete_entry(&mut self, id: EntryId) -> Result<LexiconEntry> {
        self.store.delete_entry(id)
    }

    // --- persistence ---

    /// Saves to the configured path. A memory-only engine has nothing to do.
    pub fn save(&self) -> Result<()> {
        match &self.store_path {
            Some(path) => save_to_disk(&self.store, path),
            None => Ok(()),
        }
    }
}

impl Default for ConscriptEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::virtual_symbol_id;

    fn engine_with_sounds(sounds: &[&str]) -> ConscriptEngine {
        let mut engine = ConscriptEngine::new();
        for sound in sounds {
            let id = engine.store_mut().add_symbol(vec![format!("glyph-{sound}")]).unwrap();
            engine.store_mut().add_sound_mapping(id, sound, true).unwrap();
        }
        engine
    }

    #[test]
    fn map_reflects_store_changes_between_calls() {
        let mut engine = engine_with_sounds(&["a"]);
        assert!(!engine.resolve_spelling("ab").success);
        let b = engine.store_mut().add_symbol(vec!["b".into()]).unwrap();
        engine.store_mut().add_sound_mapping(b, "b", true).unwrap();
        assert!(engine.resolve_spelling("ab").success);
    }

    #[test]
    fn preview_matches_resolve_and_writes_nothing() {
        let mut engine = engine_with_sounds(&["a", "b"]);
        let entry = engine.store_mut().add_entry("axb", Some("axb"));
        assert_eq!(engine.preview_spelling("axb"), engine.resolve_spelling("axb"));
        assert_eq!(
            engine.preview_spelling_with_fallback("axb"),
            engine.resolve_spelling_with_fallback("axb")
        );
        assert!(engine.store().entry(entry).unwrap().spelling.is_empty());
    }

    #[test]
    fn apply_spelling_commits_only_successful_results() {
        let mut engine = engine_with_sounds(&["a", "b"]);
        let entry = engine.store_mut().add_entry("axb", Some("axb"));

        let strict = engine.apply_spelling(entry, SpellingMode::Strict).unwrap();
        assert!(!strict.committed());
        assert!(engine.store().entry(entry).unwrap().spelling.is_empty());

        let fallback = engine.apply_spelling(entry, SpellingMode::Fallback).unwrap();
        assert!(fallback.committed());
        assert_eq!(
            engine.store().entry(entry).unwrap().spelling,
            vec![1, virtual_symbol_id('x'), 2]
        );
    }

    #[test]
    fn apply_spelling_without_pronunciation_is_empty_input() {
        let mut engine = engine_with_sounds(&["a"]);
        let entry = engine.store_mut().add_entry("mute", None);
        let applied = engine.apply_spelling(entry, SpellingMode::Fallback).unwrap();
        assert!(!applied.committed());
        assert!(matches!(
            engine.apply_spelling(77, SpellingMode::Strict),
            Err(LexiconError::EntryNotFound(77))
        ));
    }

    #[test]
    fn save_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexicon.bin");
        let mut engine = ConscriptEngine::from_file_or_new(&path);
        let a = engine.store_mut().add_entry("a", None);
        let b = engine.store_mut().add_entry("b", None);
        engine.add_ancestor(b, a, RelationKind::Derived).unwrap();
        engine.save().unwrap();

        let reopened = ConscriptEngine::from_file_or_new(&path);
        assert_eq!(reopened.all_ancestor_ids(b, None).unwrap(), BTreeSet::from([a]));
    }
}
