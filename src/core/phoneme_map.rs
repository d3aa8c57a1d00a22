use crate::core::trie::SoundTrie;
use crate::core::types::{SoundMapping, SymbolId};
use std::collections::BTreeMap;

/// Lookup from sound string to the symbol that spells it.
///
/// Built fresh for every resolution from the current store contents. When
/// several symbols share a sound, the lowest symbol id wins.
#[derive(Debug, Clone, Default)]
pub struct PhonemeMap {
    sounds: BTreeMap<String, SymbolId>,
    trie: SoundTrie,
}

impl PhonemeMap {
    /// Builds the map from raw sound mappings, skipping the ones not flagged
    /// usable for auto-spelling.
    pub fn build<'a, I>(mappings: I) -> Self
    where
        I: IntoIterator<Item = &'a SoundMapping>,
    {
        Self::from_usable_pairs(
            mappings
                .into_iter()
                .filter(|m| m.usable_for_auto_spelling)
                .map(|m| (m.symbol_id, m.sound.clone())),
        )
    }

    /// Builds the map from `(symbol, sound)` pairs already filtered for
    /// usability, as returned by the store.
    pub fn from_usable_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (SymbolId, String)>,
    {
        let mut pairs: Vec<(SymbolId, String)> = pairs.into_iter().collect();
        // Stable, so registration order survives within one symbol.
        pairs.sort_by_key(|(id, _)| *id);

        let mut map = Self::default();
        for (symbol_id, sound) in pairs {
            if sound.is_empty() || map.sounds.contains_key(&sound) {
                continue;
            }
            map.trie.insert(&sound, symbol_id);
            map.sounds.insert(sound, symbol_id);
        }
        tracing::debug!(
            sounds = map.sounds.len(),
            longest = map.trie.longest(),
            "built phoneme map"
        );
        map
    }

    pub fn get(&self, sound: &str) -> Option<SymbolId> {
        self.sounds.get(sound).copied()
    }

    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }

    /// Longest sound in chars; bounds the work per DP position.
    pub fn longest_sound(&self) -> usize {
        self.trie.longest()
    }

    /// Sounds ending exactly at `end` in `chars`, longest first.
    pub(crate) fn matches_ending_at(&self, chars: &[char], end: usize) -> Vec<(usize, SymbolId)> {
        self.trie.matches_ending_at(chars, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(symbol_id: SymbolId, sound: &str, usable: bool) -> SoundMapping {
        SoundMapping { symbol_id, sound: sound.to_string(), usable_for_auto_spelling: usable }
    }

    #[test]
    fn lowest_symbol_id_wins_regardless_of_input_order() {
        let mappings = vec![mapping(9, "a", true), mapping(3, "a", true), mapping(5, "b", true)];
        let map = PhonemeMap::build(&mappings);
        assert_eq!(map.get("a"), Some(3));
        assert_eq!(map.get("b"), Some(5));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn unusable_and_empty_sounds_are_skipped() {
        let mappings = vec![mapping(1, "a", false), mapping(2, "", true), mapping(3, "ts", true)];
        let map = PhonemeMap::build(&mappings);
        assert_eq!(map.get("a"), None);
        assert_eq!(map.len(), 1);
        assert_eq!(map.longest_sound(), 2);
    }

    #[test]
    fn unusable_low_id_does_not_shadow_usable_high_id() {
        let mappings = vec![mapping(1, "a", false), mapping(2, "a", true)];
        assert_eq!(PhonemeMap::build(&mappings).get("a"), Some(2));
    }

    #[test]
    fn no_usable_mappings_gives_empty_map() {
        let map = PhonemeMap::build(&[mapping(1, "a", false)]);
        assert!(map.is_empty());
        assert_eq!(map.longest_sound(), 0);
    }
}
