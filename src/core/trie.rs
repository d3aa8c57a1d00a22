// --- File: src/core/trie.rs
use crate::core::types::SymbolId;
use std::collections::HashMap;

// --- SoundTrie: suffix lookup of sound strings ---

#[derive(Debug, Clone)]
struct SoundNode {
    children: HashMap<char, usize>,
    symbol_id: Option<SymbolId>,
}

impl SoundNode {
    fn new() -> Self {
        Self { children: HashMap::new(), symbol_id: None }
    }
}

/// A char trie over *reversed* sound strings.
///
/// Walking it backwards from a position of the pronunciation yields every
/// sound string that ends exactly at that position, in one pass of at most
/// `longest` steps.
#[derive(Debug, Clone)]
pub struct SoundTrie {
    nodes: Vec<SoundNode>,
    longest: usize,
}

impl SoundTrie {
    pub fn new() -> Self {
        Self { nodes: vec![SoundNode::new()], longest: 0 }
    }

    /// Inserts a sound string. An already present sound keeps its symbol
    /// (first insert wins). Returns whether the sound was new.
    /// O(k) complexity where k is the sound length in chars.
    pub fn insert(&mut self, sound: &str, symbol_id: SymbolId) -> bool {
        let mut node_idx = 0;
        let mut len = 0;
        for ch in sound.chars().rev() {
            let next_idx = if let Some(&id) = self.nodes[node_idx].children.get(&ch) {
                id
            } else {
                let new_node_id = self.nodes.len();
                self.nodes.push(SoundNode::new());
                self.nodes[node_idx].children.insert(ch, new_node_id);
                new_node_id
            };
            node_idx = next_idx;
            len += 1;
        }
        if len == 0 || self.nodes[node_idx].symbol_id.is_some() {
            return false;
        }
        self.nodes[node_idx].symbol_id = Some(symbol_id);
        self.longest = self.longest.max(len);
        true
    }

    /// Length in chars of the longest stored sound.
    pub fn longest(&self) -> usize {
        self.longest
    }

    /// All `(length, symbol)` pairs whose sound equals `chars[end - length..end]`,
    /// longest first.
    pub fn matches_ending_at(&self, chars: &[char], end: usize) -> Vec<(usize, SymbolId)> {
        let mut found = Vec::new();
        let mut node_idx = 0;
        for (steps, &ch) in chars[..end].iter().rev().enumerate() {
            match self.nodes[node_idx].children.get(&ch) {
                Some(&next_idx) => node_idx = next_idx,
                None => break,
            }
            if let Some(id) = self.nodes[node_idx].symbol_id {
                found.push((steps + 1, id));
            }
        }
        // The backward walk discovers short sounds first.
        found.reverse();
        found
    }
}

impl Default for SoundTrie {
    fn default() -> Self {
        Self::new()
    }
}
