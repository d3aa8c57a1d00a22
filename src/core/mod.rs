// src/core/mod.rs
pub mod engine;
pub mod fallback;
pub mod phoneme_map;
pub mod result;
pub mod segmenter;
pub mod trie;
pub mod types;
