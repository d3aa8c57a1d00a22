//! Error types for lexicon, etymology and persistence operations.

use crate::core::types::{EntryId, SymbolId};
use thiserror::Error;

/// Hard failures. Spelling outcomes such as empty input or partial coverage
/// are not errors; they travel inside the result objects.
#[derive(Debug, Error)]
pub enum LexiconError {
    /// The ancestry mutation would make an entry its own ancestor.
    #[error("this would create a cycle in the etymology tree ({child} -> {ancestor})")]
    CycleDetected { child: EntryId, ancestor: EntryId },

    #[error("vocabulary entry {0} does not exist")]
    EntryNotFound(EntryId),

    #[error("symbol {0} does not exist")]
    SymbolNotFound(SymbolId),

    /// Negative ids are reserved for virtual symbols.
    #[error("symbol id {0} is reserved for virtual symbols")]
    InvalidSymbolId(SymbolId),

    /// Edge positions are `u32`; an entry cannot take more ancestors.
    #[error("vocabulary entry {0} has no free ancestor position left")]
    TooManyAncestors(EntryId),

    #[error("no symbol ids left to allocate")]
    SymbolIdsExhausted,

    #[error("sound string is empty")]
    EmptySound,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding error: {0}")]
    Encode(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("malformed command: {0}")]
    Protocol(String),
}

/// A specialized `Result` type for lexicon operations.
pub type Result<T> = std::result::Result<T, LexiconError>;
