// src/core/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a symbol of the constructed script.
/// Real symbols are non-negative; the negative range belongs to virtual symbols.
pub type SymbolId = i64;

/// Identifier of a vocabulary (lexicon) entry.
pub type EntryId = u64;

/// Offset added below zero so that no character maps to a virtual id of 0.
const VIRTUAL_ID_BASE: SymbolId = -1;

/// Returns the virtual symbol id standing in for `ch`.
///
/// The id is derived from the Unicode scalar value alone, so the same
/// character gets the same id in every call and every process. Scalar values
/// are unique, which makes the mapping injective.
pub fn virtual_symbol_id(ch: char) -> SymbolId {
    VIRTUAL_ID_BASE - SymbolId::from(u32::from(ch))
}

/// Inverse of [`virtual_symbol_id`]. `None` for real ids or ids outside the
/// Unicode range.
pub fn virtual_symbol_char(id: SymbolId) -> Option<char> {
    if id > VIRTUAL_ID_BASE {
        return None;
    }
    u32::try_from(VIRTUAL_ID_BASE - id).ok().and_then(char::from_u32)
}

pub fn is_virtual_symbol(id: SymbolId) -> bool {
    id < 0
}

/// A grapheme of the script: an id plus the ordered atomic visual units it
/// is composed of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub id: SymbolId,
    pub units: Vec<String>,
}

/// An association between a symbol and a pronounced sound string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundMapping {
    pub symbol_id: SymbolId,
    pub sound: String,
    pub usable_for_auto_spelling: bool,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    #[default]
    Derived,
    Borrowed,
    Compound,
    Inflected,
}

impl RelationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationKind::Derived => "derived",
            RelationKind::Borrowed => "borrowed",
            RelationKind::Compound => "compound",
            RelationKind::Inflected => "inflected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "derived" => Some(RelationKind::Derived),
            "borrowed" => Some(RelationKind::Borrowed),
            "compound" => Some(RelationKind::Compound),
            "inflected" => Some(RelationKind::Inflected),
            _ => None,
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed "derives-from" edge: `child_id` descends from `ancestor_id`.
/// `position` orders the ancestors of one child (roots of a compound).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncestryEdge {
    pub child_id: EntryId,
    pub ancestor_id: EntryId,
    pub position: u32,
    pub relation: RelationKind,
}

/// One ancestor in a bulk `set_ancestry` request. Positions are taken from
/// the order of the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncestorLink {
    pub ancestor_id: EntryId,
    pub relation: RelationKind,
}

/// A word-level record of the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub id: EntryId,
    pub headword: String,
    pub pronunciation: Option<String>,
    /// Last committed spelling; may contain virtual ids.
    pub spelling: Vec<SymbolId>,
}
