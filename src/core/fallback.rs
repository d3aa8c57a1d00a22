use crate::core::phoneme_map::PhonemeMap;
use crate::core::segmenter::{non_blank_input, segment, Piece, Segmentation, SpellingIssue};
use crate::core::types::{virtual_symbol_id, SymbolId};

/// One symbol of a complete spelling, real or virtual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpelledSlot {
    pub symbol_id: SymbolId,
    /// Char offset of `source` in the pronunciation.
    pub offset: usize,
    /// The sound string (real) or the single char (virtual) this slot spells.
    pub source: String,
    pub is_virtual: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackResolution {
    /// Only ever `EmptyInput`: any non-empty pronunciation gets a spelling.
    pub issue: Option<SpellingIssue>,
    pub slots: Vec<SpelledSlot>,
    pub segmentation: Segmentation,
}

impl FallbackResolution {
    pub fn is_success(&self) -> bool {
        self.issue.is_none()
    }

    pub fn has_virtual_glyphs(&self) -> bool {
        self.slots.iter().any(|s| s.is_virtual)
    }
}

/// Resolves `pronunciation` and fills every gap with one virtual symbol per
/// unmatched char.
///
/// The real part is exactly what [`crate::core::segmenter::resolve`] would
/// pick for the same input; virtual slots only replace the gaps. Whitespace is
/// not trimmed, so a leading or trailing space gets a virtual slot just like
/// an inner one. An empty map is not an error here: the whole pronunciation
/// comes out virtual.
pub fn resolve_with_fallback(pronunciation: &str, map: &PhonemeMap) -> FallbackResolution {
    let Some(input) = non_blank_input(pronunciation) else {
        return FallbackResolution {
            issue: Some(SpellingIssue::EmptyInput),
            slots: Vec::new(),
            segmentation: Segmentation::default(),
        };
    };

    let segmentation = segment(input, map);
    let slots: Vec<SpelledSlot> = segmentation
        .pieces
        .iter()
        .map(|piece| match piece {
            Piece::Matched { symbol_id, offset, sound } => SpelledSlot {
                symbol_id: *symbol_id,
                offset: *offset,
                source: sound.clone(),
                is_virtual: false,
            },
            Piece::Unmatched { offset, ch } => SpelledSlot {
                symbol_id: virtual_symbol_id(*ch),
                offset: *offset,
                source: ch.to_string(),
                is_virtual: true,
            },
        })
        .collect();

    let virtual_count = slots.iter().filter(|s| s.is_virtual).count();
    if virtual_count > 0 {
        tracing::debug!(input, virtual_count, "filled unmatched sounds with virtual symbols");
    }
    FallbackResolution { issue: None, slots, segmentation }
}
