// src/core/result.rs
//! Result objects handed to the calling layer, serialized in camelCase.

use crate::core::fallback::FallbackResolution;
use crate::core::segmenter::{Piece, Resolution, SpellingIssue};
use crate::core::types::SymbolId;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellingSlot {
    pub symbol_id: SymbolId,
    /// Index of the symbol within the spelling.
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrictResult {
    pub success: bool,
    /// Matched symbols in order. On partial coverage this is what matched.
    pub spelling: Vec<SpellingSlot>,
    /// Matched sound strings, parallel to `spelling`.
    pub segments: Vec<String>,
    pub unmatched_parts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SpellingIssue>,
}

impl StrictResult {
    pub fn symbol_ids(&self) -> Vec<SymbolId> {
        self.spelling.iter().map(|s| s.symbol_id).collect()
    }
}

impl From<Resolution> for StrictResult {
    fn from(resolution: Resolution) -> Self {
        let seg = &resolution.segmentation;
        let spelling = seg
            .pieces
            .iter()
            .filter_map(|p| match p {
                Piece::Matched { symbol_id, .. } => Some(*symbol_id),
                Piece::Unmatched { .. } => None,
            })
            .enumerate()
            .map(|(position, symbol_id)| SpellingSlot { symbol_id, position })
            .collect();

        let unmatched_parts = match resolution.issue {
            Some(SpellingIssue::PartialCoverage) => seg.unmatched_runs(),
            _ => Vec::new(),
        };
        let error = resolution.issue.map(|issue| match issue {
            SpellingIssue::PartialCoverage => {
                format!("{issue}: {}", unmatched_parts.join(", "))
            }
            _ => issue.to_string(),
        });

        StrictResult {
            success: resolution.issue.is_none(),
            spelling,
            segments: seg.covered_sounds(),
            unmatched_parts,
            error,
            reason: resolution.issue,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackSlot {
    pub symbol_id: SymbolId,
    pub position: usize,
    pub is_virtual: bool,
    /// The unmatched char a virtual symbol stands in for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipa_character: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackResult {
    pub success: bool,
    pub spelling: Vec<FallbackSlot>,
    /// Source text of every slot (sound string or virtual char), parallel to
    /// `spelling`.
    pub segments: Vec<String>,
    /// Gaps the real symbols could not cover, as maximal runs.
    pub unmatched_parts: Vec<String>,
    pub has_virtual_glyphs: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SpellingIssue>,
}

impl FallbackResult {
    pub fn symbol_ids(&self) -> Vec<SymbolId> {
        self.spelling.iter().map(|s| s.symbol_id).collect()
    }
}

impl From<FallbackResolution> for FallbackResult {
    fn from(resolution: FallbackResolution) -> Self {
        let has_virtual_glyphs = resolution.has_virtual_glyphs();
        let spelling = resolution
            .slots
            .iter()
            .enumerate()
            .map(|(position, slot)| FallbackSlot {
                symbol_id: slot.symbol_id,
                position,
                is_virtual: slot.is_virtual,
                ipa_character: slot.is_virtual.then(|| slot.source.clone()),
            })
            .collect();

        FallbackResult {
            success: resolution.issue.is_none(),
            spelling,
            segments: resolution.slots.into_iter().map(|s| s.source).collect(),
            unmatched_parts: resolution.segmentation.unmatched_runs(),
            has_virtual_glyphs,
            error: resolution.issue.map(|issue| issue.to_string()),
            reason: resolution.issue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fallback::resolve_with_fallback;
    use crate::core::phoneme_map::PhonemeMap;
    use crate::core::segmenter::resolve;
    use crate::core::types::virtual_symbol_id;

    fn map(pairs: &[(SymbolId, &str)]) -> PhonemeMap {
        PhonemeMap::from_usable_pairs(pairs.iter().map(|(id, s)| (*id, s.to_string())))
    }

    #[test]
    fn strict_partial_result_lists_unmatched_parts() {
        let result = StrictResult::from(resolve("axb", &map(&[(1, "a"), (2, "b")])));
        assert!(!result.success);
        assert_eq!(result.unmatched_parts, vec!["x"]);
        assert_eq!(result.reason, Some(SpellingIssue::PartialCoverage));
        assert!(result.error.as_deref().is_some_and(|e| e.contains('x')));
        assert_eq!(result.symbol_ids(), vec![1, 2]);
    }

    #[test]
    fn fallback_result_marks_the_virtual_middle() {
        let resolution = resolve_with_fallback("axb", &map(&[(1, "a"), (2, "b")]));
        let result = FallbackResult::from(resolution);
        assert!(result.success);
        assert!(result.has_virtual_glyphs);
        let middle = &result.spelling[1];
        assert!(middle.is_virtual);
        assert_eq!(middle.position, 1);
        assert_eq!(middle.symbol_id, virtual_symbol_id('x'));
        assert_eq!(middle.ipa_character.as_deref(), Some("x"));
        assert_eq!(result.segments, vec!["a", "x", "b"]);
    }

    #[test]
    fn serializes_in_camel_case() {
        let result = StrictResult::from(resolve("", &map(&[(1, "A")])));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["reason"], "emptyInput");
        assert!(json.get("unmatchedParts").is_some());
    }
}
