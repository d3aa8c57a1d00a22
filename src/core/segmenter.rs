//! Dynamic-programming segmentation of a pronunciation into known sounds.
//!
//! Every position `i` of the pronunciation (counted in Unicode scalar values)
//! keeps the best `(coverage, segment count)` reachable for the prefix ending
//! at `i`, plus the step that produced it. Coverage is maximised first, the
//! number of matched segments minimised second. Candidates are tried longest
//! sound first and a real match before the unmatched-character step; a later
//! candidate only replaces the current best when strictly better, so the
//! outcome never depends on container iteration order.

use crate::core::phoneme_map::PhonemeMap;
use crate::core::types::SymbolId;
use serde::Serialize;
use std::fmt;

/// Why a resolution produced no complete spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SpellingIssue {
    EmptyInput,
    NoUsableMapping,
    PartialCoverage,
}

impl fmt::Display for SpellingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpellingIssue::EmptyInput => f.write_str("pronunciation is empty"),
            SpellingIssue::NoUsableMapping => {
                f.write_str("no sound mappings are marked usable for auto-spelling")
            }
            SpellingIssue::PartialCoverage => {
                f.write_str("some sounds have no matching symbol")
            }
        }
    }
}

/// One piece of a segmentation, in pronunciation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    Matched { symbol_id: SymbolId, offset: usize, sound: String },
    Unmatched { offset: usize, ch: char },
}

impl Piece {
    pub fn offset(&self) -> usize {
        match self {
            Piece::Matched { offset, .. } | Piece::Unmatched { offset, .. } => *offset,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, Piece::Matched { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segmentation {
    pub pieces: Vec<Piece>,
    /// Number of chars covered by real matches.
    pub coverage: usize,
    /// Length of the segmented pronunciation in chars.
    pub len: usize,
}

impl Segmentation {
    pub fn is_complete(&self) -> bool {
        self.coverage == self.len
    }

    pub fn matched_count(&self) -> usize {
        self.pieces.iter().filter(|p| p.is_matched()).count()
    }

    /// Matched sound strings, in order.
    pub fn covered_sounds(&self) -> Vec<String> {
        self.pieces
            .iter()
            .filter_map(|p| match p {
                Piece::Matched { sound, .. } => Some(sound.clone()),
                Piece::Unmatched { .. } => None,
            })
            .collect()
    }

    /// Maximal runs of consecutive unmatched chars.
    pub fn unmatched_runs(&self) -> Vec<String> {
        let mut runs = Vec::new();
        let mut current = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Unmatched { ch, .. } => current.push(*ch),
                Piece::Matched { .. } => {
                    if !current.is_empty() {
                        runs.push(std::mem::take(&mut current));
                    }
                }
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }
        runs
    }
}

/// Result of a strict resolution: `issue` is `None` on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub issue: Option<SpellingIssue>,
    pub segmentation: Segmentation,
}

impl Resolution {
    fn failed(issue: SpellingIssue) -> Self {
        Self { issue: Some(issue), segmentation: Segmentation::default() }
    }

    pub fn is_success(&self) -> bool {
        self.issue.is_none()
    }
}

/// `None` for an empty or whitespace-only pronunciation. Anything else is
/// returned untouched: whitespace inside or around it is segmented like any
/// other char.
pub fn non_blank_input(pronunciation: &str) -> Option<&str> {
    (!pronunciation.trim().is_empty()).then_some(pronunciation)
}

/// Strict resolution: fails on empty input, on an empty map, and whenever
/// any char is left uncovered.
pub fn resolve(pronunciation: &str, map: &PhonemeMap) -> Resolution {
    let Some(input) = non_blank_input(pronunciation) else {
        return Resolution::failed(SpellingIssue::EmptyInput);
    };
    if map.is_empty() {
        return Resolution::failed(SpellingIssue::NoUsableMapping);
    }

    let segmentation = segment(input, map);
    let issue = (!segmentation.is_complete()).then_some(SpellingIssue::PartialCoverage);
    Resolution { issue, segmentation }
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Start,
    Match { len: usize, symbol_id: SymbolId },
    Skip,
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    coverage: usize,
    count: usize,
    step: Step,
}

impl Cell {
    fn beats(&self, other: &Cell) -> bool {
        self.coverage > other.coverage
            || (self.coverage == other.coverage && self.count < other.count)
    }
}

/// Runs the optimiser over `input` as is (no trimming, no emptiness checks).
/// O(n·L) where L is the longest sound in the map. Always terminates with a
/// full partition; chars absent from the map come out as `Unmatched`.
pub fn segment(input: &str, map: &PhonemeMap) -> Segmentation {
    let chars: Vec<char> = input.chars().collect();
    let n = chars.len();

    let mut dp: Vec<Cell> = Vec::with_capacity(n + 1);
    dp.push(Cell { coverage: 0, count: 0, step: Step::Start });

    for i in 1..=n {
        let mut best: Option<Cell> = None;
        for (len, symbol_id) in map.matches_ending_at(&chars, i) {
            let prev = dp[i - len];
            let candidate = Cell {
                coverage: prev.coverage + len,
                count: prev.count + 1,
                step: Step::Match { len, symbol_id },
            };
            if best.map_or(true, |b| candidate.beats(&b)) {
                best = Some(candidate);
            }
        }

        let prev = dp[i - 1];
        let skip = Cell { coverage: prev.coverage, count: prev.count, step: Step::Skip };
        let cell = match best {
            Some(b) if !skip.beats(&b) => b,
            _ => skip,
        };
        dp.push(cell);
    }

    let mut pieces = Vec::new();
    let mut i = n;
    while i > 0 {
        match dp[i].step {
            Step::Match { len, symbol_id } => {
                let sound: String = chars[i - len..i].iter().collect();
                pieces.push(Piece::Matched { symbol_id, offset: i - len, sound });
                i -= len;
            }
            Step::Skip | Step::Start => {
                pieces.push(Piece::Unmatched { offset: i - 1, ch: chars[i - 1] });
                i -= 1;
            }
        }
    }
    pieces.reverse();

    let segmentation = Segmentation { pieces, coverage: dp[n].coverage, len: n };
    tracing::debug!(
        input,
        coverage = segmentation.coverage,
        segments = dp[n].count,
        "segmented pronunciation"
    );
    segmentation
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(SymbolId, &str)]) -> PhonemeMap {
        PhonemeMap::from_usable_pairs(pairs.iter().map(|(id, s)| (*id, s.to_string())))
    }

    fn symbols(seg: &Segmentation) -> Vec<SymbolId> {
        seg.pieces
            .iter()
            .filter_map(|p| match p {
                Piece::Matched { symbol_id, .. } => Some(*symbol_id),
                Piece::Unmatched { .. } => None,
            })
            .collect()
    }

    #[test]
    fn prefers_full_coverage_over_greedy_longest_match() {
        let m = map(&[(1, "ABC"), (2, "AB"), (3, "CD")]);
        let r = resolve("ABCD", &m);
        assert!(r.is_success());
        assert_eq!(symbols(&r.segmentation), vec![2, 3]);
        assert_eq!(r.segmentation.covered_sounds(), vec!["AB", "CD"]);
    }

    #[test]
    fn prefers_fewer_segments_at_equal_coverage() {
        let m = map(&[(1, "a"), (2, "b"), (3, "ab")]);
        let r = resolve("ab", &m);
        assert_eq!(symbols(&r.segmentation), vec![3]);
    }

    #[test]
    fn ties_resolve_to_the_longest_final_sound() {
        // "abc" = "ab"+"c" or "a"+"bc": same coverage, same count.
        let m = map(&[(1, "a"), (2, "ab"), (3, "bc"), (4, "c")]);
        let first = resolve("abc", &m);
        assert_eq!(symbols(&first.segmentation), vec![1, 3]);
        assert_eq!(first, resolve("abc", &m));
    }

    #[test]
    fn real_match_wins_a_tie_against_skipping() {
        // "ab"+'c' and 'a'+"bc" both cover two chars with one segment; at the
        // last char, matching "bc" is preferred over skipping 'c'.
        let m = map(&[(1, "ab"), (2, "bc")]);
        let r = resolve("abc", &m);
        assert_eq!(r.issue, Some(SpellingIssue::PartialCoverage));
        assert_eq!(r.segmentation.covered_sounds(), vec!["bc"]);
        assert_eq!(r.segmentation.unmatched_runs(), vec!["a"]);
        assert_eq!(symbols(&r.segmentation), vec![2]);
    }

    #[test]
    fn empty_and_whitespace_input_fail_before_the_dp() {
        let m = map(&[(1, "A")]);
        assert_eq!(resolve("", &m).issue, Some(SpellingIssue::EmptyInput));
        assert_eq!(resolve("  \t", &m).issue, Some(SpellingIssue::EmptyInput));
    }

    #[test]
    fn empty_map_is_reported_distinctly() {
        let r = resolve("abc", &PhonemeMap::default());
        assert_eq!(r.issue, Some(SpellingIssue::NoUsableMapping));
        assert!(r.segmentation.pieces.is_empty());
    }

    #[test]
    fn surrounding_whitespace_is_segmented_like_inner_whitespace() {
        let m = map(&[(1, "a")]);
        let r = resolve(" a ", &m);
        assert_eq!(r.issue, Some(SpellingIssue::PartialCoverage));
        assert_eq!(r.segmentation.len, 3);
        assert_eq!(r.segmentation.unmatched_runs(), vec![" ", " "]);
        assert_eq!(r.segmentation.pieces[1].offset(), 1);
    }

    #[test]
    fn gaps_are_listed_as_maximal_runs() {
        let m = map(&[(1, "a"), (2, "b")]);
        let r = resolve("axyb z a", &m);
        assert_eq!(r.issue, Some(SpellingIssue::PartialCoverage));
        assert_eq!(r.segmentation.unmatched_runs(), vec!["xy", " z "]);
        assert_eq!(r.segmentation.covered_sounds(), vec!["a", "b", "a"]);
    }

    #[test]
    fn unknown_characters_degrade_to_all_unmatched() {
        let m = map(&[(1, "a")]);
        let r = resolve("ʃʒ", &m);
        assert_eq!(r.segmentation.coverage, 0);
        assert_eq!(r.segmentation.unmatched_runs(), vec!["ʃʒ"]);
    }

    #[test]
    fn multi_codepoint_sounds_match_as_literal_substrings() {
        let m = map(&[(1, "t\u{0361}ʃ"), (2, "t"), (3, "a")]);
        let r = resolve("t\u{0361}ʃa", &m);
        assert!(r.is_success());
        assert_eq!(symbols(&r.segmentation), vec![1, 3]);
        assert_eq!(r.segmentation.len, 4);
    }

    #[test]
    fn offsets_count_unicode_scalars() {
        let m = map(&[(1, "ŋ"), (2, "a")]);
        let seg = segment("aŋa", &m);
        let offsets: Vec<usize> = seg.pieces.iter().map(Piece::offset).collect();
        assert_eq!(offsets, vec![0, 1, 2]);
    }
}
