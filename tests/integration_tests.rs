//! End-to-end scenarios through the public engine API.

use conscript_core::core::segmenter::SpellingIssue;
use conscript_core::core::types::{virtual_symbol_id, AncestorLink, RelationKind, SymbolId};
use conscript_core::{ConscriptEngine, LexiconError, SpellingMode};
use std::collections::BTreeSet;

fn engine_with(mappings: &[(SymbolId, &str)]) -> ConscriptEngine {
    let mut engine = ConscriptEngine::new();
    for (id, sound) in mappings {
        engine.store_mut().insert_symbol(*id, vec![format!("g{id}")]).unwrap();
        engine.store_mut().add_sound_mapping(*id, sound, true).unwrap();
    }
    engine
}

#[test]
fn full_coverage_beats_greedy_longest_match() {
    let engine = engine_with(&[(1, "ABC"), (2, "AB"), (3, "CD")]);
    let result = engine.resolve_spelling("ABCD");
    assert!(result.success);
    assert_eq!(result.symbol_ids(), vec![2, 3]);
    assert_eq!(result.segments, vec!["AB", "CD"]);
    assert!(result.unmatched_parts.is_empty());
}

#[test]
fn empty_pronunciation_fails_with_empty_input() {
    let engine = engine_with(&[(1, "A")]);
    let result = engine.resolve_spelling("");
    assert!(!result.success);
    assert_eq!(result.reason, Some(SpellingIssue::EmptyInput));
    assert!(result.error.is_some());

    let fallback = engine.resolve_spelling_with_fallback("");
    assert!(!fallback.success);
    assert_eq!(fallback.reason, Some(SpellingIssue::EmptyInput));
}

#[test]
fn no_usable_mappings_is_reported_in_strict_mode() {
    let mut engine = engine_with(&[]);
    let id = engine.store_mut().add_symbol(vec!["x".into()]).unwrap();
    engine.store_mut().add_sound_mapping(id, "a", false).unwrap();
    let result = engine.resolve_spelling("a");
    assert_eq!(result.reason, Some(SpellingIssue::NoUsableMapping));

    engine.store_mut().set_mapping_usable(id, "a", true);
    assert!(engine.resolve_spelling("a").success);
}

#[test]
fn gap_fails_strict_and_becomes_virtual_in_fallback() {
    let engine = engine_with(&[(1, "a"), (2, "b")]);

    let strict = engine.resolve_spelling("axb");
    assert!(!strict.success);
    assert_eq!(strict.unmatched_parts, vec!["x"]);
    assert_eq!(strict.reason, Some(SpellingIssue::PartialCoverage));

    let fallback = engine.resolve_spelling_with_fallback("axb");
    assert!(fallback.success);
    assert!(fallback.has_virtual_glyphs);
    assert_eq!(fallback.spelling.len(), 3);
    assert!(fallback.spelling[1].is_virtual);
    assert_eq!(fallback.spelling[1].ipa_character.as_deref(), Some("x"));
    assert_eq!(fallback.spelling[1].symbol_id, virtual_symbol_id('x'));
    assert!(!fallback.spelling[0].is_virtual && !fallback.spelling[2].is_virtual);
}

#[test]
fn virtual_ids_are_stable_across_engines() {
    let first = engine_with(&[(1, "a")]).resolve_spelling_with_fallback("aq");
    let second = engine_with(&[(7, "a")]).resolve_spelling_with_fallback("qa");
    assert_eq!(first.spelling[1].symbol_id, second.spelling[0].symbol_id);
}

#[test]
fn lowest_symbol_id_wins_a_shared_sound() {
    let engine = engine_with(&[(8, "ka"), (3, "ka")]);
    assert_eq!(engine.resolve_spelling("ka").symbol_ids(), vec![3]);
}

#[test]
fn self_reference_and_reverse_edges_are_cycles() {
    let mut engine = ConscriptEngine::new();
    let a = engine.store_mut().add_entry("a", None);
    let b = engine.store_mut().add_entry("b", None);
    assert!(engine.would_create_cycle(a, a));

    engine.add_ancestor(b, a, RelationKind::Derived).unwrap();
    assert!(engine.would_create_cycle(a, b));
    let err = engine.add_ancestor(a, b, RelationKind::Derived).unwrap_err();
    assert!(matches!(err, LexiconError::CycleDetected { .. }));
    assert!(err.to_string().contains("this would create a cycle in the etymology tree"));
}

#[test]
fn diamond_ancestry_is_allowed() {
    let mut engine = ConscriptEngine::new();
    let a = engine.store_mut().add_entry("a", None);
    let b = engine.store_mut().add_entry("b", None);
    let c = engine.store_mut().add_entry("c", None);
    engine.add_ancestor(c, a, RelationKind::Compound).unwrap();
    engine.add_ancestor(c, b, RelationKind::Compound).unwrap();

    let tree = engine.full_ancestry_tree(c, None).unwrap();
    let roots: Vec<_> = tree.ancestors.iter().map(|t| (t.entry.id, t.position)).collect();
    assert_eq!(roots, vec![(a, Some(0)), (b, Some(1))]);
    assert_eq!(engine.all_descendant_ids(a, None).unwrap(), BTreeSet::from([c]));
}

#[test]
fn set_ancestry_replaces_atomically() {
    let mut engine = ConscriptEngine::new();
    let ids: Vec<_> =
        ["a", "b", "c"].iter().map(|w| engine.store_mut().add_entry(w, None)).collect();
    engine.add_ancestor(ids[2], ids[0], RelationKind::Derived).unwrap();

    let links = [AncestorLink { ancestor_id: ids[1], relation: RelationKind::Borrowed }];
    engine.set_ancestry(ids[2], &links).unwrap();
    let direct: Vec<_> =
        engine.direct_ancestors(ids[2]).unwrap().iter().map(|e| e.ancestor_id).collect();
    assert_eq!(direct, vec![ids[1]]);

    let cyclic = [AncestorLink { ancestor_id: ids[2], relation: RelationKind::Derived }];
    assert!(engine.set_ancestry(ids[1], &cyclic).is_err());
    assert!(engine.direct_ancestors(ids[1]).unwrap().is_empty());
}

#[test]
fn deleting_an_entry_cleans_up_and_unlinks() {
    let mut engine = engine_with(&[(1, "a")]);
    let proto = engine.store_mut().add_entry("proto", Some("a"));
    let word = engine.store_mut().add_entry("word", Some("aa"));
    engine.add_ancestor(word, proto, RelationKind::Derived).unwrap();
    engine.apply_spelling(word, SpellingMode::Strict).unwrap();

    engine.delete_entry(proto).unwrap();
    assert!(engine.all_ancestor_ids(word, None).unwrap().is_empty());
    assert!(matches!(engine.full_ancestry_tree(proto, None), Err(LexiconError::EntryNotFound(_))));
    assert_eq!(engine.store().entry_ref(word).unwrap().spelling, vec![1, 1]);
}
