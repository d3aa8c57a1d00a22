// File: src/protocol.rs
//! Line protocol spoken by the `conscript_engine` binary: one command per
//! line in, one JSON response per line out.

use crate::core::engine::{ConscriptEngine, SpellingMode};
use crate::core::types::{AncestorLink, EntryId, RelationKind, SymbolId};
use crate::error::{LexiconError, Result};
use serde::Serialize;
use serde_json::{json, Value};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Resolve(String),
    ResolveFallback(String),
    Preview(String),
    PreviewFallback(String),
    AddSymbol(Vec<String>),
    MapSound { symbol_id: SymbolId, sound: String, usable: bool },
    AddEntry { headword: String, pronunciation: Option<String> },
    SetPronunciation { entry_id: EntryId, pronunciation: Option<String> },
    DeleteEntry(EntryId),
    ApplySpelling { entry_id: EntryId, mode: SpellingMode },
    AddAncestor { child: EntryId, ancestor: EntryId, relation: RelationKind },
    RemoveAncestor { child: EntryId, ancestor: EntryId },
    SetAncestry { child: EntryId, links: Vec<AncestorLink> },
    WouldCycle { child: EntryId, ancestor: EntryId },
    Tree { root: EntryId, max_depth: Option<usize> },
    Ancestors { root: EntryId, max_depth: Option<usize> },
    Descendants { root: EntryId, max_depth: Option<usize> },
    Save,
    Exit,
}

fn malformed(msg: impl Into<String>) -> LexiconError {
    LexiconError::Protocol(msg.into())
}

fn parse_num<T: FromStr>(word: Option<&str>, what: &str) -> Result<T> {
    let word = word.ok_or_else(|| malformed(format!("missing {what}")))?;
    word.parse().map_err(|_| malformed(format!("invalid {what}: {word}")))
}

fn parse_opt_num<T: FromStr>(word: Option<&str>, what: &str) -> Result<Option<T>> {
    word.map(|w| parse_num(Some(w), what)).transpose()
}

fn parse_relation(word: Option<&str>) -> Result<RelationKind> {
    match word {
        None => Ok(RelationKind::default()),
        Some(w) => RelationKind::parse(w)
            .ok_or_else(|| malformed(format!("unknown relation kind: {w}"))),
    }
}

/// `<id>` or `<id>:<kind>`.
fn parse_link(word: &str) -> Result<AncestorLink> {
    let (id, kind) = match word.split_once(':') {
        Some((id, kind)) => (id, Some(kind)),
        None => (word, None),
    };
    Ok(AncestorLink {
        ancestor_id: parse_num(Some(id), "ancestor id")?,
        relation: parse_relation(kind)?,
    })
}

fn rest_required(rest: &str, what: &str) -> Result<String> {
    let rest = rest.trim();
    if rest.is_empty() {
        return Err(malformed(format!("missing {what}")));
    }
    Ok(rest.to_string())
}

impl FromStr for Command {
    type Err = LexiconError;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let mut words = rest.split_whitespace();

        let command = match name.to_ascii_uppercase().as_str() {
            // Pronunciations run to the end of the line; inner spaces count.
            "RESOLVE" => Command::Resolve(rest.trim().to_string()),
            "RESOLVE_FALLBACK" => Command::ResolveFallback(rest.trim().to_string()),
            "PREVIEW" => Command::Preview(rest.trim().to_string()),
            "PREVIEW_FALLBACK" => Command::PreviewFallback(rest.trim().to_string()),
            "ADD_SYMBOL" => Command::AddSymbol(words.map(str::to_string).collect()),
            "MAP_SOUND" => {
                let symbol_id = parse_num(words.next(), "symbol id")?;
                let sound = rest_required(words.next().unwrap_or(""), "sound")?;
                let usable =
                    !matches!(words.next(), Some(flag) if flag.eq_ignore_ascii_case("noauto"));
                Command::MapSound { symbol_id, sound, usable }
            }
            "ADD_ENTRY" => {
                let headword = rest_required(words.next().unwrap_or(""), "headword")?;
                let pronunciation: Vec<&str> = words.collect();
                let pronunciation = (!pronunciation.is_empty()).then(|| pronunciation.join(" "));
                Command::AddEntry { headword, pronunciation }
            }
            "SET_PRONUNCIATION" => {
                let entry_id = parse_num(words.next(), "entry id")?;
                let pronunciation: Vec<&str> = words.collect();
                let pronunciation = (!pronunciation.is_empty()).then(|| pronunciation.join(" "));
                Command::SetPronunciation { entry_id, pronunciation }
            }
            "DELETE_ENTRY" => Command::DeleteEntry(parse_num(words.next(), "entry id")?),
            "APPLY_SPELLING" => {
                let entry_id = parse_num(words.next(), "entry id")?;
                let mode = match words.next().map(str::to_ascii_lowercase).as_deref() {
                    None | Some("strict") => SpellingMode::Strict,
                    Some("fallback") => SpellingMode::Fallback,
                    Some(other) => return Err(malformed(format!("unknown spelling mode: {other}"))),
                };
                Command::ApplySpelling { entry_id, mode }
            }
            "ADD_ANCESTOR" => Command::AddAncestor {
                child: parse_num(words.next(), "child id")?,
                ancestor: parse_num(words.next(), "ancestor id")?,
                relation: parse_relation(words.next())?,
            },
            "REMOVE_ANCESTOR" => Command::RemoveAncestor {
                child: parse_num(words.next(), "child id")?,
                ancestor: parse_num(words.next(), "ancestor id")?,
            },
            "SET_ANCESTRY" => Command::SetAncestry {
                child: parse_num(words.next(), "child id")?,
                links: words.map(parse_link).collect::<Result<_>>()?,
            },
            "WOULD_CYCLE" => Command::WouldCycle {
                child: parse_num(words.next(), "child id")?,
                ancestor: parse_num(words.next(), "ancestor id")?,
            },
            "TREE" => Command::Tree {
                root: parse_num(words.next(), "entry id")?,
                max_depth: parse_opt_num(words.next(), "depth")?,
            },
            "ANCESTORS" => Command::Ancestors {
                root: parse_num(words.next(), "entry id")?,
                max_depth: parse_opt_num(words.next(), "depth")?,
            },
            "DESCENDANTS" => Command::Descendants {
                root: parse_num(words.next(), "entry id")?,
                max_depth: parse_opt_num(words.next(), "depth")?,
            },
            "SAVE" => Command::Save,
            "EXIT" => Command::Exit,
            "" => return Err(malformed("empty command")),
            other => return Err(malformed(format!("unknown command: {other}"))),
        };
        Ok(command)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ok(data: impl Serialize) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => Self { ok: true, data: Some(data), error: None },
            Err(err) => Self::failure(&LexiconError::from(err)),
        }
    }

    pub fn failure(err: &LexiconError) -> Self {
        Self { ok: false, data: None, error: Some(err.to_string()) }
    }

    pub fn to_line(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"ok":false,"error":"unserializable response"}"#.to_string())
    }
}

impl From<Result<Value>> for Response {
    fn from(result: Result<Value>) -> Self {
        match result {
            Ok(data) => Response::ok(data),
            Err(err) => Response::failure(&err),
        }
    }
}

/// Runs one command against the engine. `Exit` is answered but acting on it
/// is the caller's business.
pub fn execute(engine: &mut ConscriptEngine, command: Command) -> Response {
    run(engine, command).into()
}

fn run(engine: &mut ConscriptEngine, command: Command) -> Result<Value> {
    let value = match command {
        Command::Resolve(p) => serde_json::to_value(engine.resolve_spelling(&p))?,
        Command::ResolveFallback(p) => {
            serde_json::to_value(engine.resolve_spelling_with_fallback(&p))?
        }
        Command::Preview(p) => serde_json::to_value(engine.preview_spelling(&p))?,
        Command::PreviewFallback(p) => {
            serde_json::to_value(engine.preview_spelling_with_fallback(&p))?
        }
        Command::AddSymbol(units) => {
            let symbol_id = engine.store_mut().add_symbol(units)?;
            json!({ "symbolId": symbol_id })
        }
        Command::MapSound { symbol_id, sound, usable } => {
            engine.store_mut().add_sound_mapping(symbol_id, &sound, usable)?;
            json!({ "symbolId": symbol_id, "sound": sound, "usableForAutoSpelling": usable })
        }
        Command::AddEntry { headword, pronunciation } => {
            json!({ "entryId": engine.store_mut().add_entry(&headword, pronunciation.as_deref()) })
        }
        Command::SetPronunciation { entry_id, pronunciation } => {
            engine.store_mut().set_pronunciation(entry_id, pronunciation.as_deref())?;
            json!({ "entryId": entry_id, "pronunciation": pronunciation })
        }
        Command::DeleteEntry(id) => serde_json::to_value(engine.delete_entry(id)?)?,
        Command::ApplySpelling { entry_id, mode } => {
            serde_json::to_value(engine.apply_spelling(entry_id, mode)?)?
        }
        Command::AddAncestor { child, ancestor, relation } => {
            serde_json::to_value(engine.add_ancestor(child, ancestor, relation)?)?
        }
        Command::RemoveAncestor { child, ancestor } => {
            json!({ "removed": engine.remove_ancestor(child, ancestor) })
        }
        Command::SetAncestry { child, links } => {
            serde_json::to_value(engine.set_ancestry(child, &links)?)?
        }
        Command::WouldCycle { child, ancestor } => {
            json!({ "wouldCreateCycle": engine.would_create_cycle(child, ancestor) })
        }
        Command::Tree { root, max_depth } => {
            serde_json::to_value(engine.full_ancestry_tree(root, max_depth)?)?
        }
        Command::Ancestors { root, max_depth } => {
            serde_json::to_value(engine.all_ancestor_ids(root, max_depth)?)?
        }
        Command::Descendants { root, max_depth } => {
            serde_json::to_value(engine.all_descendant_ids(root, max_depth)?)?
        }
        Command::Save => {
            engine.save()?;
            json!({ "saved": engine.store_path().map(|p| p.display().to_string()) })
        }
        Command::Exit => json!({ "bye": true }),
    };
    Ok(value)
}
