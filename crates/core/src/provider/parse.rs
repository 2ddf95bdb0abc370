//! Tolerant extraction of move proposals from provider text.
//!
//! Models wrap their JSON in prose, fences or reasoning blocks. The object is
//! located first (direct, fenced block, inline balanced braces) and then
//! validated field by field into a [`MoveCandidate`].

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

use crate::board::{Placement, Rack, WILDCARD};
use crate::text::{normalize_letter, normalize_word};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("No JSON object found in response")]
    NoJson,

    #[error("Malformed move object: {0}")]
    Schema(String),

    #[error("Placement ({row},{col}) is off the board")]
    OutOfRange { row: i64, col: i64 },

    #[error("Invalid letter {0:?}")]
    InvalidLetter(String),

    #[error("Wildcard at ({row},{col}) has no letter binding")]
    UnboundWildcard { row: usize, col: usize },

    #[error("Conflicting move: {0}")]
    Conflict(&'static str),

    #[error("A play needs at least one placement")]
    NoPlacements,
}

/// How the JSON object was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseMethod {
    Direct,
    Fenced,
    Inline,
}

/// What the provider wants to do this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveAction {
    Play,
    Pass,
    Exchange,
}

/// A provider's proposal in strict form. Never mutated after parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCandidate {
    pub action: MoveAction,
    pub placements: Vec<Placement>,
    /// Main word as claimed by the provider; advisory only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_word: Option<String>,
}

impl MoveCandidate {
    pub fn play(placements: Vec<Placement>) -> Self {
        Self {
            action: MoveAction::Play,
            placements,
            declared_word: None,
        }
    }

    pub fn is_play(&self) -> bool {
        self.action == MoveAction::Play
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCandidate {
    pub candidate: MoveCandidate,
    pub method: ParseMethod,
}

// ============================================================================
// Locating the JSON object
// ============================================================================

static THINK_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("valid regex"));

static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)```").expect("valid regex"));

fn strip_outer_fence(text: &str) -> &str {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest;
    } else if let Some(rest) = s.strip_prefix("```") {
        s = rest;
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

fn parse_object(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text)
        .ok()
        .filter(Value::is_object)
}

/// First balanced `{...}` in `text` (string-aware) that contains `required`.
fn inline_object<'a>(text: &'a str, required: Option<&str>) -> Option<&'a str> {
    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        let mut end = None;

        for (i, ch) in text[start..].char_indices() {
            if in_string {
                match ch {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match ch {
                '"' => in_string = true,
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(start + i + 1);
                        break;
                    }
                }
                _ => {}
            }
        }

        let Some(end) = end else {
            // Unbalanced opener; a later one may still close.
            search_from = start + 1;
            continue;
        };
        let candidate = &text[start..end];
        if required.map_or(true, |key| candidate.contains(key)) {
            return Some(candidate);
        }
        search_from = start + 1;
    }
    None
}

fn locate(text: &str, required: Option<&str>) -> Option<(Value, ParseMethod)> {
    let cleaned = THINK_BLOCK.replace_all(text, "");

    if let Some(value) = parse_object(strip_outer_fence(&cleaned)) {
        return Some((value, ParseMethod::Direct));
    }

    if let Some(value) = FENCED_BLOCK
        .captures_iter(&cleaned)
        .filter_map(|caps| caps.get(1))
        .find_map(|m| parse_object(m.as_str().trim()))
    {
        return Some((value, ParseMethod::Fenced));
    }

    inline_object(&cleaned, required)
        .and_then(parse_object)
        .map(|value| (value, ParseMethod::Inline))
}

/// Find the first JSON object in free-form model output.
pub fn extract_json(text: &str) -> Option<Value> {
    locate(text, None).map(|(value, _)| value)
}

// ============================================================================
// Strict validation
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawMove {
    #[serde(default)]
    placements: Vec<RawPlacement>,
    #[serde(default)]
    blanks: Option<Value>,
    #[serde(default)]
    word: Option<String>,
    #[serde(default, rename = "pass")]
    pass: Option<bool>,
    #[serde(default)]
    exchange: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawPlacement {
    row: i64,
    col: i64,
    letter: String,
}

/// Wildcard bindings in any of the accepted shapes: `{"r,c": "X"}`,
/// `{"?": "X"}`, `{"?1": "X", "?2": "Y"}`, `["X", "Y"]` or
/// `[{"row": r, "col": c, "letter": "X"}]`.
#[derive(Debug, Default)]
struct BlankBindings {
    by_cell: HashMap<(usize, usize), char>,
    ordered: Vec<char>,
    single: Option<char>,
}

impl BlankBindings {
    fn from_value(value: Option<&Value>) -> Result<Self, ParseError> {
        let mut bindings = Self::default();
        match value {
            None | Some(Value::Null) => {}
            Some(Value::Object(map)) => {
                let mut indexed: Vec<(usize, char)> = Vec::new();
                for (key, letter) in map {
                    let letter = binding_letter(letter)?;
                    let key = key.trim();
                    if key == "?" {
                        bindings.single = Some(letter);
                    } else if let Some(index) = key.strip_prefix('?') {
                        let index = index.parse::<usize>().map_err(|_| {
                            ParseError::Schema(format!("bad blanks key {:?}", key))
                        })?;
                        indexed.push((index, letter));
                    } else {
                        let cell = parse_cell_key(key)?;
                        bindings.by_cell.insert(cell, letter);
                    }
                }
                indexed.sort_by_key(|(index, _)| *index);
                bindings.ordered = indexed.into_iter().map(|(_, letter)| letter).collect();
            }
            Some(Value::Array(items)) => {
                for item in items {
                    match item {
                        Value::Object(obj) => {
                            let row = obj.get("row").and_then(Value::as_u64);
                            let col = obj.get("col").and_then(Value::as_u64);
                            let letter = obj.get("letter").or_else(|| obj.get("as"));
                            match (row, col, letter) {
                                (Some(r), Some(c), Some(l)) => {
                                    bindings
                                        .by_cell
                                        .insert((r as usize, c as usize), binding_letter(l)?);
                                }
                                _ => {
                                    return Err(ParseError::Schema(
                                        "blanks entry needs row, col and letter".to_string(),
                                    ))
                                }
                            }
                        }
                        other => bindings.ordered.push(binding_letter(other)?),
                    }
                }
            }
            Some(other) => {
                return Err(ParseError::Schema(format!(
                    "blanks must be an object or array, got {}",
                    other
                )))
            }
        }
        Ok(bindings)
    }

    /// Binding for the `ordinal`-th wildcard placement at `cell`.
    fn resolve(&self, cell: (usize, usize), ordinal: usize) -> Option<char> {
        self.by_cell
            .get(&cell)
            .copied()
            .or_else(|| self.ordered.get(ordinal).copied())
            .or(self.single)
    }

    /// Whether the provider marked `cell` as a wildcard standing for `letter`.
    fn binds(&self, cell: (usize, usize), letter: char) -> bool {
        self.by_cell.get(&cell) == Some(&letter) || self.single == Some(letter)
    }
}

fn binding_letter(value: &Value) -> Result<char, ParseError> {
    let raw = value
        .as_str()
        .ok_or_else(|| ParseError::Schema(format!("blank binding must be a string, got {}", value)))?;
    normalize_letter(raw)
        .filter(|c| c.is_alphabetic())
        .ok_or_else(|| ParseError::InvalidLetter(raw.to_string()))
}

fn parse_cell_key(key: &str) -> Result<(usize, usize), ParseError> {
    let bad = || ParseError::Schema(format!("bad blanks key {:?}", key));
    let (row, col) = key.split_once(',').ok_or_else(bad)?;
    let row = row.trim().parse::<usize>().map_err(|_| bad())?;
    let col = col.trim().parse::<usize>().map_err(|_| bad())?;
    Ok((row, col))
}

fn exchange_requested(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::String(s)) => !s.trim().is_empty(),
        _ => false,
    }
}

/// Validate a located JSON object against the board size and rack.
fn candidate_from_value(
    value: Value,
    board_size: usize,
    rack: &Rack,
) -> Result<MoveCandidate, ParseError> {
    let raw: RawMove =
        serde_json::from_value(value).map_err(|e| ParseError::Schema(e.to_string()))?;

    let pass = raw.pass.unwrap_or(false);
    let exchange = exchange_requested(raw.exchange.as_ref());
    let declared_word = raw
        .word
        .as_deref()
        .map(normalize_word)
        .filter(|w| !w.is_empty());

    if pass && exchange {
        return Err(ParseError::Conflict("pass and exchange are exclusive"));
    }
    if (pass || exchange) && !raw.placements.is_empty() {
        return Err(ParseError::Conflict("pass or exchange must not place tiles"));
    }
    if pass || exchange {
        return Ok(MoveCandidate {
            action: if pass { MoveAction::Pass } else { MoveAction::Exchange },
            placements: Vec::new(),
            declared_word,
        });
    }
    if raw.placements.is_empty() {
        return Err(ParseError::NoPlacements);
    }

    let bindings = BlankBindings::from_value(raw.blanks.as_ref())?;
    let mut remaining = rack.counts();
    let mut wildcard_ordinal = 0;
    let mut placements = Vec::with_capacity(raw.placements.len());

    for p in &raw.placements {
        let in_range = |v: i64| v >= 0 && (v as usize) < board_size;
        if !in_range(p.row) || !in_range(p.col) {
            return Err(ParseError::OutOfRange { row: p.row, col: p.col });
        }
        let (row, col) = (p.row as usize, p.col as usize);
        let letter = normalize_letter(&p.letter)
            .filter(|c| *c == WILDCARD || c.is_alphabetic())
            .ok_or_else(|| ParseError::InvalidLetter(p.letter.clone()))?;

        if letter == WILDCARD {
            let binding = bindings
                .resolve((row, col), wildcard_ordinal)
                .ok_or(ParseError::UnboundWildcard { row, col })?;
            wildcard_ordinal += 1;
            take(&mut remaining, WILDCARD);
            placements.push(Placement::wildcard(row, col, binding));
            continue;
        }

        if take(&mut remaining, letter) {
            placements.push(Placement::new(row, col, letter));
        } else if bindings.binds((row, col), letter) && take(&mut remaining, WILDCARD) {
            placements.push(Placement::wildcard(row, col, letter));
        } else {
            // Left literal; the rack check reports the shortage.
            placements.push(Placement::new(row, col, letter));
        }
    }

    Ok(MoveCandidate {
        action: MoveAction::Play,
        placements,
        declared_word,
    })
}

fn take(remaining: &mut HashMap<char, usize>, letter: char) -> bool {
    match remaining.get_mut(&letter) {
        Some(n) if *n > 0 => {
            *n -= 1;
            true
        }
        _ => false,
    }
}

/// Parse raw provider output into a strict candidate.
pub fn parse_candidate(
    text: &str,
    board_size: usize,
    rack: &Rack,
) -> Result<ParsedCandidate, ParseError> {
    let (value, method) = locate(text, Some("placements"))
        .or_else(|| locate(text, Some("pass")))
        .or_else(|| locate(text, Some("exchange")))
        .ok_or(ParseError::NoJson)?;
    let candidate = candidate_from_value(value, board_size, rack)?;
    Ok(ParsedCandidate { candidate, method })
}
