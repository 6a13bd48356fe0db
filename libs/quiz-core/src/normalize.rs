//! Canonicalization of raw question records.
//!
//! Stored and generated records arrive in either of two field vocabularies
//! (English or Spanish) and with loosely typed values. Everything is resolved
//! here, once, through ordered synonym lists; the rest of the engine only ever
//! sees canonical [`Question`] values.

use serde_json::Value;

use crate::types::{Category, Level, MatchingQuestion, MultipleQuestion, Question};

const PROMPT_KEYS: &[&str] = &["question", "pregunta", "instructions", "instrucciones"];
const OPTION_KEYS: &[&str] = &["options", "opciones"];
const LEFT_KEYS: &[&str] = &["left", "izquierda"];
const RIGHT_KEYS: &[&str] = &["right", "derecha"];
const PAIR_KEYS: &[&str] = &["pairs", "respuestas"];
const ANSWER_KEYS: &[&str] = &["answer", "respuesta"];
const EXPLANATION_KEYS: &[&str] = &["explanation", "explicacion"];

/// Canonicalize one raw record. Pure, never fails: malformed input degrades
/// to empty strings/lists and the caller-supplied level/category defaults.
pub fn normalize(raw: &Value, fallback_level: Level, fallback_category: Category) -> Question {
    let level = raw
        .get("level")
        .and_then(Value::as_str)
        .and_then(Level::parse)
        .unwrap_or(fallback_level);
    let category = raw
        .get("category")
        .and_then(Value::as_str)
        .and_then(Category::parse)
        .unwrap_or(fallback_category);
    let explanation = pick_text(raw, EXPLANATION_KEYS);

    if is_matching(raw) {
        Question::Matching(MatchingQuestion {
            level,
            category,
            instructions: pick_text(raw, PROMPT_KEYS),
            left: pick_list(raw, LEFT_KEYS),
            right: pick_list(raw, RIGHT_KEYS),
            pairs: pick_pairs(raw, PAIR_KEYS),
            explanation,
        })
    } else {
        Question::Multiple(MultipleQuestion {
            level,
            category,
            question: pick_text(raw, PROMPT_KEYS),
            options: pick_list(raw, OPTION_KEYS),
            answer: pick_text(raw, ANSWER_KEYS),
            explanation,
        })
    }
}

/// A record is a matching question when either vocabulary says so;
/// everything else defaults to multiple choice.
fn is_matching(raw: &Value) -> bool {
    raw.get("type").and_then(Value::as_str) == Some("matching")
        || raw.get("tipo").and_then(Value::as_str) == Some("emparejamiento")
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First synonym that resolves to text; otherwise empty.
fn pick_text(raw: &Value, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|k| raw.get(*k))
        .find_map(as_text)
        .unwrap_or_default()
}

/// First synonym that is present and non-null. A present non-list value
/// coerces to an empty list rather than falling through to the next synonym.
fn pick_present<'a>(raw: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| raw.get(*k))
        .find(|v| !v.is_null())
}

fn pick_list(raw: &Value, keys: &[&str]) -> Vec<String> {
    match pick_present(raw, keys) {
        Some(Value::Array(items)) => items.iter().filter_map(as_text).collect(),
        _ => Vec::new(),
    }
}

fn pick_pairs(raw: &Value, keys: &[&str]) -> Vec<[usize; 2]> {
    match pick_present(raw, keys) {
        Some(Value::Array(items)) => items.iter().filter_map(as_pair).collect(),
        _ => Vec::new(),
    }
}

fn as_pair(value: &Value) -> Option<[usize; 2]> {
    let items = value.as_array()?;
    if items.len() < 2 {
        return None;
    }
    let l = items[0].as_u64()?;
    let r = items[1].as_u64()?;
    Some([l as usize, r as usize])
}
