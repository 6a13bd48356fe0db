//! Content hashing for deduplication and storage keys.
//!
//! The hash is a deterministic fingerprint of a question's semantic fields,
//! not a cryptographic digest; collisions are tolerated. Two questions with
//! the same hash are treated as the same question.

use serde::Serialize;

use crate::types::Question;

/// Fixed-shape projection of the fields that define a question's identity.
#[derive(Serialize)]
struct Projection<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    cat: &'a str,
    lev: &'a str,
    q: &'a str,
    a: AnswerRepr<'a>,
    o: ChoicesRepr<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum AnswerRepr<'a> {
    Text(&'a str),
    Pairs(&'a [[usize; 2]]),
}

#[derive(Serialize)]
#[serde(untagged)]
enum ChoicesRepr<'a> {
    Options(&'a [String]),
    Sides { l: &'a [String], r: &'a [String] },
}

/// Deterministic fingerprint of a question's semantic content, rendered as a
/// decimal string so it can double as a storage key.
pub fn content_hash(question: &Question) -> String {
    let projection = match question {
        Question::Multiple(q) => Projection {
            kind: "multiple",
            cat: q.category.as_str(),
            lev: q.level.as_str(),
            q: &q.question,
            a: AnswerRepr::Text(&q.answer),
            o: ChoicesRepr::Options(&q.options),
        },
        Question::Matching(q) => Projection {
            kind: "matching",
            cat: q.category.as_str(),
            lev: q.level.as_str(),
            q: &q.instructions,
            a: AnswerRepr::Pairs(&q.pairs),
            o: ChoicesRepr::Sides {
                l: &q.left,
                r: &q.right,
            },
        },
    };
    let canonical = serde_json::to_string(&projection).unwrap_or_default();
    rolling31(&canonical).to_string()
}

/// Multiply-by-31 rolling hash over UTF-16 code units, wrapping at i32 width.
fn rolling31(s: &str) -> i32 {
    let mut h: i32 = 0;
    for unit in s.encode_utf16() {
        h = h.wrapping_mul(31).wrapping_add(i32::from(unit));
    }
    h
}
