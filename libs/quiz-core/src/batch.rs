//! Batch balancing and deduplication.
//!
//! One implementation serves every call site: persisting freshly generated
//! questions, assembling a practice batch from a stored pool, and building the
//! mixed batch for the timed challenge.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::hash::content_hash;
use crate::types::{Question, QuestionKind};

/// Select up to `count` questions from `candidates`, split as close to 50/50
/// between the two question kinds as supply allows.
///
/// Candidates whose content hash is in `existing` — or repeats within the
/// call — are rejected before they count toward either quota. When one kind
/// runs short the remainder is backfilled from the other; when everything
/// runs short the result is simply smaller than `count`. The output order is
/// shuffled so the balance is not observable by position.
pub fn build_batch<R: Rng + ?Sized>(
    candidates: Vec<Question>,
    count: usize,
    existing: &HashSet<String>,
    rng: &mut R,
) -> Vec<Question> {
    let want_multiple = count / 2;
    let want_matching = count - want_multiple;

    let mut seen = HashSet::new();
    let mut multiples = Vec::new();
    let mut matchings = Vec::new();
    for question in candidates {
        let hash = content_hash(&question);
        if existing.contains(&hash) || !seen.insert(hash) {
            continue;
        }
        match question.kind() {
            QuestionKind::Multiple => multiples.push(question),
            QuestionKind::Matching => matchings.push(question),
        }
    }
    multiples.shuffle(rng);
    matchings.shuffle(rng);

    let take_multiple = want_multiple.min(multiples.len());
    let take_matching = want_matching.min(matchings.len());
    let mut leftovers = multiples.split_off(take_multiple);
    leftovers.extend(matchings.split_off(take_matching));

    let mut batch = multiples;
    batch.append(&mut matchings);

    let deficit = count.saturating_sub(batch.len());
    batch.extend(leftovers.into_iter().take(deficit));

    batch.shuffle(rng);
    batch.truncate(count);
    batch
}
