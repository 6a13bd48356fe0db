//! Question supply resolution.
//!
//! A single question is served from, in order: the session's local cache,
//! a random draw from the stored pool, and — for admins only — a freshly
//! authored batch that is persisted and then drawn from. Running dry is a
//! normal outcome, not an error.

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::thread_rng;
use tracing::{info, warn};

use crate::db::Database;
use crate::error::Result;
use crate::models::{CachedQuestion, Question};
use crate::services::generator::Generator;
use crate::session::{CACHE_CAP, CACHE_LOW_WATER};
use crate::AppState;
use quiz_core::{build_batch, content_hash, normalize, Category, Level};

/// Batch size for admin-triggered last-resort generation.
const FALLBACK_BATCH_SIZE: usize = 10;

struct CachePop {
    question: Question,
    remaining: Vec<CachedQuestion>,
    preload: bool,
    uid: String,
}

/// Resolve one question for a level/category.
pub async fn next_question(
    state: &AppState,
    token: &str,
    level: Level,
    category: Category,
) -> Result<Option<(Question, &'static str)>> {
    // 1) Local cache, at-most-once consumption.
    let popped = state
        .sessions
        .update(token, |record| {
            let idx = record
                .question_pool
                .iter()
                .position(|c| c.question.level() == level && c.question.category() == category)?;
            let entry = record.question_pool.remove(idx);
            Some(CachePop {
                question: entry.question,
                remaining: record.question_pool.clone(),
                preload: record.preferences.preload_next,
                uid: record.id.clone(),
            })
        })
        .await
        .flatten();

    if let Some(pop) = popped {
        persist_cache(state, pop.uid, pop.remaining.clone());
        if pop.preload && pop.remaining.len() < CACHE_LOW_WATER {
            spawn_preload(state.clone(), token.to_string(), level, category);
        }
        return Ok(Some((pop.question, "cache")));
    }

    // 2) Random draw from the stored pool.
    let mut drawn = fetch_random(&state.db, category, level, 1).await?;
    if let Some(question) = drawn.pop() {
        return Ok(Some((question, "pool")));
    }

    // 3) Pool is empty: only an admin may author a batch, store it, and
    //    retry the draw once.
    let is_admin = state
        .sessions
        .get(token)
        .await
        .map(|record| record.is_admin)
        .unwrap_or(false);
    if is_admin {
        if let Some(generator) = &state.generator {
            let stored =
                author_batch(&state.db, generator, category, level, FALLBACK_BATCH_SIZE).await?;
            if !stored.is_empty() {
                let mut retry = fetch_random(&state.db, category, level, 1).await?;
                if let Some(question) = retry.pop() {
                    return Ok(Some((question, "generated")));
                }
            }
        }
    }

    // Nothing available anywhere; the caller reports empty stock.
    Ok(None)
}

/// Every stored question for one category/level, canonicalized.
pub async fn pool_questions(
    db: &Database,
    category: Category,
    level: Level,
) -> Result<Vec<Question>> {
    let pool = db.question_pool(category, level).await?;
    Ok(pool
        .values()
        .map(|raw| normalize(raw, level, category))
        .collect())
}

/// Random non-destructive sample from the stored pool.
pub async fn fetch_random(
    db: &Database,
    category: Category,
    level: Level,
    count: usize,
) -> Result<Vec<Question>> {
    let mut bucket = pool_questions(db, category, level).await?;
    bucket.shuffle(&mut thread_rng());
    bucket.truncate(count);
    Ok(bucket)
}

/// Balanced batch for one level across one or more categories. Entries whose
/// own tags disagree with the pool they sit in are skipped.
pub async fn batch_for_level(
    db: &Database,
    level: Level,
    count: usize,
    categories: &[Category],
) -> Result<Vec<Question>> {
    let mut bucket = Vec::new();
    for category in categories {
        let pool = db.question_pool(*category, level).await?;
        for raw in pool.values() {
            let question = normalize(raw, level, *category);
            if question.level() == level && question.category() == *category {
                bucket.push(question);
            }
        }
    }
    Ok(build_batch(bucket, count, &HashSet::new(), &mut thread_rng()))
}

/// Author a batch of `count` questions and merge them into the stored pool,
/// deduplicated against what is already there. Returns what was stored;
/// empty when the service produced nothing new.
pub async fn author_batch(
    db: &Database,
    generator: &Generator,
    category: Category,
    level: Level,
    count: usize,
) -> Result<Vec<Question>> {
    let existing: HashSet<String> = db
        .question_pool(category, level)
        .await?
        .into_keys()
        .collect();

    // Overshoot so the 50/50 balance survives dedup losses.
    let overshoot = 4usize.max((count * 2 + 4) / 5);
    let raw = generator
        .generate_batch(level, category, count + overshoot)
        .await?;
    let candidates: Vec<Question> = raw
        .iter()
        .map(|record| normalize(record, level, category))
        .collect();

    let batch = build_batch(candidates, count, &existing, &mut thread_rng());
    if batch.is_empty() {
        info!(
            "no new questions to store for {}/{} (duplicates or empty generation)",
            category.as_str(),
            level.as_str()
        );
        return Ok(Vec::new());
    }

    let keyed: HashMap<String, Question> = batch
        .into_iter()
        .map(|question| (content_hash(&question), question))
        .collect();
    db.upsert_questions(category, level, &keyed).await?;
    info!(
        "stored {} generated questions for {}/{}",
        keyed.len(),
        category.as_str(),
        level.as_str()
    );
    Ok(keyed.into_values().collect())
}

/// Append to the local cache, deduplicated by hash and trimmed to the cap
/// (oldest entries fall off first). Returns whether anything was added.
pub(crate) fn push_cached(pool: &mut Vec<CachedQuestion>, question: Question) -> bool {
    let hash = content_hash(&question);
    if pool.iter().any(|entry| entry.hash == hash) {
        return false;
    }
    pool.push(CachedQuestion { hash, question });
    if pool.len() > CACHE_CAP {
        let excess = pool.len() - CACHE_CAP;
        pool.drain(..excess);
    }
    true
}

/// Persist the cache copy in the background; failure is logged, never
/// surfaced — the in-memory cache stays authoritative for the session.
fn persist_cache(state: &AppState, uid: String, cache: Vec<CachedQuestion>) {
    let db = state.db.clone();
    tokio::spawn(async move {
        if let Err(e) = db.set_question_cache(&uid, &cache).await {
            warn!("failed to persist question cache for {uid}: {e}");
        }
    });
}

/// Pull one more question from the pool into the cache without blocking the
/// request that noticed the cache running low.
fn spawn_preload(state: AppState, token: String, level: Level, category: Category) {
    tokio::spawn(async move {
        let fetched = match fetch_random(&state.db, category, level, 1).await {
            Ok(mut list) => list.pop(),
            Err(e) => {
                warn!(
                    "cache preload failed for {}/{}: {e}",
                    category.as_str(),
                    level.as_str()
                );
                None
            }
        };
        let Some(question) = fetched else {
            return;
        };
        let updated = state
            .sessions
            .update(&token, |record| {
                if push_cached(&mut record.question_pool, question) {
                    Some((record.id.clone(), record.question_pool.clone()))
                } else {
                    None
                }
            })
            .await
            .flatten();
        if let Some((uid, cache)) = updated {
            if let Err(e) = state.db.set_question_cache(&uid, &cache).await {
                warn!("failed to persist question cache for {uid}: {e}");
            }
        }
    });
}
