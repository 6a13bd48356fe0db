//! HTTP route handlers

pub mod auth;
pub mod preferences;
pub mod progress;
pub mod questions;
pub mod shop;

use chrono::{NaiveDate, Utc};

use crate::error::{ApiError, Result};
use crate::models::{Progress, ProgressPatch, UserRecord};
use crate::AppState;
use quiz_core::{local_date, Category, Level};

pub(crate) fn parse_level(s: &str) -> Result<Level> {
    Level::parse(s).ok_or_else(|| ApiError::BadRequest(format!("unknown level: {s}")))
}

pub(crate) fn parse_category(s: &str) -> Result<Category> {
    Category::parse(s).ok_or_else(|| ApiError::BadRequest(format!("unknown category: {s}")))
}

/// Today in the app's home timezone.
pub(crate) fn today() -> NaiveDate {
    local_date(Utc::now())
}

/// The session's copy of the user record; the middleware guarantees the
/// token existed moments ago, but logout can race it.
pub(crate) async fn session_record(state: &AppState, token: &str) -> Result<UserRecord> {
    state
        .sessions
        .get(token)
        .await
        .ok_or_else(|| ApiError::Unauthorized("Session expired".to_string()))
}

/// Write a progress patch to the store, then commit the new progress to the
/// session copy. Remote-first: a failed write leaves the session untouched.
pub(crate) async fn commit_progress(
    state: &AppState,
    token: &str,
    uid: &str,
    progress: &Progress,
    patch: &ProgressPatch,
) -> Result<()> {
    state.db.patch_progress(uid, patch).await?;
    let committed = progress.clone();
    state
        .sessions
        .update(token, move |record| record.progress = committed)
        .await;
    Ok(())
}
