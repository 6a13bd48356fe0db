//! XP shop endpoints
//!
//! Every purchase validates against the session ledger first; a rejection
//! (insufficient XP, bound reached) mutates nothing and maps to 409.

use axum::{extract::State, Extension, Json};

use crate::error::Result;
use crate::models::{ProgressPatch, PurchaseResponse};
use crate::routes::auth::AuthedUser;
use crate::routes::{commit_progress, session_record};
use crate::AppState;

/// POST /api/shop/life
pub async fn buy_life(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthedUser>,
) -> Result<Json<PurchaseResponse>> {
    let record = session_record(&state, &auth.token).await?;
    let mut progress = record.progress;
    progress.buy_life()?;
    let patch = ProgressPatch {
        xp: Some(progress.xp),
        lives: Some(progress.lives),
        ..ProgressPatch::default()
    };
    commit_progress(&state, &auth.token, &auth.uid, &progress, &patch).await?;
    Ok(Json(PurchaseResponse { progress }))
}

/// POST /api/shop/lives-max
pub async fn upgrade_lives_max(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthedUser>,
) -> Result<Json<PurchaseResponse>> {
    let record = session_record(&state, &auth.token).await?;
    let mut progress = record.progress;
    progress.upgrade_lives_max()?;
    let patch = ProgressPatch {
        xp: Some(progress.xp),
        lives_max: Some(progress.lives_max),
        ..ProgressPatch::default()
    };
    commit_progress(&state, &auth.token, &auth.uid, &progress, &patch).await?;
    Ok(Json(PurchaseResponse { progress }))
}

/// POST /api/shop/recovery-time
pub async fn reduce_recovery_time(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthedUser>,
) -> Result<Json<PurchaseResponse>> {
    let record = session_record(&state, &auth.token).await?;
    let mut progress = record.progress;
    progress.reduce_recovery_time()?;
    let patch = ProgressPatch {
        xp: Some(progress.xp),
        life_recovery_minutes: Some(progress.life_recovery_minutes),
        ..ProgressPatch::default()
    };
    commit_progress(&state, &auth.token, &auth.uid, &progress, &patch).await?;
    Ok(Json(PurchaseResponse { progress }))
}

/// POST /api/shop/attempts
pub async fn upgrade_attempts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthedUser>,
) -> Result<Json<PurchaseResponse>> {
    let record = session_record(&state, &auth.token).await?;
    let mut progress = record.progress;
    progress.upgrade_attempts()?;
    let patch = ProgressPatch {
        xp: Some(progress.xp),
        max_attempts_per_question: Some(progress.max_attempts_per_question),
        ..ProgressPatch::default()
    };
    commit_progress(&state, &auth.token, &auth.uid, &progress, &patch).await?;
    Ok(Json(PurchaseResponse { progress }))
}
