//! Preference endpoints
//!
//! Each toggle is persisted independently and restored at the next login.

use axum::{extract::State, Extension, Json};

use crate::error::{ApiError, Result};
use crate::models::{Preferences, PreferencesPatch};
use crate::routes::auth::AuthedUser;
use crate::routes::session_record;
use crate::AppState;

/// GET /api/preferences
pub async fn get_preferences(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthedUser>,
) -> Result<Json<Preferences>> {
    let record = session_record(&state, &auth.token).await?;
    Ok(Json(record.preferences))
}

/// PUT /api/preferences
/// Merge the supplied toggles into the stored preferences.
pub async fn update_preferences(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthedUser>,
    Json(patch): Json<PreferencesPatch>,
) -> Result<Json<Preferences>> {
    state.db.patch_preferences(&auth.uid, &patch).await?;
    let updated = state
        .sessions
        .update(&auth.token, |record| {
            patch.apply(&mut record.preferences);
            record.preferences.clone()
        })
        .await
        .ok_or_else(|| ApiError::Unauthorized("Session expired".to_string()))?;
    Ok(Json(updated))
}
