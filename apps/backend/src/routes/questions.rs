//! Question supply endpoints

use axum::{
    extract::{Query, State},
    Extension, Json,
};

use crate::error::{ApiError, Result};
use crate::models::{
    AuthorBatchRequest, AuthorBatchResponse, BatchQuery, BatchResponse, NextQuestionQuery,
    NextQuestionResponse,
};
use crate::routes::auth::AuthedUser;
use crate::routes::{parse_category, parse_level};
use crate::services::supply;
use crate::AppState;
use quiz_core::Category;

/// GET /api/questions/next
/// One question for a level/category. An empty answer is normal: it means
/// the supply ran dry.
pub async fn next(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthedUser>,
    Query(query): Query<NextQuestionQuery>,
) -> Result<Json<NextQuestionResponse>> {
    let level = parse_level(&query.level)?;
    let category = parse_category(&query.category)?;

    match supply::next_question(&state, &auth.token, level, category).await? {
        Some((question, source)) => Ok(Json(NextQuestionResponse {
            question: Some(question),
            source: Some(source),
        })),
        None => Ok(Json(NextQuestionResponse {
            question: None,
            source: None,
        })),
    }
}

/// GET /api/questions/batch
/// Balanced batch for one level, across one or several categories.
pub async fn batch(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthedUser>,
    Query(query): Query<BatchQuery>,
) -> Result<Json<BatchResponse>> {
    let level = parse_level(&query.level)?;
    let count = query.count.unwrap_or(5);

    let categories: Vec<Category> = match &query.categories {
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(parse_category)
            .collect::<Result<_>>()?,
        None => Category::all().to_vec(),
    };
    if categories.is_empty() {
        return Err(ApiError::BadRequest("no categories given".to_string()));
    }

    let questions = supply::batch_for_level(&state.db, level, count, &categories).await?;
    Ok(Json(BatchResponse { questions }))
}

/// POST /api/admin/questions
/// Author a batch through the generation service and store it. Privileged:
/// rejected for non-admins before any remote call is made.
pub async fn create_batch(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthedUser>,
    Json(payload): Json<AuthorBatchRequest>,
) -> Result<Json<AuthorBatchResponse>> {
    if !auth.is_admin {
        return Err(ApiError::Forbidden(
            "question authoring requires an admin account".to_string(),
        ));
    }
    let generator = state.generator.as_ref().ok_or_else(|| {
        ApiError::Upstream("generation service is not configured".to_string())
    })?;

    let category = parse_category(&payload.category)?;
    let level = parse_level(&payload.level)?;
    if payload.count == 0 {
        return Err(ApiError::BadRequest("count must be positive".to_string()));
    }

    let stored = supply::author_batch(&state.db, generator, category, level, payload.count).await?;
    Ok(Json(AuthorBatchResponse {
        created: stored.len(),
        questions: stored,
    }))
}
