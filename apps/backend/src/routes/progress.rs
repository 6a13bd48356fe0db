//! Progress ledger endpoints: streaks, counters, XP, and lives

use axum::{extract::State, Extension, Json};
use chrono::Utc;

use crate::error::{ApiError, Result};
use crate::models::{
    AnswerRequest, AnswerResponse, DailyChallengeResponse, LivesResponse, ProgressPatch,
    ProgressResponse, Question, SpendLifeResponse, SubmittedAnswer, XpRequest,
};
use crate::routes::auth::AuthedUser;
use crate::routes::{commit_progress, parse_category, parse_level, session_record, today};
use crate::AppState;
use quiz_core::normalize;

/// XP earned per correct answer.
const XP_PER_CORRECT: u64 = 10;
/// Extra XP per correct answer while a streak is running.
const XP_STREAK_BONUS: u64 = 5;

/// GET /api/progress
/// Full ledger, after opportunistic life regeneration.
pub async fn get_progress(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthedUser>,
) -> Result<Json<ProgressResponse>> {
    let record = session_record(&state, &auth.token).await?;
    let mut progress = record.progress;
    if progress.regenerate_lives(Utc::now()) > 0 {
        commit_progress(
            &state,
            &auth.token,
            &auth.uid,
            &progress,
            &ProgressPatch::lives(&progress),
        )
        .await?;
    }
    Ok(Json(ProgressResponse { progress }))
}

/// POST /api/progress/session
/// Advance the daily streak for today's session.
pub async fn record_session(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthedUser>,
) -> Result<Json<ProgressResponse>> {
    let record = session_record(&state, &auth.token).await?;
    let mut progress = record.progress;
    let today = today();
    if progress.last_session_date != Some(today) {
        progress.record_session(today);
        commit_progress(
            &state,
            &auth.token,
            &auth.uid,
            &progress,
            &ProgressPatch::streak(&progress),
        )
        .await?;
    }
    Ok(Json(ProgressResponse { progress }))
}

/// POST /api/progress/daily-challenge
/// Idempotent per calendar day.
pub async fn complete_daily_challenge(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthedUser>,
) -> Result<Json<DailyChallengeResponse>> {
    let record = session_record(&state, &auth.token).await?;
    let mut progress = record.progress;
    let newly_completed = progress.complete_daily_challenge(today());
    if newly_completed {
        let patch = ProgressPatch {
            daily_challenge_completed_date: progress.daily_challenge_completed_date,
            ..ProgressPatch::streak(&progress)
        };
        commit_progress(&state, &auth.token, &auth.uid, &progress, &patch).await?;
    }
    Ok(Json(DailyChallengeResponse {
        newly_completed,
        progress,
    }))
}

/// POST /api/progress/answer
/// Check an answer against the stored question, update the counters, and
/// award XP for a correct one.
pub async fn submit_answer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthedUser>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>> {
    let level = parse_level(&payload.level)?;
    let category = parse_category(&payload.category)?;

    let raw = state
        .db
        .get_question(category, level, &payload.hash)
        .await?
        .ok_or_else(|| ApiError::NotFound("Question not found".to_string()))?;
    let question = normalize(&raw, level, category);

    let correct = match (&question, &payload.answer) {
        (Question::Multiple(q), SubmittedAnswer::Choice(choice)) => q.is_correct(choice),
        (Question::Matching(q), SubmittedAnswer::Pairs(pairs)) => q.is_correct(pairs),
        _ => {
            return Err(ApiError::BadRequest(
                "answer shape does not match the question type".to_string(),
            ))
        }
    };

    let record = session_record(&state, &auth.token).await?;
    let mut progress = record.progress;
    let xp_awarded = if correct {
        progress.record_correct();
        let bonus = if progress.current_streak > 0 {
            XP_STREAK_BONUS
        } else {
            0
        };
        let awarded = XP_PER_CORRECT + bonus;
        progress.add_xp(awarded);
        let patch = ProgressPatch {
            total_correct: Some(progress.total_correct),
            ..ProgressPatch::xp(&progress)
        };
        commit_progress(&state, &auth.token, &auth.uid, &progress, &patch).await?;
        awarded
    } else {
        progress.record_wrong();
        let patch = ProgressPatch {
            total_wrong: Some(progress.total_wrong),
            ..ProgressPatch::default()
        };
        commit_progress(&state, &auth.token, &auth.uid, &progress, &patch).await?;
        0
    };

    Ok(Json(AnswerResponse {
        correct,
        xp_awarded,
        explanation: question.explanation().to_string(),
        progress,
    }))
}

/// POST /api/progress/xp
/// Direct XP award (timed-challenge rewards and the like).
pub async fn add_xp(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthedUser>,
    Json(payload): Json<XpRequest>,
) -> Result<Json<ProgressResponse>> {
    let record = session_record(&state, &auth.token).await?;
    let mut progress = record.progress;
    progress.add_xp(payload.amount);
    commit_progress(
        &state,
        &auth.token,
        &auth.uid,
        &progress,
        &ProgressPatch::xp(&progress),
    )
    .await?;
    Ok(Json(ProgressResponse { progress }))
}

/// GET /api/progress/lives
/// Current lives and countdown to the next one, after regeneration.
pub async fn lives(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthedUser>,
) -> Result<Json<LivesResponse>> {
    let record = session_record(&state, &auth.token).await?;
    let mut progress = record.progress;
    let now = Utc::now();
    if progress.regenerate_lives(now) > 0 {
        commit_progress(
            &state,
            &auth.token,
            &auth.uid,
            &progress,
            &ProgressPatch::lives(&progress),
        )
        .await?;
    }
    Ok(Json(LivesResponse {
        lives: progress.lives,
        lives_max: progress.lives_max,
        time_to_next_life_ms: progress.time_to_next_life_ms(now),
    }))
}

/// POST /api/progress/lives/spend
/// Spending at zero is a `spent: false` response, not an error.
pub async fn spend_life(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthedUser>,
) -> Result<Json<SpendLifeResponse>> {
    let record = session_record(&state, &auth.token).await?;
    let mut progress = record.progress;
    let now = Utc::now();

    // Pick up anything recovered since the last check before gating.
    if progress.regenerate_lives(now) > 0 {
        commit_progress(
            &state,
            &auth.token,
            &auth.uid,
            &progress,
            &ProgressPatch::lives(&progress),
        )
        .await?;
    }

    let spent = progress.spend_life(now);
    if spent {
        commit_progress(
            &state,
            &auth.token,
            &auth.uid,
            &progress,
            &ProgressPatch::lives(&progress),
        )
        .await?;
    }
    Ok(Json(SpendLifeResponse {
        spent,
        lives: progress.lives,
        time_to_next_life_ms: progress.time_to_next_life_ms(now),
    }))
}
