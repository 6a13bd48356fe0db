//! Session authentication: register/login/logout and the bearer middleware

use axum::{
    body::Body,
    extract::{Request, State},
    http::header::AUTHORIZATION,
    http::StatusCode,
    middleware::Next,
    response::Response,
    Extension, Json,
};
use chrono::Utc;

use crate::error::{ApiError, Result};
use crate::models::{
    AuthResponse, LoginRequest, Preferences, Progress, ProgressPatch, RegisterRequest, UserRecord,
};
use crate::AppState;

/// Authenticated session info stored in request extensions
#[derive(Clone, Debug)]
pub struct AuthedUser {
    pub token: String,
    pub uid: String,
    pub is_admin: bool,
}

/// Auth middleware - resolves the bearer token against the session store
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization format".to_string()))?
        .to_string();

    let record = state
        .sessions
        .get(&token)
        .await
        .ok_or_else(|| ApiError::Unauthorized("Invalid session token".to_string()))?;

    request.extensions_mut().insert(AuthedUser {
        token,
        uid: record.id.clone(),
        is_admin: record.is_admin,
    });

    Ok(next.run(request).await)
}

/// POST /api/auth/register
/// Creates the account, writes the user record with fresh defaults, and
/// opens a session.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>> {
    let account = state
        .auth
        .register(&payload.email, &payload.password)
        .await?;

    let record = UserRecord {
        id: account.uid.clone(),
        full_name: payload.full_name,
        document_id: payload.document_id,
        course: payload.course,
        email: account.email,
        is_admin: false,
        preferences: Preferences::default(),
        progress: Progress::new(Utc::now()),
        question_pool: Vec::new(),
    };
    state.db.put_user(&record).await?;

    tracing::info!("registered user {}", record.id);

    let token = state.sessions.create(record.clone()).await;
    Ok(Json(AuthResponse {
        token,
        user: record,
    }))
}

/// POST /api/auth/login
/// Authenticates, loads the stored record (filling gamification defaults for
/// older records), applies any pending life regeneration, and opens a session.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let account = state.auth.login(&payload.email, &payload.password).await?;
    let now = Utc::now();

    let mut record = match state.db.get_user(&account.uid).await? {
        Some(record) => record,
        // Authenticated but never provisioned; start a minimal record.
        None => UserRecord {
            id: account.uid.clone(),
            full_name: String::new(),
            document_id: String::new(),
            course: String::new(),
            email: account.email.clone(),
            is_admin: false,
            preferences: Preferences::default(),
            progress: Progress::new(now),
            question_pool: Vec::new(),
        },
    };
    record.progress.restore(now);

    if record.progress.regenerate_lives(now) > 0 {
        state
            .db
            .patch_progress(&record.id, &ProgressPatch::lives(&record.progress))
            .await?;
    }

    let token = state.sessions.create(record.clone()).await;
    Ok(Json(AuthResponse {
        token,
        user: record,
    }))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthedUser>,
) -> Result<StatusCode> {
    state.sessions.remove(&auth.token).await;
    Ok(StatusCode::NO_CONTENT)
}
