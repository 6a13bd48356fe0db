pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::db::Database;
use crate::models::ProgressPatch;
use crate::services::auth::AuthClient;
use crate::services::generator::Generator;
use crate::session::SessionStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub auth: Arc<AuthClient>,
    pub generator: Option<Arc<Generator>>,
    pub sessions: Arc<SessionStore>,
}

/// Build the full router: public auth endpoints plus the session-protected
/// API surface.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/auth/logout", post(routes::auth::logout))
        // Question supply
        .route("/api/questions/next", get(routes::questions::next))
        .route("/api/questions/batch", get(routes::questions::batch))
        .route("/api/admin/questions", post(routes::questions::create_batch))
        // Progress ledger
        .route("/api/progress", get(routes::progress::get_progress))
        .route("/api/progress/session", post(routes::progress::record_session))
        .route(
            "/api/progress/daily-challenge",
            post(routes::progress::complete_daily_challenge),
        )
        .route("/api/progress/answer", post(routes::progress::submit_answer))
        .route("/api/progress/xp", post(routes::progress::add_xp))
        .route("/api/progress/lives", get(routes::progress::lives))
        .route("/api/progress/lives/spend", post(routes::progress::spend_life))
        // Shop
        .route("/api/shop/life", post(routes::shop::buy_life))
        .route("/api/shop/lives-max", post(routes::shop::upgrade_lives_max))
        .route(
            "/api/shop/recovery-time",
            post(routes::shop::reduce_recovery_time),
        )
        .route("/api/shop/attempts", post(routes::shop::upgrade_attempts))
        // Preferences
        .route("/api/preferences", get(routes::preferences::get_preferences))
        .route("/api/preferences", put(routes::preferences::update_preferences))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .merge(protected)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = Database::from_env()?;
    let auth = AuthClient::from_env()?;

    let generator = Generator::from_env();
    match &generator {
        Some(g) => tracing::info!("question generation enabled (model {})", g.model()),
        None => tracing::info!("OPENAI_API_KEY not set; question generation disabled"),
    }

    let state = AppState {
        db: Arc::new(db),
        auth: Arc::new(auth),
        generator: generator.map(Arc::new),
        sessions: Arc::new(SessionStore::new()),
    };

    // Lives tick over even while a client sits idle on a screen.
    tokio::spawn(lives_sweep(state.clone()));

    let app = build_router(state);

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}

/// Once a minute, regenerate lives for every live session and persist what
/// changed. A failed write skips the session copy so the next sweep retries.
async fn lives_sweep(state: AppState) {
    let mut interval = tokio::time::interval(Duration::from_secs(60));
    loop {
        interval.tick().await;
        let now = chrono::Utc::now();
        for (token, record) in state.sessions.snapshot().await {
            let mut progress = record.progress;
            if progress.regenerate_lives(now) == 0 {
                continue;
            }
            let patch = ProgressPatch::lives(&progress);
            if let Err(e) = state.db.patch_progress(&record.id, &patch).await {
                tracing::warn!("lives sweep: failed to persist for {}: {}", record.id, e);
                continue;
            }
            state
                .sessions
                .update(&token, move |r| r.progress = progress)
                .await;
        }
    }
}
