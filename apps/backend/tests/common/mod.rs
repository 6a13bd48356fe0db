//! Common test utilities and fixtures for integration tests.
//!
//! Two flavors of context:
//! - `TestContext::new_offline()` wires the router against unreachable
//!   collaborator endpoints. Tests built on it may only exercise paths that
//!   never leave the process (session middleware, admin gate, cache hits,
//!   no-op ledger operations).
//! - `TestContext::new().await` expects real FIREBASE_* env vars and is used
//!   by the `#[ignore = "requires firebase"]` flows.

#![allow(dead_code)]

pub mod fixtures;

use std::sync::Arc;

use axum::Router;

use matemico_backend::db::Database;
use matemico_backend::models::UserRecord;
use matemico_backend::services::auth::AuthClient;
use matemico_backend::session::SessionStore;
use matemico_backend::{build_router, AppState};

pub struct TestContext {
    pub state: AppState,
    app: Router,
}

impl TestContext {
    /// Offline context with dummy collaborator endpoints.
    pub fn new_offline() -> Self {
        std::env::set_var("FIREBASE_DATABASE_URL", "http://127.0.0.1:9/store");
        std::env::set_var("FIREBASE_API_KEY", "test-key");
        std::env::set_var("FIREBASE_AUTH_URL", "http://127.0.0.1:9/auth");
        Self::build()
    }

    /// Live context against the real collaborators.
    ///
    /// # Panics
    /// Panics if FIREBASE_DATABASE_URL / FIREBASE_API_KEY are not set.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();
        std::env::var("FIREBASE_DATABASE_URL")
            .expect("FIREBASE_DATABASE_URL must be set for integration tests");
        Self::build()
    }

    fn build() -> Self {
        let db = Database::from_env().expect("failed to build store client");
        let auth = AuthClient::from_env().expect("failed to build auth client");

        let state = AppState {
            db: Arc::new(db),
            auth: Arc::new(auth),
            generator: None,
            sessions: Arc::new(SessionStore::new()),
        };
        let app = build_router(state.clone());

        Self { state, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Open a session directly in the store and return its bearer token.
    pub async fn create_session(&self, record: UserRecord) -> String {
        self.state.sessions.create(record).await
    }

    /// Format authorization header value.
    pub fn auth_header_value(token: &str) -> String {
        format!("Bearer {}", token)
    }
}
