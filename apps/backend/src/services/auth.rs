//! Identity service client (email/password accounts).
//!
//! Thin REST wrapper over the Firebase-style identity endpoints; the engine
//! never validates credentials itself.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("auth service error: {0}")]
    Service(String),
    #[error("auth transport error: {0}")]
    Transport(String),
}

/// Identity of an authenticated account.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
}

/// Identity service client.
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AuthClient {
    /// Build the client from FIREBASE_API_KEY (+ optional FIREBASE_AUTH_URL
    /// override for tests).
    pub fn from_env() -> Result<Self, AuthError> {
        let api_key = std::env::var("FIREBASE_API_KEY")
            .map_err(|_| AuthError::Config("FIREBASE_API_KEY not set".to_string()))?;
        let base_url = std::env::var("FIREBASE_AUTH_URL")
            .unwrap_or_else(|_| "https://identitytoolkit.googleapis.com/v1".to_string());

        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AuthError::Config(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        self.call("accounts:signInWithPassword", email, password)
            .await
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        self.call("accounts:signUp", email, password).await
    }

    async fn call(&self, method: &str, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        #[derive(Serialize)]
        struct Request<'a> {
            email: &'a str,
            password: &'a str,
            #[serde(rename = "returnSecureToken")]
            return_secure_token: bool,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Response {
            local_id: String,
            #[serde(default)]
            email: String,
        }

        let url = format!("{}/{}?key={}", self.base_url, method, self.api_key);
        let response = self
            .client
            .post(&url)
            .json(&Request {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = extract_error_message(&body).unwrap_or(body);
            if is_credentials_error(&message) {
                return Err(AuthError::InvalidCredentials);
            }
            return Err(AuthError::Service(format!("HTTP {status}: {message}")));
        }

        let parsed: Response = response
            .json()
            .await
            .map_err(|e| AuthError::Service(e.to_string()))?;
        Ok(AuthUser {
            uid: parsed.local_id,
            email: parsed.email,
        })
    }
}

/// Identity errors come back as `{"error": {"message": "CODE"}}`.
fn extract_error_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct Wrap {
        error: Inner,
    }
    #[derive(Deserialize)]
    struct Inner {
        message: String,
    }
    serde_json::from_str::<Wrap>(body)
        .ok()
        .map(|w| w.error.message)
}

fn is_credentials_error(message: &str) -> bool {
    const CODES: &[&str] = &[
        "INVALID_LOGIN_CREDENTIALS",
        "EMAIL_NOT_FOUND",
        "INVALID_PASSWORD",
        "INVALID_EMAIL",
    ];
    CODES.iter().any(|code| message.starts_with(code))
}
