//! Realtime-database REST operations
//!
//! The store is a keyed hierarchical JSON tree addressed by path:
//! `GET/PUT/PATCH {base}/{path}.json`. PATCH merges at the field level and
//! never deletes unspecified keys; GET of an absent path returns the JSON
//! literal `null`.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::models::{CachedQuestion, PreferencesPatch, ProgressPatch, Question, UserRecord};
use quiz_core::{Category, Level};

/// Database wrapper over the remote store
#[derive(Clone)]
pub struct Database {
    client: Client,
    base_url: String,
    auth_secret: Option<String>,
}

impl Database {
    /// Build the client from FIREBASE_DATABASE_URL (+ optional secret).
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("FIREBASE_DATABASE_URL")
            .map_err(|_| ApiError::Internal("FIREBASE_DATABASE_URL not set".to_string()))?;
        let auth_secret = std::env::var("FIREBASE_DATABASE_SECRET").ok();

        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_secret,
        })
    }

    fn url(&self, path: &str) -> String {
        match &self.auth_secret {
            Some(secret) => format!("{}/{}.json?auth={}", self.base_url, path, secret),
            None => format!("{}/{}.json", self.base_url, path),
        }
    }

    /// Read the value at `path`; absent data comes back as `None`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| ApiError::Database(e.to_string()))?;
        let response = expect_success(response).await?;
        let value: Value = response
            .json()
            .await
            .map_err(|e| ApiError::Database(e.to_string()))?;
        if value.is_null() {
            return Ok(None);
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| ApiError::Database(format!("decode {path}: {e}")))
    }

    /// Replace the value at `path`.
    pub async fn put<T: Serialize + ?Sized>(&self, path: &str, value: &T) -> Result<()> {
        let response = self
            .client
            .put(self.url(path))
            .json(value)
            .send()
            .await
            .map_err(|e| ApiError::Database(e.to_string()))?;
        expect_success(response).await?;
        Ok(())
    }

    /// Merge-patch the map at `path`; keys not present in `value` survive.
    pub async fn patch<T: Serialize + ?Sized>(&self, path: &str, value: &T) -> Result<()> {
        let response = self
            .client
            .patch(self.url(path))
            .json(value)
            .send()
            .await
            .map_err(|e| ApiError::Database(e.to_string()))?;
        expect_success(response).await?;
        Ok(())
    }

    // === Users ===

    pub async fn get_user(&self, uid: &str) -> Result<Option<UserRecord>> {
        self.get(&format!("users/{uid}")).await
    }

    pub async fn put_user(&self, user: &UserRecord) -> Result<()> {
        self.put(&format!("users/{}", user.id), user).await
    }

    pub async fn patch_progress(&self, uid: &str, patch: &ProgressPatch) -> Result<()> {
        self.patch(&format!("users/{uid}/progress"), patch).await
    }

    pub async fn patch_preferences(&self, uid: &str, patch: &PreferencesPatch) -> Result<()> {
        self.patch(&format!("users/{uid}/preferences"), patch).await
    }

    /// Overwrite the persisted copy of a user's local question cache.
    pub async fn set_question_cache(&self, uid: &str, cache: &[CachedQuestion]) -> Result<()> {
        self.put(&format!("users/{uid}/questionPool"), cache).await
    }

    // === Question pools ===

    /// Full pool for one category/level, keyed by content hash.
    pub async fn question_pool(
        &self,
        category: Category,
        level: Level,
    ) -> Result<HashMap<String, Value>> {
        Ok(self
            .get(&pool_path(category, level))
            .await?
            .unwrap_or_default())
    }

    /// One stored question by content hash.
    pub async fn get_question(
        &self,
        category: Category,
        level: Level,
        hash: &str,
    ) -> Result<Option<Value>> {
        self.get(&format!("{}/{hash}", pool_path(category, level)))
            .await
    }

    /// Merge new questions into the pool. Additive: existing keys that are
    /// not part of `batch` are left alone.
    pub async fn upsert_questions(
        &self,
        category: Category,
        level: Level,
        batch: &HashMap<String, Question>,
    ) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        self.patch(&pool_path(category, level), batch).await
    }
}

fn pool_path(category: Category, level: Level) -> String {
    format!("questions/{}/{}", category.as_str(), level.as_str())
}

async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let preview: String = body.chars().take(200).collect();
    Err(ApiError::Database(format!("store HTTP {status}: {preview}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_paths_use_lowercase_tags() {
        assert_eq!(
            pool_path(Category::Fracciones, Level::Facil),
            "questions/fracciones/facil"
        );
        assert_eq!(
            pool_path(Category::Igualdades, Level::Dificil),
            "questions/igualdades/dificil"
        );
    }
}
