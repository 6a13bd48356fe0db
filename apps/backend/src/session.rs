//! In-memory session registry.
//!
//! One entry per logged-in client, keyed by an opaque bearer token. The
//! session copy of the user record is the source of truth for the current
//! session; remote persistence happens through the routes that mutate it.

use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::UserRecord;

/// Most entries the local question cache may hold.
pub const CACHE_CAP: usize = 60;
/// Below this the cache is refilled in the background when preload is on.
pub const CACHE_LOW_WATER: usize = 8;

/// Session registry
#[derive(Default)]
pub struct SessionStore {
    inner: RwLock<HashMap<String, UserRecord>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session and hand back its bearer token.
    pub async fn create(&self, record: UserRecord) -> String {
        let token = Uuid::new_v4().to_string();
        self.inner.write().await.insert(token.clone(), record);
        token
    }

    pub async fn get(&self, token: &str) -> Option<UserRecord> {
        self.inner.read().await.get(token).cloned()
    }

    pub async fn remove(&self, token: &str) -> Option<UserRecord> {
        self.inner.write().await.remove(token)
    }

    /// Run a closure against the live record for `token`.
    pub async fn update<T>(&self, token: &str, f: impl FnOnce(&mut UserRecord) -> T) -> Option<T> {
        let mut guard = self.inner.write().await;
        guard.get_mut(token).map(f)
    }

    /// Snapshot of every live session, for the periodic lives sweep.
    pub async fn snapshot(&self) -> Vec<(String, UserRecord)> {
        self.inner
            .read()
            .await
            .iter()
            .map(|(token, record)| (token.clone(), record.clone()))
            .collect()
    }
}
