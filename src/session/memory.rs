use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use super::{SessionStore, generate_session_id};
use crate::error::AppError;

struct Entry {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Process-local session store. Sessions do not survive a restart.
pub struct MemorySessionStore {
    ttl: Duration,
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemorySessionStore {
    pub fn new(ttl_seconds: i64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_seconds),
            entries: RwLock::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, token: String) -> Result<String, AppError> {
        let now = Utc::now();
        let session_id = generate_session_id();

        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            session_id.clone(),
            Entry {
                token,
                expires_at: now + self.ttl,
            },
        );

        Ok(session_id)
    }

    async fn load(&self, session_id: &str) -> Result<Option<String>, AppError> {
        let now = Utc::now();
        {
            let entries = self.entries.read().await;
            match entries.get(session_id) {
                None => return Ok(None),
                Some(entry) if entry.expires_at > now => return Ok(Some(entry.token.clone())),
                Some(_) => {}
            }
        }

        // Expired: evict lazily.
        self.entries.write().await.remove(session_id);
        Ok(None)
    }

    async fn destroy(&self, session_id: &str) -> Result<(), AppError> {
        self.entries.write().await.remove(session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_load_destroy() {
        let store = MemorySessionStore::new(60);
        let id = store.create("token-a".to_string()).await.unwrap();

        assert_eq!(store.load(&id).await.unwrap().as_deref(), Some("token-a"));

        store.destroy(&id).await.unwrap();
        assert_eq!(store.load(&id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn unknown_id_is_absent() {
        let store = MemorySessionStore::new(60);
        assert_eq!(store.load("nope").await.unwrap(), None);
        store.destroy("nope").await.unwrap();
    }

    #[tokio::test]
    async fn expired_sessions_are_evicted() {
        let store = MemorySessionStore::new(0);
        let id = store.create("token".to_string()).await.unwrap();

        assert_eq!(store.load(&id).await.unwrap(), None);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn sessions_are_independent() {
        let store = MemorySessionStore::new(60);
        let a = store.create("a".to_string()).await.unwrap();
        let b = store.create("b".to_string()).await.unwrap();
        assert_ne!(a, b);

        store.destroy(&a).await.unwrap();
        assert_eq!(store.load(&b).await.unwrap().as_deref(), Some("b"));
    }
}
