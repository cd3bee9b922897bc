//! In-Memory Session Store Adapter
//!
//! Stores session records in memory with TTL bookkeeping. Useful for
//! testing, development, and as the degraded-mode store when the real
//! backend is unreachable.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::domain::foundation::{Timestamp, UserId};
use crate::ports::{RecordKind, SessionStore, SessionStoreError};

#[derive(Debug, Clone)]
struct StoredRecord {
    payload: serde_json::Value,
    expires_at: Option<Timestamp>,
}

impl StoredRecord {
    fn is_expired(&self, now: &Timestamp) -> bool {
        self.expires_at
            .as_ref()
            .map(|at| now.is_after(at))
            .unwrap_or(false)
    }
}

/// In-memory session store with per-record TTL.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    records: Arc<RwLock<HashMap<(UserId, RecordKind), StoredRecord>>>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every record (useful for tests).
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }

    /// Number of live (unexpired) records.
    pub async fn len(&self) -> usize {
        let now = Timestamp::now();
        self.records
            .read()
            .await
            .values()
            .filter(|r| !r.is_expired(&now))
            .count()
    }

    /// True when no live records remain.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(
        &self,
        user: &UserId,
        kind: RecordKind,
    ) -> Result<Option<serde_json::Value>, SessionStoreError> {
        let key = (user.clone(), kind);
        let now = Timestamp::now();

        {
            let records = self.records.read().await;
            match records.get(&key) {
                None => return Ok(None),
                Some(record) if !record.is_expired(&now) => {
                    return Ok(Some(record.payload.clone()))
                }
                Some(_) => {}
            }
        }

        // Expired: drop it on the way out.
        self.records.write().await.remove(&key);
        Ok(None)
    }

    async fn put(
        &self,
        user: &UserId,
        kind: RecordKind,
        payload: serde_json::Value,
        ttl: Option<Duration>,
    ) -> Result<(), SessionStoreError> {
        let expires_at = ttl.map(|d| Timestamp::now().plus_secs(d.as_secs()));
        let record = StoredRecord {
            payload,
            expires_at,
        };
        self.records
            .write()
            .await
            .insert((user.clone(), kind), record);
        Ok(())
    }

    async fn delete(&self, user: &UserId, kind: RecordKind) -> Result<(), SessionStoreError> {
        self.records.write().await.remove(&(user.clone(), kind));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(name: &str) -> UserId {
        UserId::new(name).unwrap()
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = InMemorySessionStore::new();
        let u = user("u1");

        store
            .put(&u, RecordKind::Context, json!({"turn": 3}), None)
            .await
            .unwrap();

        let loaded = store.get(&u, RecordKind::Context).await.unwrap();
        assert_eq!(loaded, Some(json!({"turn": 3})));
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let store = InMemorySessionStore::new();
        let loaded = store.get(&user("u1"), RecordKind::Messages).await.unwrap();
        assert_eq!(loaded, None);
    }

    #[tokio::test]
    async fn records_are_keyed_by_kind() {
        let store = InMemorySessionStore::new();
        let u = user("u1");

        store
            .put(&u, RecordKind::Context, json!("ctx"), None)
            .await
            .unwrap();
        store
            .put(&u, RecordKind::Messages, json!("msgs"), None)
            .await
            .unwrap();

        assert_eq!(
            store.get(&u, RecordKind::Context).await.unwrap(),
            Some(json!("ctx"))
        );
        assert_eq!(
            store.get(&u, RecordKind::Messages).await.unwrap(),
            Some(json!("msgs"))
        );
    }

    #[tokio::test]
    async fn records_are_keyed_by_user() {
        let store = InMemorySessionStore::new();

        store
            .put(&user("u1"), RecordKind::Context, json!(1), None)
            .await
            .unwrap();

        assert_eq!(store.get(&user("u2"), RecordKind::Context).await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_record_reads_as_absent() {
        let store = InMemorySessionStore::new();
        let u = user("u1");

        store
            .put(&u, RecordKind::Context, json!(1), Some(Duration::from_secs(0)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert_eq!(store.get(&u, RecordKind::Context).await.unwrap(), None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let store = InMemorySessionStore::new();
        let u = user("u1");

        store
            .put(&u, RecordKind::Context, json!(1), None)
            .await
            .unwrap();
        store.delete(&u, RecordKind::Context).await.unwrap();

        assert_eq!(store.get(&u, RecordKind::Context).await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_absent_record_is_ok() {
        let store = InMemorySessionStore::new();
        assert!(store.delete(&user("u1"), RecordKind::Context).await.is_ok());
    }

    #[tokio::test]
    async fn put_replaces_previous_value() {
        let store = InMemorySessionStore::new();
        let u = user("u1");

        store
            .put(&u, RecordKind::Context, json!(1), None)
            .await
            .unwrap();
        store
            .put(&u, RecordKind::Context, json!(2), None)
            .await
            .unwrap();

        assert_eq!(
            store.get(&u, RecordKind::Context).await.unwrap(),
            Some(json!(2))
        );
    }

    #[tokio::test]
    async fn clone_shares_the_backing_map() {
        let store = InMemorySessionStore::new();
        let u = user("u1");
        let other = store.clone();

        store
            .put(&u, RecordKind::Context, json!(1), None)
            .await
            .unwrap();

        assert_eq!(
            other.get(&u, RecordKind::Context).await.unwrap(),
            Some(json!(1))
        );
    }
}
