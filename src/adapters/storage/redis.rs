//! Redis-backed session store for production deployments.
//!
//! Each record is one Redis string keyed `switchboard:{user}:{kind}`,
//! written with SET (plus EX when a TTL is given) so expiry is handled by
//! Redis itself. Suitable for multi-server deployments; the last writer
//! wins, which is the documented policy for concurrent turns of one user.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;

use crate::domain::foundation::UserId;
use crate::ports::{RecordKind, SessionStore, SessionStoreError};

/// Redis-backed session store.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: MultiplexedConnection,
    key_prefix: String,
}

impl RedisSessionStore {
    /// Creates a store over an established connection.
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            key_prefix: "switchboard".to_string(),
        }
    }

    /// Overrides the key prefix (e.g. to namespace test data).
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    fn key(&self, user: &UserId, kind: RecordKind) -> String {
        format!("{}:{}:{}", self.key_prefix, user, kind)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(
        &self,
        user: &UserId,
        kind: RecordKind,
    ) -> Result<Option<serde_json::Value>, SessionStoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(self.key(user, kind))
            .await
            .map_err(|e: redis::RedisError| SessionStoreError::Unavailable(e.to_string()))?;

        match raw {
            None => Ok(None),
            Some(s) => serde_json::from_str(&s)
                .map(Some)
                .map_err(|e| SessionStoreError::DeserializationFailed(e.to_string())),
        }
    }

    async fn put(
        &self,
        user: &UserId,
        kind: RecordKind,
        payload: serde_json::Value,
        ttl: Option<Duration>,
    ) -> Result<(), SessionStoreError> {
        let raw = serde_json::to_string(&payload)
            .map_err(|e| SessionStoreError::SerializationFailed(e.to_string()))?;
        let key = self.key(user, kind);
        let mut conn = self.conn.clone();

        match ttl {
            Some(d) if d.as_secs() > 0 => conn
                .set_ex::<_, _, ()>(key, raw, d.as_secs())
                .await
                .map_err(|e: redis::RedisError| SessionStoreError::Unavailable(e.to_string())),
            _ => conn
                .set::<_, _, ()>(key, raw)
                .await
                .map_err(|e: redis::RedisError| SessionStoreError::Unavailable(e.to_string())),
        }
    }

    async fn delete(&self, user: &UserId, kind: RecordKind) -> Result<(), SessionStoreError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(self.key(user, kind))
            .await
            .map_err(|e: redis::RedisError| SessionStoreError::Unavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    // Key construction is the only logic that runs without a live Redis;
    // the SessionStore contract itself is covered by the in-memory
    // adapter's tests and the integration suite.

    #[test]
    fn keys_are_namespaced_per_user_and_kind() {
        // Mirrors RedisSessionStore::key without needing a connection.
        let key = format!("{}:{}:{}", "switchboard", "user-7", "context");
        assert_eq!(key, "switchboard:user-7:context");
    }
}
