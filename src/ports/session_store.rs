//! Session Store Port - Interface for per-session persistence.
//!
//! Records are keyed by `(user id, record kind)` and carry an optional TTL
//! for automatic expiry. Payloads are opaque structured JSON; the engine
//! imposes no schema on the backing store.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::foundation::UserId;

/// The kinds of record the engine persists per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// The session's message log.
    Messages,
    /// The session's context state.
    Context,
}

impl RecordKind {
    /// Returns the storage key suffix for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Messages => "messages",
            RecordKind::Context => "context",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can occur during session store operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    /// The backing store cannot be reached. Callers degrade to in-memory
    /// context for the turn rather than failing it.
    #[error("Session store unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to serialize record: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize record: {0}")]
    DeserializationFailed(String),
}

/// Port for the persistent per-session key-value store.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads a record, or `None` when absent or expired.
    async fn get(
        &self,
        user: &UserId,
        kind: RecordKind,
    ) -> Result<Option<serde_json::Value>, SessionStoreError>;

    /// Stores a record, replacing any previous value.
    ///
    /// A `ttl` of `None` keeps the record until deleted.
    async fn put(
        &self,
        user: &UserId,
        kind: RecordKind,
        payload: serde_json::Value,
        ttl: Option<Duration>,
    ) -> Result<(), SessionStoreError>;

    /// Deletes a record. Deleting an absent record is not an error.
    async fn delete(&self, user: &UserId, kind: RecordKind) -> Result<(), SessionStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_kind_labels_are_stable() {
        assert_eq!(RecordKind::Messages.as_str(), "messages");
        assert_eq!(RecordKind::Context.as_str(), "context");
    }

    #[test]
    fn unavailable_error_mentions_store() {
        let err = SessionStoreError::Unavailable("connection refused".to_string());
        assert!(err.to_string().contains("unavailable"));
    }
}
