//! Identifier value objects.
//!
//! `UserId` is the opaque identity issued by the external identity provider;
//! the engine never inspects it beyond non-emptiness. `HandlerId` names a
//! domain handler; the routing table only ever emits ids registered at
//! wiring time. `MessageId` identifies a single turn-log entry.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ValidationError;

/// Opaque per-user identity issued by an external identity provider.
///
/// One session exists per `UserId`; sessions are never shared across users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a user id from an externally issued identity string.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the identity is empty or whitespace-only
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("user_id"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for a domain handler (e.g. `scheduling`, `tasks`).
///
/// Lowercase token; the closed set in live use is defined by what the
/// handler registry was wired with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandlerId(String);

impl HandlerId {
    /// The handler that owns reminders and scheduled events.
    pub const SCHEDULING: &'static str = "scheduling";
    /// The handler that owns the task/todo list.
    pub const TASKS: &'static str = "tasks";
    /// The handler that owns outbound messages.
    pub const CORRESPONDENCE: &'static str = "correspondence";

    /// Creates a handler id from a lowercase token.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the token is empty
    /// - `InvalidFormat` if the token contains anything other than
    ///   lowercase ASCII letters, digits, `-` or `_`
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(ValidationError::empty_field("handler_id"));
        }
        let valid = raw
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
        if !valid {
            return Err(ValidationError::invalid_format(
                "handler_id",
                "must be a lowercase token",
            ));
        }
        Ok(Self(raw))
    }

    /// The scheduling handler id.
    pub fn scheduling() -> Self {
        Self(Self::SCHEDULING.to_string())
    }

    /// The task-tracking handler id.
    pub fn tasks() -> Self {
        Self(Self::TASKS.to_string())
    }

    /// The correspondence handler id.
    pub fn correspondence() -> Self {
        Self(Self::CORRESPONDENCE.to_string())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HandlerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a message in the turn log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Creates a new random MessageId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a MessageId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MessageId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod user_id {
        use super::*;

        #[test]
        fn accepts_opaque_identity() {
            let id = UserId::new("auth0|62bb...e1").unwrap();
            assert_eq!(id.as_str(), "auth0|62bb...e1");
        }

        #[test]
        fn trims_surrounding_whitespace() {
            let id = UserId::new("  user-7  ").unwrap();
            assert_eq!(id.as_str(), "user-7");
        }

        #[test]
        fn rejects_empty_identity() {
            assert!(UserId::new("").is_err());
            assert!(UserId::new("   ").is_err());
        }

        #[test]
        fn serializes_transparently() {
            let id = UserId::new("user-7").unwrap();
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, "\"user-7\"");
        }
    }

    mod handler_id {
        use super::*;

        #[test]
        fn well_known_ids_are_valid_tokens() {
            for id in [
                HandlerId::scheduling(),
                HandlerId::tasks(),
                HandlerId::correspondence(),
            ] {
                assert!(HandlerId::new(id.as_str()).is_ok());
            }
        }

        #[test]
        fn rejects_uppercase() {
            assert!(HandlerId::new("Scheduling").is_err());
        }

        #[test]
        fn rejects_empty() {
            assert!(HandlerId::new("").is_err());
        }

        #[test]
        fn accepts_hyphenated_token() {
            let id = HandlerId::new("task-tracking").unwrap();
            assert_eq!(id.as_str(), "task-tracking");
        }
    }

    mod message_id {
        use super::*;

        #[test]
        fn generates_unique_values() {
            let id1 = MessageId::new();
            let id2 = MessageId::new();
            assert_ne!(id1, id2);
        }

        #[test]
        fn parses_from_valid_string() {
            let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
            let id: MessageId = uuid_str.parse().unwrap();
            assert_eq!(id.to_string(), uuid_str);
        }
    }
}
