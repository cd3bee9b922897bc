//! Message entity for the per-session turn log.
//!
//! Messages are immutable records of user/assistant exchanges. Each has a
//! role, text, and timestamp; once appended to the log they are never
//! mutated.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MessageId, Timestamp, ValidationError};

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// User input.
    User,
    /// Assistant response.
    Assistant,
    /// Synthesized bookkeeping (e.g. a compaction digest).
    System,
}

impl Role {
    /// Returns true if this is a user-visible role.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, Self::User | Self::Assistant)
    }
}

/// An immutable message in a session's turn log.
///
/// # Invariants
///
/// - `id` is globally unique
/// - `text` is non-empty (validated at construction)
/// - `created_at` is set at construction and never changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    role: Role,
    text: String,
    created_at: Timestamp,
}

impl Message {
    /// Creates a new message with the given role and text.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the text is empty or whitespace-only
    pub fn new(role: Role, text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::empty_field("text"));
        }
        Ok(Self {
            id: MessageId::new(),
            role,
            text,
            created_at: Timestamp::now(),
        })
    }

    /// Creates a user message.
    pub fn user(text: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(Role::User, text)
    }

    /// Creates an assistant message.
    pub fn assistant(text: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(Role::Assistant, text)
    }

    /// Creates a system message.
    pub fn system(text: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(Role::System, text)
    }

    /// Reconstitutes a message from persistence (no validation).
    pub fn reconstitute(id: MessageId, role: Role, text: String, created_at: Timestamp) -> Self {
        Self {
            id,
            role,
            text,
            created_at,
        }
    }

    /// Returns the message id.
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    /// Returns the role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns when the message was created.
    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Returns true if this message is from the user.
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Estimated token footprint (~4 characters per token plus role
    /// overhead).
    pub fn estimate_tokens(&self) -> u32 {
        ((self.text.len() / 4) + 4) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod construction {
        use super::*;

        #[test]
        fn user_creates_user_message() {
            let msg = Message::user("Hello").unwrap();
            assert!(msg.is_user());
            assert_eq!(msg.text(), "Hello");
        }

        #[test]
        fn assistant_creates_assistant_message() {
            let msg = Message::assistant("Hi there").unwrap();
            assert_eq!(msg.role(), Role::Assistant);
        }

        #[test]
        fn rejects_empty_text() {
            assert!(Message::user("").is_err());
            assert!(Message::user("   ").is_err());
        }

        #[test]
        fn sets_created_at() {
            let msg = Message::user("Hello").unwrap();
            let now = Timestamp::now();
            assert!(!msg.created_at().is_after(&now));
        }

        #[test]
        fn ids_are_unique() {
            let a = Message::user("a").unwrap();
            let b = Message::user("b").unwrap();
            assert_ne!(a.id(), b.id());
        }
    }

    mod reconstitute {
        use super::*;

        #[test]
        fn preserves_all_fields() {
            let id = MessageId::new();
            let created_at = Timestamp::now();
            let msg = Message::reconstitute(id, Role::User, "Text".to_string(), created_at);

            assert_eq!(msg.id(), &id);
            assert_eq!(msg.role(), Role::User);
            assert_eq!(msg.text(), "Text");
            assert_eq!(msg.created_at(), &created_at);
        }
    }

    mod role {
        use super::*;

        #[test]
        fn system_is_not_user_visible() {
            assert!(!Role::System.is_user_visible());
            assert!(Role::User.is_user_visible());
            assert!(Role::Assistant.is_user_visible());
        }

        #[test]
        fn serializes_to_snake_case() {
            let json = serde_json::to_string(&Role::Assistant).unwrap();
            assert_eq!(json, "\"assistant\"");
        }
    }

    #[test]
    fn estimate_tokens_scales_with_length() {
        let short = Message::user("hi").unwrap();
        let long = Message::user("x".repeat(400)).unwrap();
        assert!(long.estimate_tokens() > short.estimate_tokens());
        assert!(long.estimate_tokens() >= 100);
    }

    #[test]
    fn round_trips_through_json() {
        let msg = Message::user("Hello").unwrap();
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }
}
