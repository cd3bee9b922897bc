//! Generator Port - Interface for the external generation capability.
//!
//! Given an ordered message list and a declared tool/handler contract, the
//! capability returns either a natural-language answer or a structured
//! tool invocation. It is treated as an opaque, possibly slow, possibly
//! failing dependency: the engine never inspects its internals, only this
//! output contract. It is consulted after routing, never during it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Role of a message sent to the generation capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A message in a generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A tool/handler the capability may invoke instead of answering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Tool name; matches a registered handler id when dispatchable.
    pub name: String,
    /// What the tool does, for the capability's planning.
    pub description: String,
}

/// Request to the generation capability.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    /// Ordered conversation messages.
    pub messages: Vec<ChatMessage>,
    /// Declared tool contract; empty when only prose is wanted.
    pub tools: Vec<ToolSpec>,
}

impl GenerationRequest {
    /// Creates an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a message.
    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Adds several messages.
    pub fn with_messages(mut self, messages: impl IntoIterator<Item = ChatMessage>) -> Self {
        self.messages.extend(messages);
        self
    }

    /// Declares a tool.
    pub fn with_tool(mut self, tool: ToolSpec) -> Self {
        self.tools.push(tool);
        self
    }
}

/// What the capability produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationOutcome {
    /// A natural-language answer.
    Text { content: String },
    /// A structured tool invocation.
    ToolInvocation {
        name: String,
        arguments: serde_json::Value,
    },
}

/// Errors from the generation capability.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    #[error("Generation timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Generation capability unavailable: {0}")]
    Unavailable(String),

    #[error("Rate limited; retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Invalid response from generation capability: {0}")]
    InvalidResponse(String),
}

impl GenerationError {
    /// True when a bounded retry might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenerationError::Timeout { .. }
                | GenerationError::Unavailable(_)
                | GenerationError::RateLimited { .. }
        )
    }
}

/// Port for the generation/tool-invocation capability.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Produces an answer or a tool invocation for the given messages.
    async fn generate(&self, request: GenerationRequest)
        -> Result<GenerationOutcome, GenerationError>;
}
