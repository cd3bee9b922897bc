//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the engine and the outside world. Adapters implement these ports.
//!
//! - `SessionStore` - per-session get/put/delete persistence with TTL
//! - `ResponseGenerator` - the external generation/tool-invocation
//!   capability, consulted only after routing selects a handler
//! - `DomainHandler` - a specialized request handler with a deterministic
//!   listing bypass

mod generator;
mod handler;
mod session_store;

pub use generator::{
    ChatMessage, ChatRole, GenerationError, GenerationOutcome, GenerationRequest,
    ResponseGenerator, ToolSpec,
};
pub use handler::{DomainHandler, HandlerError, ListFilter, ListItem, TurnContext};
pub use session_store::{RecordKind, SessionStore, SessionStoreError};
