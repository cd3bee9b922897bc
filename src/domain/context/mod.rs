//! Context state - per-session conversational memory for routing.

mod pending;
mod state;

pub use pending::{ExpiryHorizon, PendingRequest};
pub use state::{ContextPhase, ContextState, DEFAULT_KEYWORD_CAP};
