//! Conversation memory - the per-session append-only turn log.

mod message;
mod store;

pub use message::{Message, Role};
pub use store::{MessageLog, RetentionPolicy};
