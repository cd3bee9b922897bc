//! Foundation - Shared value objects and traits for the domain layer.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{HandlerId, MessageId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
