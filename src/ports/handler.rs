//! Domain Handler Port - Interface for specialized request handlers.
//!
//! Handlers own the business logic for one domain (scheduling,
//! task-tracking, correspondence). The engine selects one per turn and
//! invokes `process`; listing requests use the deterministic `list`
//! bypass instead, which must stay fast and exact.

use async_trait::async_trait;

use crate::domain::foundation::{HandlerId, UserId};
use crate::domain::intent::IntentType;
use crate::domain::slots::{AmbiguityPolicy, ListCategory, SlotName, SlotValues};

/// Routing context handed to a handler with the utterance.
#[derive(Debug, Clone)]
pub struct TurnContext {
    /// The session's user.
    pub user: UserId,
    /// The intent the routing engine selected.
    pub intent: IntentType,
    /// Extracted slots, merged with any pending partial context.
    pub slots: SlotValues,
    /// Required slots still missing; the handler asks the follow-up
    /// question for these.
    pub missing_slots: Vec<SlotName>,
    /// Policy in force for resolving ambiguous time expressions, so the
    /// handler can echo the applied assumption back to the user.
    pub ambiguity_policy: AmbiguityPolicy,
}

/// Filter for the deterministic listing bypass.
#[derive(Debug, Clone, PartialEq)]
pub struct ListFilter {
    /// What kind of items to enumerate.
    pub category: ListCategory,
}

/// One item returned by a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    /// Stable item identifier.
    pub id: String,
    /// Human-readable label.
    pub label: String,
}

/// Errors a handler can surface.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// The handler failed mid-operation. Caught at the routing boundary;
    /// the turn's state mutations are rolled back.
    #[error("Handler failed: {0}")]
    Failed(String),

    /// The handler does not support the requested operation.
    #[error("Operation not supported: {0}")]
    Unsupported(String),
}

/// Port for a specialized domain handler.
#[async_trait]
pub trait DomainHandler: Send + Sync {
    /// The handler's stable identifier.
    fn id(&self) -> HandlerId;

    /// One-line description for the declared tool contract handed to the
    /// generation capability.
    fn description(&self) -> &str;

    /// Processes one routed utterance and returns the response text.
    ///
    /// When `context.missing_slots` is non-empty the handler is expected
    /// to ask the follow-up question rather than act.
    async fn process(&self, utterance: &str, context: &TurnContext)
        -> Result<String, HandlerError>;

    /// Deterministic listing bypass: enumerates items without invoking
    /// the generation capability.
    async fn list(&self, filter: &ListFilter) -> Result<Vec<ListItem>, HandlerError>;
}
