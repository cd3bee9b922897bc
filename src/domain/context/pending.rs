//! Pending requests - intents waiting on missing slots.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{HandlerId, Timestamp};
use crate::domain::intent::IntentType;
use crate::domain::slots::{SlotName, SlotValues};

/// Expiry horizon for pending requests.
///
/// A request expires once it is older than `max_turns` turns or
/// `max_age_secs` of wall clock, whichever trips first. This keeps a stale
/// half-finished request from hijacking unrelated future turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryHorizon {
    /// Turns a pending request survives.
    pub max_turns: u64,
    /// Wall-clock seconds a pending request survives.
    pub max_age_secs: u64,
}

impl Default for ExpiryHorizon {
    fn default() -> Self {
        Self {
            max_turns: 6,
            max_age_secs: 900,
        }
    }
}

/// A classified intent that is missing one or more required slots.
///
/// Created by the routing engine when an intent arrives incomplete;
/// resolved when a later turn supplies the missing slots, superseded by a
/// new unrelated intent, or expired by the horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingRequest {
    /// The intent awaiting completion.
    pub request_type: IntentType,
    /// The handler that will complete it.
    pub target_handler: HandlerId,
    /// Slot names still missing.
    pub missing_slots: Vec<SlotName>,
    /// Slots already gathered, carried across turns.
    pub partial_context: SlotValues,
    /// When the request was created.
    pub created_at: Timestamp,
    /// Session turn on which the request was created.
    pub created_turn: u64,
}

impl PendingRequest {
    /// Creates a pending request.
    pub fn new(
        request_type: IntentType,
        target_handler: HandlerId,
        missing_slots: Vec<SlotName>,
        partial_context: SlotValues,
        created_turn: u64,
    ) -> Self {
        Self {
            request_type,
            target_handler,
            missing_slots,
            partial_context,
            created_at: Timestamp::now(),
            created_turn,
        }
    }

    /// True once the horizon has passed, in turns or wall clock.
    pub fn is_stale(&self, now: Timestamp, current_turn: u64, horizon: ExpiryHorizon) -> bool {
        let age_turns = current_turn.saturating_sub(self.created_turn);
        age_turns > horizon.max_turns || now.secs_since(&self.created_at) > horizon.max_age_secs
    }

    /// True when the given slots would satisfy at least one missing slot.
    pub fn is_satisfied_by(&self, slots: &SlotValues) -> bool {
        self.missing_slots.iter().any(|name| slots.provides(*name))
    }
}
