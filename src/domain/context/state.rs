//! Per-session context state machine.
//!
//! Tracks which handler owns the conversation, any outstanding
//! information requests, and the keyword trail that lets follow-up turns
//! route without re-stating intent vocabulary. One instance per session;
//! mutated only by the routing engine and handler-completion signals, and
//! persisted whole as a single read-modify-write per turn.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{HandlerId, StateMachine, Timestamp};
use crate::domain::intent::IntentType;
use crate::domain::slots::{SlotName, SlotValues};

use super::pending::{ExpiryHorizon, PendingRequest};

/// Default bound on the context keyword set.
pub const DEFAULT_KEYWORD_CAP: usize = 16;

/// Conversational phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContextPhase {
    /// No handler owns the conversation.
    #[default]
    Idle,
    /// A handler owns the conversation.
    HandlerActive,
    /// A pending request is waiting on missing slots.
    AwaitingSlot,
    /// Transient: a clarification override is in flight this turn.
    Clarifying,
}

impl StateMachine for ContextPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ContextPhase::*;
        matches!(
            (self, target),
            (Idle, HandlerActive)
                | (Idle, AwaitingSlot)
                | (HandlerActive, AwaitingSlot)
                | (HandlerActive, Idle)
                | (AwaitingSlot, HandlerActive)
                | (AwaitingSlot, Idle)
                // A clarification can interrupt any phase and lands on the
                // corrected handler once the turn commits.
                | (Idle, Clarifying)
                | (HandlerActive, Clarifying)
                | (AwaitingSlot, Clarifying)
                | (Clarifying, HandlerActive)
                | (Clarifying, Idle)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ContextPhase::*;
        match self {
            Idle => vec![HandlerActive, AwaitingSlot, Clarifying],
            HandlerActive => vec![AwaitingSlot, Idle, Clarifying],
            AwaitingSlot => vec![HandlerActive, Idle, Clarifying],
            Clarifying => vec![HandlerActive, Idle],
        }
    }
}

/// Mutable per-session routing context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextState {
    phase: ContextPhase,
    active_handler: Option<HandlerId>,
    pending_requests: Vec<PendingRequest>,
    context_keywords: Vec<String>,
    conversation_topic: Option<String>,
    last_activity: Timestamp,
    turn: u64,
    #[serde(default = "default_keyword_cap")]
    keyword_cap: usize,
}

fn default_keyword_cap() -> usize {
    DEFAULT_KEYWORD_CAP
}

impl ContextState {
    /// Creates a fresh context for a new session.
    pub fn new() -> Self {
        Self::with_keyword_cap(DEFAULT_KEYWORD_CAP)
    }

    /// Creates a fresh context with an explicit keyword bound.
    pub fn with_keyword_cap(keyword_cap: usize) -> Self {
        Self {
            phase: ContextPhase::Idle,
            active_handler: None,
            pending_requests: Vec::new(),
            context_keywords: Vec::new(),
            conversation_topic: None,
            last_activity: Timestamp::now(),
            turn: 0,
            keyword_cap: keyword_cap.max(1),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    /// Current conversational phase.
    pub fn phase(&self) -> ContextPhase {
        self.phase
    }

    /// Handler currently owning the conversation, if any.
    pub fn active_handler(&self) -> Option<&HandlerId> {
        self.active_handler.as_ref()
    }

    /// Outstanding pending requests, oldest first.
    pub fn pending_requests(&self) -> &[PendingRequest] {
        &self.pending_requests
    }

    /// The pending request targeting the given handler, if any.
    pub fn pending_for(&self, handler: &HandlerId) -> Option<&PendingRequest> {
        self.pending_requests
            .iter()
            .find(|p| &p.target_handler == handler)
    }

    /// Accumulated context keywords, oldest first.
    pub fn context_keywords(&self) -> &[String] {
        &self.context_keywords
    }

    /// True when the text shares at least one accumulated keyword.
    pub fn matches_keywords(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.context_keywords
            .iter()
            .any(|k| lowered.contains(k.as_str()))
    }

    /// Current conversation topic, if set.
    pub fn conversation_topic(&self) -> Option<&str> {
        self.conversation_topic.as_deref()
    }

    /// Timestamp of the last mutation.
    pub fn last_activity(&self) -> &Timestamp {
        &self.last_activity
    }

    /// Turn counter (monotonic per session).
    pub fn turn(&self) -> u64 {
        self.turn
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutations (routing engine and handler-completion signals only)
    // ─────────────────────────────────────────────────────────────────────

    /// Advances the turn counter at the start of a turn.
    pub fn begin_turn(&mut self) -> u64 {
        self.turn += 1;
        self.touch();
        self.turn
    }

    /// Hands the conversation to a handler.
    pub fn set_active_handler(&mut self, handler: HandlerId) {
        self.active_handler = Some(handler);
        if self.pending_requests.is_empty() {
            self.phase = ContextPhase::HandlerActive;
        }
        self.touch();
    }

    /// Signals that the active handler finished its exchange.
    pub fn clear_active_handler(&mut self) {
        self.active_handler = None;
        self.recompute_phase();
        self.touch();
    }

    /// Adds a pending request for missing slots.
    ///
    /// At most one pending request exists per target handler: a new
    /// request for the same handler replaces the old one.
    pub fn add_pending_request(
        &mut self,
        request_type: IntentType,
        target_handler: HandlerId,
        missing_slots: Vec<SlotName>,
        partial_context: SlotValues,
    ) {
        self.pending_requests
            .retain(|p| p.target_handler != target_handler);
        self.pending_requests.push(PendingRequest::new(
            request_type,
            target_handler,
            missing_slots,
            partial_context,
            self.turn,
        ));
        self.phase = ContextPhase::AwaitingSlot;
        self.touch();
    }

    /// Removes and returns the pending request for a handler.
    pub fn resolve_pending_request(&mut self, handler: &HandlerId) -> Option<PendingRequest> {
        let idx = self
            .pending_requests
            .iter()
            .position(|p| &p.target_handler == handler)?;
        let resolved = self.pending_requests.remove(idx);
        self.recompute_phase();
        self.touch();
        Some(resolved)
    }

    /// Drops pending requests for every handler except the given one.
    ///
    /// Used by the clarification override: a correction aimed at handler B
    /// must not leave handler A's stale request lying in wait.
    pub fn clear_pending_except(&mut self, keep: &HandlerId) -> usize {
        let before = self.pending_requests.len();
        self.pending_requests.retain(|p| &p.target_handler == keep);
        let removed = before - self.pending_requests.len();
        if removed > 0 {
            self.recompute_phase();
            self.touch();
        }
        removed
    }

    /// Removes pending requests older than the horizon.
    ///
    /// Called at the start of every turn; expiry is silent, not an error.
    pub fn expire_stale_requests(&mut self, horizon: ExpiryHorizon) -> usize {
        let now = Timestamp::now();
        let turn = self.turn;
        let before = self.pending_requests.len();
        self.pending_requests
            .retain(|p| !p.is_stale(now, turn, horizon));
        let removed = before - self.pending_requests.len();
        if removed > 0 {
            self.recompute_phase();
            self.touch();
        }
        removed
    }

    /// Merges keywords into the bounded context set.
    ///
    /// Duplicates refresh their position; when the cap is exceeded the
    /// oldest entries are evicted.
    pub fn add_context_keywords<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for word in words {
            let word = word.into().to_lowercase();
            if word.is_empty() {
                continue;
            }
            self.context_keywords.retain(|k| k != &word);
            self.context_keywords.push(word);
        }
        while self.context_keywords.len() > self.keyword_cap {
            self.context_keywords.remove(0);
        }
        self.touch();
    }

    /// Sets the conversation topic.
    pub fn set_topic(&mut self, topic: impl Into<String>) {
        self.conversation_topic = Some(topic.into());
        self.touch();
    }

    /// Marks the transient clarifying phase for this turn.
    pub fn mark_clarifying(&mut self) {
        self.phase = ContextPhase::Clarifying;
        self.touch();
    }

    /// Settles the transient clarifying phase after routing commits.
    pub fn settle(&mut self) {
        if self.phase == ContextPhase::Clarifying {
            self.recompute_phase();
        }
    }

    fn recompute_phase(&mut self) {
        self.phase = if !self.pending_requests.is_empty() {
            ContextPhase::AwaitingSlot
        } else if self.active_handler.is_some() {
            ContextPhase::HandlerActive
        } else {
            ContextPhase::Idle
        };
    }

    fn touch(&mut self) {
        self.last_activity = Timestamp::now();
    }
}

impl Default for ContextState {
    fn default() -> Self {
        Self::new()
    }
}
