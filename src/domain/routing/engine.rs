//! Routing decision engine.
//!
//! Combines classifier output and context state into one routing decision
//! per turn. [`decide`] is a pure function of its inputs; [`apply`]
//! commits the decision's context mutations. Splitting the two keeps the
//! decision testable in isolation and makes the per-turn read-modify-write
//! a single explicit step.
//!
//! Priority order, evaluated top-down, first match wins:
//!
//! 1. Clarification override
//! 2. Explicit classified intent above threshold
//! 3. Pending-request resolution
//! 4. Active-handler continuity via context keywords
//! 5. Fallback (general-purpose handling)
//!
//! Explicit intent must never be overridden by stale context; once intent
//! is ambiguous, conversational continuity wins over guessing. Listing
//! classifications short-circuit to the owning handler's list operation
//! and skip steps 3-5 entirely.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::context::ContextState;
use crate::domain::foundation::HandlerId;
use crate::domain::intent::{Classification, IntentType};
use crate::domain::slots::{SlotName, SlotValues};

use super::clarification::{detect_clarification, reasserted_intent};

/// Tunable routing policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutingPolicy {
    /// Minimum classifier confidence for explicit-intent routing.
    pub confidence_threshold: f32,
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
        }
    }
}

/// Which rule produced the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteReason {
    ClarificationOverride,
    DirectListing,
    ExplicitIntent,
    PendingResolution,
    ActiveContinuity,
    Fallback,
}

/// The outcome of routing one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    /// Selected handler; `None` signals general-purpose handling.
    pub target: Option<HandlerId>,
    /// Which priority rule fired.
    pub reason: RouteReason,
    /// The intent being served.
    pub intent: IntentType,
    /// Effective slots for the handler (extracted, merged with any
    /// pending partial context on resolution).
    pub slots: SlotValues,
    /// Required slots still missing; non-empty means a pending request
    /// is created or updated when the decision is applied.
    pub missing_slots: Vec<SlotName>,
    /// Keywords this turn contributes to the context set.
    pub keywords: Vec<String>,
}

impl RoutingDecision {
    fn fallback(keywords: Vec<String>) -> Self {
        Self {
            target: None,
            reason: RouteReason::Fallback,
            intent: IntentType::None,
            slots: SlotValues::default(),
            missing_slots: Vec::new(),
            keywords,
        }
    }

    /// True when this decision used the deterministic listing bypass.
    pub fn is_direct_listing(&self) -> bool {
        self.reason == RouteReason::DirectListing
    }
}

/// Decides where one turn routes.
///
/// Pure: identical `(text, classifications, state, available, policy)`
/// always yield an identical decision. No mutation happens here; commit
/// the decision with [`apply`].
pub fn decide(
    text: &str,
    classifications: &[Classification],
    state: &ContextState,
    available: &[HandlerId],
    policy: &RoutingPolicy,
) -> RoutingDecision {
    let keywords = harvest_keywords(text);

    // 1. Clarification override: an explicit correction beats everything,
    //    including the pending request it is correcting away from.
    if let Some(handler) = detect_clarification(text) {
        if available.contains(&handler) {
            let intent = reasserted_intent(&handler);
            let slots = SlotValues::extract(text);
            let missing = missing_for(intent, &slots);
            return RoutingDecision {
                target: Some(handler),
                reason: RouteReason::ClarificationOverride,
                intent,
                slots,
                missing_slots: missing,
                keywords,
            };
        }
    }

    let top = classifications.first();

    // 2. Explicit classified intent above threshold. Listing gets its own
    //    deterministic bypass and never falls through to steps 3-5.
    if let Some(c) = top.filter(|c| {
        c.intent != IntentType::None && c.confidence >= policy.confidence_threshold
    }) {
        if let Some(handler) = c.target_handler() {
            if available.contains(&handler) {
                if c.intent == IntentType::ListItems {
                    return RoutingDecision {
                        target: Some(handler),
                        reason: RouteReason::DirectListing,
                        intent: IntentType::ListItems,
                        slots: c.slots.clone(),
                        missing_slots: Vec::new(),
                        keywords,
                    };
                }

                // Fold in partial context from an earlier pending request
                // for the same handler, so "set a reminder for tomorrow"
                // followed by "remind me at 6" completes rather than
                // starting over.
                let mut slots = c.slots.clone();
                if let Some(pending) = state.pending_for(&handler) {
                    if pending.request_type == c.intent {
                        slots.fill_missing_from(&pending.partial_context);
                    }
                }
                let missing = missing_for(c.intent, &slots);
                return RoutingDecision {
                    target: Some(handler),
                    reason: RouteReason::ExplicitIntent,
                    intent: c.intent,
                    slots,
                    missing_slots: missing,
                    keywords,
                };
            }
        }
    }

    // 3. Pending-request resolution: a bare slot value ("6am") goes to the
    //    oldest pending request it plausibly satisfies.
    let extracted = SlotValues::extract(text);
    for pending in state.pending_requests() {
        if available.contains(&pending.target_handler) && pending.is_satisfied_by(&extracted) {
            let mut slots = extracted.clone();
            slots.fill_missing_from(&pending.partial_context);
            let missing = missing_for(pending.request_type, &slots);
            return RoutingDecision {
                target: Some(pending.target_handler.clone()),
                reason: RouteReason::PendingResolution,
                intent: pending.request_type,
                slots,
                missing_slots: missing,
                keywords,
            };
        }
    }

    // 4. Active-handler continuity: keep multi-turn dialogues with the
    //    current handler when the text echoes accumulated keywords.
    if let Some(handler) = state.active_handler() {
        if available.contains(handler) && state.matches_keywords(text) {
            return RoutingDecision {
                target: Some(handler.clone()),
                reason: RouteReason::ActiveContinuity,
                intent: IntentType::None,
                slots: extracted,
                missing_slots: Vec::new(),
                keywords,
            };
        }
    }

    // 5. Fallback: no specialized routing.
    RoutingDecision::fallback(keywords)
}

/// Commits a decision's mutations to the context state.
///
/// This is the only place routing writes context. The whole call happens
/// inside the turn's single read-modify-write of the persisted state.
pub fn apply(decision: &RoutingDecision, state: &mut ContextState) {
    match decision.reason {
        RouteReason::ClarificationOverride => {
            let Some(target) = decision.target.clone() else {
                return;
            };
            state.mark_clarifying();
            state.clear_pending_except(&target);
            if decision.missing_slots.is_empty() {
                state.resolve_pending_request(&target);
            } else {
                state.add_pending_request(
                    decision.intent,
                    target.clone(),
                    decision.missing_slots.clone(),
                    decision.slots.clone(),
                );
            }
            state.set_active_handler(target);
            state.add_context_keywords(decision.keywords.iter().cloned());
            state.settle();
        }
        RouteReason::ExplicitIntent => {
            let Some(target) = decision.target.clone() else {
                return;
            };
            // A new intent supersedes pending requests for other handlers.
            state.clear_pending_except(&target);
            if decision.missing_slots.is_empty() {
                state.resolve_pending_request(&target);
            } else {
                state.add_pending_request(
                    decision.intent,
                    target.clone(),
                    decision.missing_slots.clone(),
                    decision.slots.clone(),
                );
            }
            state.set_active_handler(target);
            state.add_context_keywords(decision.keywords.iter().cloned());
            state.set_topic(decision.intent.as_str());
        }
        RouteReason::PendingResolution => {
            let Some(target) = decision.target.clone() else {
                return;
            };
            if decision.missing_slots.is_empty() {
                state.resolve_pending_request(&target);
            } else {
                // Partially satisfied: keep waiting on the remainder.
                state.add_pending_request(
                    decision.intent,
                    target.clone(),
                    decision.missing_slots.clone(),
                    decision.slots.clone(),
                );
            }
            state.set_active_handler(target);
            state.add_context_keywords(decision.keywords.iter().cloned());
        }
        RouteReason::ActiveContinuity => {
            state.add_context_keywords(decision.keywords.iter().cloned());
        }
        // Listing is a side query: it reads, never owns the conversation.
        RouteReason::DirectListing => {}
        RouteReason::Fallback => {}
    }
}

fn missing_for(intent: IntentType, slots: &SlotValues) -> Vec<SlotName> {
    intent
        .required_slots()
        .iter()
        .copied()
        .filter(|name| !slots.provides(*name))
        .collect()
}

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "and", "for", "that", "this", "with", "you", "your", "have", "what", "about",
        "please", "can", "could", "would", "will", "all", "our", "are", "was", "not", "but",
        "asked", "said", "told", "meant",
    ]
    .into_iter()
    .collect()
});

/// Significant lowercase tokens from an utterance, capped at eight.
fn harvest_keywords(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 2 && !STOPWORDS.contains(w))
        .filter(|w| seen.insert(w.to_string()))
        .take(8)
        .map(str::to_string)
        .collect()
}
