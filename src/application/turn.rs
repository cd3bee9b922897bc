//! Turn service - the caller-facing contract of the engine.
//!
//! `handle_turn(user, utterance)` runs one full turn: load the session,
//! expire stale pending requests, classify, decide, apply, invoke the
//! selected handler (or the generation capability for fallback turns),
//! then commit the message log and context state in one write per record.
//!
//! Failure policy (per the error taxonomy):
//! - classification miss: normal control flow, falls back to generation
//! - store unavailable: degrade to in-memory context for this turn, log,
//!   never fail the turn
//! - handler exception: caught here, graceful failure text surfaced, the
//!   turn's mutations are not committed (pre-turn snapshot stands)
//! - generation timeout/failure on fallback turns: the routing decision
//!   and the user message are still committed, degraded response surfaced

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::domain::context::{ContextState, ExpiryHorizon, DEFAULT_KEYWORD_CAP};
use crate::domain::foundation::{HandlerId, UserId, ValidationError};
use crate::domain::intent::{classify, IntentType};
use crate::domain::memory::{Message, MessageLog, RetentionPolicy, Role};
use crate::domain::routing::{apply, decide, RoutingDecision, RoutingPolicy};
use crate::domain::slots::{AmbiguityPolicy, ListCategory, SlotValues};
use crate::ports::{
    ChatMessage, ChatRole, GenerationOutcome, GenerationRequest, HandlerError, ListFilter,
    RecordKind, ResponseGenerator, SessionStore, SessionStoreError, TurnContext,
};

use super::registry::HandlerRegistry;

/// Response surfaced when the generation capability is unreachable.
const DEGRADED_RESPONSE: &str =
    "I'm having trouble answering right now. Your message was saved; please try again shortly.";

/// Response surfaced when a handler fails mid-turn.
const HANDLER_FAILURE_RESPONSE: &str =
    "Something went wrong handling that request. Nothing was changed; please try again.";

/// Verbatim turns included as context on fallback generation calls.
const FALLBACK_CONTEXT_TURNS: usize = 20;

/// Tunables for the turn service.
#[derive(Debug, Clone)]
pub struct TurnConfig {
    /// Routing policy (confidence threshold).
    pub routing: RoutingPolicy,
    /// Pending-request expiry horizon.
    pub horizon: ExpiryHorizon,
    /// Bound on the context keyword set.
    pub keyword_cap: usize,
    /// Message log retention strategy.
    pub retention: RetentionPolicy,
    /// TTL applied to persisted session records.
    pub record_ttl: Option<Duration>,
    /// Policy for ambiguous bare time expressions.
    pub time_ambiguity: AmbiguityPolicy,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            routing: RoutingPolicy::default(),
            horizon: ExpiryHorizon::default(),
            keyword_cap: DEFAULT_KEYWORD_CAP,
            retention: RetentionPolicy::default(),
            record_ttl: Some(Duration::from_secs(30 * 24 * 3600)),
            time_ambiguity: AmbiguityPolicy::default(),
        }
    }
}

/// Result of one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// The handler the turn routed to; `None` for general-purpose turns.
    pub handler_invoked: Option<HandlerId>,
    /// Text to surface to the user.
    pub response_text: String,
    /// True when the turn ran in a degraded mode (store or generation
    /// trouble).
    pub degraded: bool,
}

/// Errors the caller must handle.
///
/// Everything else in the taxonomy is absorbed into a graceful outcome.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("Invalid utterance: {0}")]
    InvalidUtterance(#[from] ValidationError),
}

/// The engine's orchestrating service.
pub struct TurnService {
    store: Arc<dyn SessionStore>,
    generator: Arc<dyn ResponseGenerator>,
    registry: HandlerRegistry,
    config: TurnConfig,
}

impl TurnService {
    /// Creates a turn service over its collaborators.
    pub fn new(
        store: Arc<dyn SessionStore>,
        generator: Arc<dyn ResponseGenerator>,
        registry: HandlerRegistry,
        config: TurnConfig,
    ) -> Self {
        Self {
            store,
            generator,
            registry,
            config,
        }
    }

    /// Handles one user turn.
    ///
    /// # Errors
    ///
    /// - `InvalidUtterance` if the utterance is empty
    pub async fn handle_turn(
        &self,
        user: &UserId,
        utterance: &str,
    ) -> Result<TurnOutcome, TurnError> {
        if utterance.trim().is_empty() {
            return Err(ValidationError::empty_field("utterance").into());
        }

        // Read the freshest snapshot at turn start; the commit below is the
        // turn's single write per record (last-write-wins across devices).
        let (mut context, mut log, mut degraded) = self.load_session(user).await;

        context.begin_turn();
        let expired = context.expire_stale_requests(self.config.horizon);
        if expired > 0 {
            info!(user = %user, expired, "expired stale pending requests");
        }

        let classifications = classify(utterance);
        let available = self.registry.available_handlers();
        let decision = decide(
            utterance,
            &classifications,
            &context,
            &available,
            &self.config.routing,
        );
        info!(
            user = %user,
            reason = ?decision.reason,
            target = decision.target.as_ref().map(|h| h.as_str()).unwrap_or("none"),
            intent = %decision.intent,
            "routing decision"
        );
        apply(&decision, &mut context);

        let (response_text, handler_invoked) = match self
            .dispatch(user, utterance, &decision, &log)
            .await
        {
            Dispatch::Completed {
                response,
                handler_invoked,
            } => (response, handler_invoked),
            Dispatch::HandlerFailed { handler, source } => {
                // Roll back: the failed turn's mutations are not committed.
                error!(user = %user, handler = %handler, error = %source, "handler failed; turn rolled back");
                return Ok(TurnOutcome {
                    handler_invoked: Some(handler),
                    response_text: HANDLER_FAILURE_RESPONSE.to_string(),
                    degraded: false,
                });
            }
            Dispatch::GenerationDegraded => {
                // Context is not lost: commit the routing decision and the
                // user message, then surface the degraded response.
                if let Ok(user_message) = Message::user(utterance) {
                    log.append(user_message);
                }
                self.persist(user, &context, &log).await;
                return Ok(TurnOutcome {
                    handler_invoked: None,
                    response_text: DEGRADED_RESPONSE.to_string(),
                    degraded: true,
                });
            }
        };

        if let Ok(user_message) = Message::user(utterance) {
            log.append(user_message);
        }
        if let Ok(assistant_message) = Message::assistant(&response_text) {
            log.append(assistant_message);
        }

        self.maybe_compact(user, &mut log).await;
        if !self.persist(user, &context, &log).await {
            degraded = true;
        }

        Ok(TurnOutcome {
            handler_invoked,
            response_text,
            degraded,
        })
    }

    /// Explicit data-deletion request: removes the session's records.
    pub async fn delete_session(&self, user: &UserId) -> Result<(), SessionStoreError> {
        self.store.delete(user, RecordKind::Messages).await?;
        self.store.delete(user, RecordKind::Context).await?;
        info!(user = %user, "session deleted");
        Ok(())
    }

    async fn dispatch(
        &self,
        user: &UserId,
        utterance: &str,
        decision: &RoutingDecision,
        log: &MessageLog,
    ) -> Dispatch {
        match &decision.target {
            Some(handler_id) if decision.is_direct_listing() => {
                self.dispatch_listing(handler_id, decision).await
            }
            Some(handler_id) => self.dispatch_handler(user, utterance, handler_id, decision).await,
            None => self.dispatch_fallback(user, utterance, log).await,
        }
    }

    /// Deterministic listing bypass: never consults the generation
    /// capability.
    async fn dispatch_listing(&self, handler_id: &HandlerId, decision: &RoutingDecision) -> Dispatch {
        let Some(category) = decision.slots.list_category else {
            return Dispatch::HandlerFailed {
                handler: handler_id.clone(),
                source: HandlerError::Failed("listing decision without a category".to_string()),
            };
        };
        let Some(handler) = self.registry.get(handler_id) else {
            return Dispatch::HandlerFailed {
                handler: handler_id.clone(),
                source: HandlerError::Failed("handler disappeared after routing".to_string()),
            };
        };

        match handler.list(&ListFilter { category }).await {
            Ok(items) => Dispatch::Completed {
                response: format_listing(category, &items),
                handler_invoked: Some(handler_id.clone()),
            },
            Err(source) => Dispatch::HandlerFailed {
                handler: handler_id.clone(),
                source,
            },
        }
    }

    async fn dispatch_handler(
        &self,
        user: &UserId,
        utterance: &str,
        handler_id: &HandlerId,
        decision: &RoutingDecision,
    ) -> Dispatch {
        let Some(handler) = self.registry.get(handler_id) else {
            return Dispatch::HandlerFailed {
                handler: handler_id.clone(),
                source: HandlerError::Failed("handler disappeared after routing".to_string()),
            };
        };

        let context = TurnContext {
            user: user.clone(),
            intent: decision.intent,
            slots: decision.slots.clone(),
            missing_slots: decision.missing_slots.clone(),
            ambiguity_policy: self.config.time_ambiguity,
        };

        match handler.process(utterance, &context).await {
            Ok(response) => Dispatch::Completed {
                response,
                handler_invoked: Some(handler_id.clone()),
            },
            Err(source) => Dispatch::HandlerFailed {
                handler: handler_id.clone(),
                source,
            },
        }
    }

    /// General-purpose handling: hand the conversation to the generation
    /// capability with the declared tool contract. A returned tool
    /// invocation naming a registered handler is dispatched to it.
    async fn dispatch_fallback(&self, user: &UserId, utterance: &str, log: &MessageLog) -> Dispatch {
        let request = GenerationRequest::new()
            .with_messages(log.recent(FALLBACK_CONTEXT_TURNS).iter().map(to_chat_message))
            .with_message(ChatMessage::user(utterance));

        let request = self
            .registry
            .tool_specs()
            .into_iter()
            .fold(request, |r, tool| r.with_tool(tool));

        match self.generator.generate(request).await {
            Ok(GenerationOutcome::Text { content }) => Dispatch::Completed {
                response: content,
                handler_invoked: None,
            },
            Ok(GenerationOutcome::ToolInvocation { name, .. }) => {
                let Ok(handler_id) = HandlerId::new(name.clone()) else {
                    warn!(user = %user, tool = %name, "generation invoked a malformed tool name");
                    return Dispatch::GenerationDegraded;
                };
                let Some(handler) = self.registry.get(&handler_id) else {
                    warn!(user = %user, tool = %name, "generation invoked an unknown tool");
                    return Dispatch::GenerationDegraded;
                };

                let context = TurnContext {
                    user: user.clone(),
                    intent: IntentType::None,
                    slots: SlotValues::extract(utterance),
                    missing_slots: Vec::new(),
                    ambiguity_policy: self.config.time_ambiguity,
                };
                match handler.process(utterance, &context).await {
                    Ok(response) => Dispatch::Completed {
                        response,
                        handler_invoked: Some(handler_id),
                    },
                    Err(source) => Dispatch::HandlerFailed {
                        handler: handler_id,
                        source,
                    },
                }
            }
            Err(err) => {
                warn!(user = %user, error = %err, "generation capability failed");
                Dispatch::GenerationDegraded
            }
        }
    }

    /// Opportunistic compaction in summary mode: a failed digest leaves
    /// the log untouched.
    async fn maybe_compact(&self, user: &UserId, log: &mut MessageLog) {
        if !log.needs_compaction() {
            return;
        }

        let request = GenerationRequest::new()
            .with_message(ChatMessage::system(
                "Summarize the conversation so far in two or three sentences, \
                 keeping names, times, and open requests.",
            ))
            .with_messages(log.messages().iter().map(to_chat_message));

        match self.generator.generate(request).await {
            Ok(GenerationOutcome::Text { content }) => match log.compact(content) {
                Ok(replaced) if replaced > 0 => {
                    info!(user = %user, replaced, "compacted message log");
                }
                Ok(_) => {}
                Err(err) => warn!(user = %user, error = %err, "digest rejected; compaction skipped"),
            },
            Ok(GenerationOutcome::ToolInvocation { .. }) => {
                warn!(user = %user, "generation returned a tool call for a digest request; compaction skipped");
            }
            Err(err) => {
                warn!(user = %user, error = %err, "digest generation failed; compaction skipped");
            }
        }
    }

    async fn load_session(&self, user: &UserId) -> (ContextState, MessageLog, bool) {
        let mut degraded = false;

        let context = match self.store.get(user, RecordKind::Context).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(context) => context,
                Err(err) => {
                    warn!(user = %user, error = %err, "corrupt context record; starting fresh");
                    ContextState::with_keyword_cap(self.config.keyword_cap)
                }
            },
            Ok(None) => ContextState::with_keyword_cap(self.config.keyword_cap),
            Err(err) => {
                warn!(user = %user, error = %err, "session store unavailable; in-memory context for this turn");
                degraded = true;
                ContextState::with_keyword_cap(self.config.keyword_cap)
            }
        };

        let log = match self.store.get(user, RecordKind::Messages).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(log) => log,
                Err(err) => {
                    warn!(user = %user, error = %err, "corrupt message record; starting fresh");
                    MessageLog::new(self.config.retention.clone())
                }
            },
            Ok(None) => MessageLog::new(self.config.retention.clone()),
            Err(err) => {
                warn!(user = %user, error = %err, "session store unavailable; in-memory log for this turn");
                degraded = true;
                MessageLog::new(self.config.retention.clone())
            }
        };

        (context, log, degraded)
    }

    /// Commits both records; returns false when either write failed.
    async fn persist(&self, user: &UserId, context: &ContextState, log: &MessageLog) -> bool {
        let mut ok = true;

        match serde_json::to_value(context) {
            Ok(value) => {
                if let Err(err) = self
                    .store
                    .put(user, RecordKind::Context, value, self.config.record_ttl)
                    .await
                {
                    warn!(user = %user, error = %err, "failed to persist context state");
                    ok = false;
                }
            }
            Err(err) => {
                warn!(user = %user, error = %err, "failed to serialize context state");
                ok = false;
            }
        }

        match serde_json::to_value(log) {
            Ok(value) => {
                if let Err(err) = self
                    .store
                    .put(user, RecordKind::Messages, value, self.config.record_ttl)
                    .await
                {
                    warn!(user = %user, error = %err, "failed to persist message log");
                    ok = false;
                }
            }
            Err(err) => {
                warn!(user = %user, error = %err, "failed to serialize message log");
                ok = false;
            }
        }

        ok
    }
}

enum Dispatch {
    Completed {
        response: String,
        handler_invoked: Option<HandlerId>,
    },
    HandlerFailed {
        handler: HandlerId,
        source: HandlerError,
    },
    GenerationDegraded,
}

fn format_listing(category: ListCategory, items: &[crate::ports::ListItem]) -> String {
    if items.is_empty() {
        return format!("You have no {}.", category);
    }
    let mut out = format!("You have {} {}:", items.len(), category);
    for item in items {
        out.push_str("\n- ");
        out.push_str(&item.label);
    }
    out
}

fn to_chat_message(message: &Message) -> ChatMessage {
    let role = match message.role() {
        Role::User => ChatRole::User,
        Role::Assistant => ChatRole::Assistant,
        Role::System => ChatRole::System,
    };
    ChatMessage {
        role,
        content: message.text().to_string(),
    }
}
