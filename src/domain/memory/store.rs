//! Per-session turn log with configurable retention.
//!
//! Two retention strategies: a verbatim buffer bounded by turn count (and
//! optionally by a token estimate, oldest dropped first), and a summary
//! mode that keeps a rolling synthesized digest plus the most recent
//! verbatim turns. The digest text itself comes from the external
//! generation capability; this module only does the bookkeeping. Switching
//! strategy is a configuration choice, never automatic.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

use super::message::{Message, Role};

/// Retention strategy for a session's turn log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RetentionPolicy {
    /// Keep every turn verbatim, bounded; oldest dropped first.
    Buffer {
        /// Maximum user turns kept.
        max_turns: usize,
        /// Optional token-estimate ceiling across the whole log.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_tokens: Option<u32>,
    },
    /// Keep a rolling digest plus the most recent verbatim turns.
    Summary {
        /// Verbatim messages preserved through a compaction.
        recent_verbatim: usize,
        /// User-turn count at which callers should compact.
        compact_threshold: usize,
    },
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        RetentionPolicy::Buffer {
            max_turns: 50,
            max_tokens: None,
        }
    }
}

/// Append-only turn log for one session.
///
/// No cross-session visibility: one log per session, serialized whole as
/// the session's message record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageLog {
    messages: Vec<Message>,
    policy: RetentionPolicy,
}

impl MessageLog {
    /// Creates an empty log with the given retention policy.
    pub fn new(policy: RetentionPolicy) -> Self {
        Self {
            messages: Vec::new(),
            policy,
        }
    }

    /// Appends a message, enforcing the buffer bound.
    ///
    /// In buffer mode the oldest messages are dropped once the log
    /// exceeds its turn bound or token ceiling. A digest message at the
    /// front is never dropped.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
        self.enforce_bounds();
    }

    /// Returns the last `n` messages in insertion order.
    pub fn recent(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    /// Returns every retained message in insertion order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of user turns currently retained.
    pub fn turn_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_user()).count()
    }

    /// Estimated token footprint of the retained log.
    pub fn estimated_tokens(&self) -> u32 {
        self.messages.iter().map(Message::estimate_tokens).sum()
    }

    /// Returns the retention policy.
    pub fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }

    /// True when the caller should compact the log.
    ///
    /// Only meaningful in summary mode; buffer mode self-bounds.
    pub fn needs_compaction(&self) -> bool {
        match self.policy {
            RetentionPolicy::Summary {
                compact_threshold, ..
            } => self.turn_count() >= compact_threshold,
            RetentionPolicy::Buffer { .. } => false,
        }
    }

    /// Replaces everything but the most recent verbatim turns with a
    /// single synthesized digest message.
    ///
    /// The digest text is produced by the caller (via the external
    /// generation capability). Returns the number of messages the digest
    /// replaced; zero means nothing was old enough to compact. A previous
    /// digest is folded into the replacement.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the digest text is empty
    pub fn compact(&mut self, digest: impl Into<String>) -> Result<usize, ValidationError> {
        let keep = match self.policy {
            RetentionPolicy::Summary {
                recent_verbatim, ..
            } => recent_verbatim,
            // Buffer mode has no digest window; keep everything.
            RetentionPolicy::Buffer { .. } => return Ok(0),
        };

        let verbatim: Vec<Message> = self
            .messages
            .iter()
            .filter(|m| m.role() != Role::System)
            .cloned()
            .collect();
        if verbatim.len() <= keep {
            return Ok(0);
        }

        let digest_message = Message::system(digest)?;
        let tail_start = verbatim.len() - keep;
        let replaced = self.messages.len() - keep;

        let mut rebuilt = Vec::with_capacity(keep + 1);
        rebuilt.push(digest_message);
        rebuilt.extend(verbatim[tail_start..].iter().cloned());
        self.messages = rebuilt;

        Ok(replaced)
    }

    fn enforce_bounds(&mut self) {
        let RetentionPolicy::Buffer {
            max_turns,
            max_tokens,
        } = self.policy
        else {
            return;
        };

        while self.turn_count() > max_turns {
            self.drop_oldest_exchange();
        }
        if let Some(ceiling) = max_tokens {
            while self.estimated_tokens() > ceiling && self.messages.len() > 1 {
                self.messages.remove(0);
            }
        }
    }

    /// Drops the oldest user message together with any replies before the
    /// next user message, so the log never starts mid-exchange.
    fn drop_oldest_exchange(&mut self) {
        let Some(first_user) = self.messages.iter().position(Message::is_user) else {
            return;
        };
        let next_user = self.messages[first_user + 1..]
            .iter()
            .position(Message::is_user)
            .map(|i| first_user + 1 + i)
            .unwrap_or(self.messages.len());
        self.messages.drain(first_user..next_user);
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new(RetentionPolicy::default())
    }
}
