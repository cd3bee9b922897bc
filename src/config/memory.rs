//! Conversation memory configuration.

use serde::Deserialize;

use crate::domain::memory::RetentionPolicy;

use super::error::ValidationError;

/// Retention strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionMode {
    /// Keep all turns verbatim, bounded.
    #[default]
    Buffer,
    /// Keep a rolling digest plus recent verbatim turns.
    Summary,
}

/// Message store tunables.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Which retention strategy to run.
    #[serde(default)]
    pub mode: RetentionMode,

    /// Buffer mode: maximum user turns kept.
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    /// Buffer mode: optional token-estimate ceiling.
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Summary mode: verbatim messages preserved through compaction.
    #[serde(default = "default_recent_verbatim")]
    pub recent_verbatim: usize,

    /// Summary mode: user-turn count that triggers compaction.
    #[serde(default = "default_compact_threshold")]
    pub compact_threshold: usize,
}

impl MemoryConfig {
    /// The retention policy for new message logs.
    pub fn retention(&self) -> RetentionPolicy {
        match self.mode {
            RetentionMode::Buffer => RetentionPolicy::Buffer {
                max_turns: self.max_turns,
                max_tokens: self.max_tokens,
            },
            RetentionMode::Summary => RetentionPolicy::Summary {
                recent_verbatim: self.recent_verbatim,
                compact_threshold: self.compact_threshold,
            },
        }
    }

    /// Validates memory configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_turns == 0 {
            return Err(ValidationError::InvalidRetentionWindow);
        }
        if self.mode == RetentionMode::Summary && self.compact_threshold <= self.recent_verbatim {
            return Err(ValidationError::InvalidRetentionWindow);
        }
        Ok(())
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            mode: RetentionMode::default(),
            max_turns: default_max_turns(),
            max_tokens: None,
            recent_verbatim: default_recent_verbatim(),
            compact_threshold: default_compact_threshold(),
        }
    }
}

fn default_max_turns() -> usize {
    50
}

fn default_recent_verbatim() -> usize {
    4
}

fn default_compact_threshold() -> usize {
    20
}
