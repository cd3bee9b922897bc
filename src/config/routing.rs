//! Routing configuration.

use serde::Deserialize;

use crate::domain::context::ExpiryHorizon;
use crate::domain::routing::RoutingPolicy;
use crate::domain::slots::AmbiguityPolicy;

use super::error::ValidationError;

/// Routing engine tunables.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingConfig {
    /// Minimum classifier confidence for explicit-intent routing.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// Turns a pending request survives.
    #[serde(default = "default_pending_max_turns")]
    pub pending_max_turns: u64,

    /// Wall-clock seconds a pending request survives.
    #[serde(default = "default_pending_max_age_secs")]
    pub pending_max_age_secs: u64,

    /// Bound on the context keyword set.
    #[serde(default = "default_keyword_cap")]
    pub keyword_cap: usize,

    /// Policy for bare clock values with no am/pm.
    #[serde(default)]
    pub time_ambiguity: AmbiguityPolicy,
}

impl RoutingConfig {
    /// The routing policy for the decision engine.
    pub fn policy(&self) -> RoutingPolicy {
        RoutingPolicy {
            confidence_threshold: self.confidence_threshold,
        }
    }

    /// The pending-request expiry horizon.
    pub fn horizon(&self) -> ExpiryHorizon {
        ExpiryHorizon {
            max_turns: self.pending_max_turns,
            max_age_secs: self.pending_max_age_secs,
        }
    }

    /// Validates routing configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ValidationError::InvalidConfidenceThreshold);
        }
        if self.pending_max_turns == 0 || self.pending_max_age_secs == 0 {
            return Err(ValidationError::InvalidPendingHorizon);
        }
        if self.keyword_cap == 0 {
            return Err(ValidationError::InvalidKeywordCap);
        }
        Ok(())
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            pending_max_turns: default_pending_max_turns(),
            pending_max_age_secs: default_pending_max_age_secs(),
            keyword_cap: default_keyword_cap(),
            time_ambiguity: AmbiguityPolicy::default(),
        }
    }
}

fn default_confidence_threshold() -> f32 {
    0.5
}

fn default_pending_max_turns() -> u64 {
    6
}

fn default_pending_max_age_secs() -> u64 {
    900
}

fn default_keyword_cap() -> usize {
    16
}
