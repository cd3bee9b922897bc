//! Configuration error types.

use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Confidence threshold must be between 0 and 1")]
    InvalidConfidenceThreshold,

    #[error("Pending-request horizon must allow at least one turn")]
    InvalidPendingHorizon,

    #[error("Context keyword cap must be at least 1")]
    InvalidKeywordCap,

    #[error("Summary retention must compact more than it keeps verbatim")]
    InvalidRetentionWindow,

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Invalid generation timeout")]
    InvalidTimeout,
}
