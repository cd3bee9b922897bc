//! Application configuration module.
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Values are read with the `SWITCHBOARD`
//! prefix; nested values use `__` as the separator:
//!
//! - `SWITCHBOARD__ROUTING__CONFIDENCE_THRESHOLD=0.6`
//! - `SWITCHBOARD__STORAGE__BACKEND=redis`
//! - `SWITCHBOARD__STORAGE__URL=redis://localhost:6379`

mod error;
mod generation;
mod memory;
mod routing;
mod storage;

pub use error::{ConfigError, ValidationError};
pub use generation::GenerationConfig;
pub use memory::{MemoryConfig, RetentionMode};
pub use routing::RoutingConfig;
pub use storage::{StorageBackend, StorageConfig};

use serde::Deserialize;

use crate::application::TurnConfig;

/// Root application configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Routing engine tunables.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Conversation memory tunables.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Session store backend.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Generation capability client.
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl AppConfig {
    /// Loads configuration from environment variables.
    ///
    /// Reads a `.env` file first when present (development convenience),
    /// then environment variables with the `SWITCHBOARD` prefix.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when values cannot be parsed into the
    /// expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SWITCHBOARD")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validates every configuration section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.routing.validate()?;
        self.memory.validate()?;
        self.storage.validate()?;
        self.generation.validate()?;
        Ok(())
    }

    /// Assembles the turn service configuration.
    pub fn turn_config(&self) -> TurnConfig {
        TurnConfig {
            routing: self.routing.policy(),
            horizon: self.routing.horizon(),
            keyword_cap: self.routing.keyword_cap,
            retention: self.memory.retention(),
            record_ttl: self.storage.record_ttl(),
            time_ambiguity: self.routing.time_ambiguity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::memory::RetentionPolicy;

    #[test]
    fn default_config_validates() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn turn_config_mirrors_sections() {
        let config = AppConfig::default();
        let turn = config.turn_config();

        assert_eq!(turn.routing.confidence_threshold, 0.5);
        assert_eq!(turn.horizon.max_turns, 6);
        assert_eq!(turn.keyword_cap, 16);
        assert!(matches!(turn.retention, RetentionPolicy::Buffer { .. }));
    }

    #[test]
    fn invalid_section_fails_validation() {
        let config = AppConfig {
            routing: RoutingConfig {
                confidence_threshold: 2.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
