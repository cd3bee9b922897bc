//! Session store configuration.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Which session store backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// In-process store; development and tests.
    #[default]
    Memory,
    /// Redis; production.
    Redis,
}

/// Session store tunables.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Backend selector.
    #[serde(default)]
    pub backend: StorageBackend,

    /// Redis connection URL (required for the redis backend).
    #[serde(default)]
    pub url: Option<String>,

    /// TTL in seconds applied to session records; `None` disables expiry.
    #[serde(default = "default_record_ttl_secs")]
    pub record_ttl_secs: Option<u64>,
}

impl StorageConfig {
    /// The TTL as a Duration.
    pub fn record_ttl(&self) -> Option<Duration> {
        self.record_ttl_secs.map(Duration::from_secs)
    }

    /// Validates storage configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.backend == StorageBackend::Redis {
            match self.url.as_deref() {
                None | Some("") => return Err(ValidationError::MissingRequired("STORAGE_URL")),
                Some(url) if !url.starts_with("redis://") && !url.starts_with("rediss://") => {
                    return Err(ValidationError::InvalidRedisUrl)
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            url: None,
            record_ttl_secs: default_record_ttl_secs(),
        }
    }
}

fn default_record_ttl_secs() -> Option<u64> {
    // 30 days.
    Some(30 * 24 * 3600)
}
