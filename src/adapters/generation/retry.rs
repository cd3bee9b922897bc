//! Retrying generator decorator.
//!
//! Wraps any ResponseGenerator with bounded exponential backoff and a
//! hard per-attempt timeout. The generation capability is the engine's
//! slowest dependency; it must time out rather than hang a turn, and
//! transient failures get a bounded number of retries, never an unbounded
//! loop.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::warn;

use crate::ports::{
    GenerationError, GenerationOutcome, GenerationRequest, ResponseGenerator,
};

/// Retry/timeout policy for generation calls.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts beyond the first.
    pub max_retries: u32,
    /// Hard per-attempt timeout.
    pub attempt_timeout: Duration,
    /// Backoff before the first retry; doubles per retry.
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            attempt_timeout: Duration::from_secs(30),
            initial_backoff: Duration::from_millis(250),
        }
    }
}

/// Decorator adding bounded retries and timeouts to a generator.
pub struct RetryingGenerator {
    inner: Arc<dyn ResponseGenerator>,
    policy: RetryPolicy,
}

impl RetryingGenerator {
    /// Wraps a generator with the given policy.
    pub fn new(inner: Arc<dyn ResponseGenerator>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    async fn attempt(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationOutcome, GenerationError> {
        match timeout(self.policy.attempt_timeout, self.inner.generate(request)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout {
                timeout_secs: self.policy.attempt_timeout.as_secs(),
            }),
        }
    }
}

#[async_trait]
impl ResponseGenerator for RetryingGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationOutcome, GenerationError> {
        let mut backoff = self.policy.initial_backoff;
        let mut last_error = None;

        for attempt in 0..=self.policy.max_retries {
            match self.attempt(request.clone()).await {
                Ok(outcome) => return Ok(outcome),
                Err(err) if err.is_retryable() && attempt < self.policy.max_retries => {
                    warn!(attempt, error = %err, "generation attempt failed, retrying");
                    sleep(backoff).await;
                    backoff *= 2;
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        // Unreachable in practice: the loop always returns. Kept for the
        // compiler.
        Err(last_error.unwrap_or(GenerationError::Unavailable(
            "generation failed with no attempts".to_string(),
        )))
    }
}
