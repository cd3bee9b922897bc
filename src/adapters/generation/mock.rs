//! Mock generator for testing.
//!
//! Configurable implementation of the ResponseGenerator port so tests run
//! without calling a real generation service: pre-queued outcomes,
//! simulated latency for timeout testing, error injection, and a call log
//! for verification.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    GenerationError, GenerationOutcome, GenerationRequest, ResponseGenerator,
};

/// Scripted generator for tests.
#[derive(Debug, Clone, Default)]
pub struct MockGenerator {
    /// Pre-configured results, consumed in order.
    script: Arc<Mutex<VecDeque<Result<GenerationOutcome, GenerationError>>>>,
    /// Simulated latency per request.
    delay: Duration,
    /// Requests received, for verification.
    calls: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl MockGenerator {
    /// Creates an empty mock; unscripted calls answer with a stock reply.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a text response.
    pub fn with_text(self, content: impl Into<String>) -> Self {
        self.script.lock().unwrap().push_back(Ok(GenerationOutcome::Text {
            content: content.into(),
        }));
        self
    }

    /// Queues a tool invocation.
    pub fn with_tool_invocation(self, name: impl Into<String>, arguments: serde_json::Value) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Ok(GenerationOutcome::ToolInvocation {
                name: name.into(),
                arguments,
            }));
        self
    }

    /// Queues an error.
    pub fn with_error(self, error: GenerationError) -> Self {
        self.script.lock().unwrap().push_back(Err(error));
        self
    }

    /// Adds simulated latency to every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// The last request received, if any.
    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ResponseGenerator for MockGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationOutcome, GenerationError> {
        self.calls.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.script.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(GenerationOutcome::Text {
                content: "mock response".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ChatMessage;

    #[tokio::test]
    async fn returns_scripted_responses_in_order() {
        let generator = MockGenerator::new().with_text("first").with_text("second");

        let a = generator.generate(GenerationRequest::new()).await.unwrap();
        let b = generator.generate(GenerationRequest::new()).await.unwrap();

        assert_eq!(a, GenerationOutcome::Text { content: "first".to_string() });
        assert_eq!(b, GenerationOutcome::Text { content: "second".to_string() });
    }

    #[tokio::test]
    async fn returns_stock_reply_when_unscripted() {
        let generator = MockGenerator::new();
        let outcome = generator.generate(GenerationRequest::new()).await.unwrap();
        assert!(matches!(outcome, GenerationOutcome::Text { .. }));
    }

    #[tokio::test]
    async fn injects_errors() {
        let generator =
            MockGenerator::new().with_error(GenerationError::Unavailable("down".to_string()));

        let result = generator.generate(GenerationRequest::new()).await;
        assert!(matches!(result, Err(GenerationError::Unavailable(_))));
    }

    #[tokio::test]
    async fn records_calls() {
        let generator = MockGenerator::new().with_text("hi");
        let request = GenerationRequest::new().with_message(ChatMessage::user("hello"));

        generator.generate(request).await.unwrap();

        assert_eq!(generator.call_count(), 1);
        assert_eq!(generator.last_request().unwrap().messages[0].content, "hello");
    }

    #[tokio::test]
    async fn simulates_latency() {
        let generator = MockGenerator::new()
            .with_text("slow")
            .with_delay(Duration::from_millis(30));

        let started = std::time::Instant::now();
        generator.generate(GenerationRequest::new()).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(30));
    }
}
