//! HTTP generation adapter.
//!
//! Implements the ResponseGenerator port against a chat-completions style
//! HTTP API. The wire format is the common denominator served by several
//! hosted providers: a messages array in, either prose content or a tool
//! call out.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{
    ChatRole, GenerationError, GenerationOutcome, GenerationRequest, ResponseGenerator,
};

/// Configuration for the HTTP generator.
#[derive(Debug, Clone)]
pub struct HttpGeneratorConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model identifier.
    pub model: String,
    /// Base URL of the chat-completions API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl HttpGeneratorConfig {
    /// Creates a configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// ResponseGenerator backed by a chat-completions HTTP API.
pub struct HttpGenerator {
    config: HttpGeneratorConfig,
    client: Client,
}

impl HttpGenerator {
    /// Creates a generator with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the HTTP client cannot be constructed.
    pub fn new(config: HttpGeneratorConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::Unavailable(e.to_string()))?;
        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn to_wire_request(&self, request: &GenerationRequest) -> WireRequest {
        WireRequest {
            model: self.config.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: match m.role {
                        ChatRole::System => "system",
                        ChatRole::User => "user",
                        ChatRole::Assistant => "assistant",
                    }
                    .to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            tools: if request.tools.is_empty() {
                None
            } else {
                Some(
                    request
                        .tools
                        .iter()
                        .map(|t| WireTool {
                            kind: "function".to_string(),
                            function: WireFunction {
                                name: t.name.clone(),
                                description: t.description.clone(),
                            },
                        })
                        .collect(),
                )
            },
        }
    }
}

#[async_trait]
impl ResponseGenerator for HttpGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationOutcome, GenerationError> {
        let wire = self.to_wire_request(&request);

        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .json(&wire)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout {
                        timeout_secs: self.config.timeout.as_secs(),
                    }
                } else {
                    GenerationError::Unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(30);
            return Err(GenerationError::RateLimited { retry_after_secs });
        }
        if status.is_server_error() {
            return Err(GenerationError::Unavailable(format!(
                "upstream returned {}",
                status
            )));
        }
        if !status.is_success() {
            return Err(GenerationError::InvalidResponse(format!(
                "upstream returned {}",
                status
            )));
        }

        let body: WireResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
        parse_outcome(body)
    }
}

/// Maps a wire response to the port's outcome contract.
fn parse_outcome(body: WireResponse) -> Result<GenerationOutcome, GenerationError> {
    let choice = body
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::InvalidResponse("no choices in response".to_string()))?;

    if let Some(call) = choice.message.tool_calls.and_then(|c| c.into_iter().next()) {
        let arguments = serde_json::from_str(&call.function.arguments)
            .map_err(|e| GenerationError::InvalidResponse(format!("bad tool arguments: {}", e)))?;
        return Ok(GenerationOutcome::ToolInvocation {
            name: call.function.name,
            arguments,
        });
    }

    match choice.message.content {
        Some(content) if !content.is_empty() => Ok(GenerationOutcome::Text { content }),
        _ => Err(GenerationError::InvalidResponse(
            "response carried neither content nor a tool call".to_string(),
        )),
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: String,
    function: WireFunction,
}

#[derive(Debug, Serialize)]
struct WireFunction {
    name: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
}

#[derive(Debug, Deserialize)]
struct WireResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    function: WireCalledFunction,
}

#[derive(Debug, Deserialize)]
struct WireCalledFunction {
    name: String,
    arguments: String,
}
