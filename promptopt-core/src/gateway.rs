//! Model gateway boundary.
//!
//! The optimizer core depends only on the [`ModelGateway`] trait; any
//! concrete backend that can turn a prompt into text can drive it. The
//! built-in [`OpenAiGateway`] speaks the OpenAI chat-completions API with:
//!
//! - Per-attempt timeout enforcement from config
//! - Automatic retry with exponential backoff on transient failures
//! - Both free-text and multi-turn conversation prompts
//!
//! # Example
//!
//! ```no_run
//! use promptopt_core::{GatewayConfig, ModelGateway, OpenAiGateway, Prompt};
//!
//! # async fn example() -> Result<(), promptopt_core::GatewayError> {
//! let gateway = OpenAiGateway::new("api-key", GatewayConfig::default());
//! let text = gateway.generate(Prompt::from("What is the capital of France?")).await?;
//! println!("{text}");
//! # Ok(())
//! # }
//! ```

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One turn of a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a system turn.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Prompt payload for a gateway call: free text or an ordered conversation.
#[derive(Debug, Clone)]
pub enum Prompt {
    /// Free text, sent as a single user turn
    Text(String),
    /// Ordered role/content turns
    Conversation(Vec<Message>),
}

impl Prompt {
    /// Whether the payload carries no content at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Prompt::Text(text) => text.is_empty(),
            Prompt::Conversation(messages) => {
                messages.is_empty() || messages.iter().all(|m| m.content.is_empty())
            }
        }
    }

    /// Convert into the message list sent on the wire.
    pub fn into_messages(self) -> Vec<Message> {
        match self {
            Prompt::Text(text) => vec![Message::user(text)],
            Prompt::Conversation(messages) => messages,
        }
    }
}

impl From<&str> for Prompt {
    fn from(text: &str) -> Self {
        Prompt::Text(text.to_string())
    }
}

impl From<String> for Prompt {
    fn from(text: String) -> Self {
        Prompt::Text(text)
    }
}

impl From<Vec<Message>> for Prompt {
    fn from(messages: Vec<Message>) -> Self {
        Prompt::Conversation(messages)
    }
}

/// Capability interface for language-model backends.
///
/// The valuator, summarizer, rewriter, and controller depend only on this
/// trait, never on a concrete backend type. Implementations own their
/// resilience: retry with backoff belongs behind `generate`, and failure
/// after exhausting retries propagates the last error.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Backend identifier for logs and reports.
    fn name(&self) -> &str;

    /// Generate text for the given prompt.
    async fn generate(&self, prompt: Prompt) -> Result<String, GatewayError>;
}

/// Gateway speaking the OpenAI chat-completions API.
pub struct OpenAiGateway {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    config: GatewayConfig,
}

impl std::fmt::Debug for OpenAiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiGateway")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("config", &self.config)
            .finish()
    }
}

impl OpenAiGateway {
    /// Default API base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";

    /// Environment variable holding the API key.
    pub const API_KEY_ENV: &'static str = "OPENAI_API_KEY";

    /// Create a new gateway with the given API key and configuration.
    pub fn new(api_key: impl Into<String>, config: GatewayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            config,
        }
    }

    /// Create a gateway with the API key taken from `OPENAI_API_KEY`.
    pub fn from_env(config: GatewayConfig) -> Result<Self, GatewayError> {
        let api_key = std::env::var(Self::API_KEY_ENV)
            .map_err(|_| GatewayError::Auth(format!("missing {}", Self::API_KEY_ENV)))?;
        Ok(Self::new(api_key, config))
    }

    /// Override the API base URL (OpenAI-compatible endpoints).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Get a reference to the gateway configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Execute a single chat-completions request (no retries).
    async fn generate_once(&self, messages: &[Message]) -> Result<String, GatewayError> {
        let url = format!("{}/chat/completions", self.base_url);

        let api_messages: Vec<serde_json::Value> = messages
            .iter()
            .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
            .collect();

        let mut payload = json!({
            "model": self.config.model,
            "messages": api_messages,
            "temperature": self.config.temperature,
        });
        if let Some(max_tokens) = self.config.max_tokens {
            payload["max_tokens"] = json!(max_tokens);
        }

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => GatewayError::Auth(text),
                429 => GatewayError::RateLimit(text),
                code => GatewayError::Api {
                    status: code,
                    message: text,
                },
            });
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::ResponseProcessing(e.to_string()))?;

        let content = data
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .ok_or(GatewayError::NoContent)?;

        if content.is_empty() {
            return Err(GatewayError::NoContent);
        }

        Ok(content.to_string())
    }
}

#[async_trait]
impl ModelGateway for OpenAiGateway {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, prompt: Prompt) -> Result<String, GatewayError> {
        if prompt.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "Prompt cannot be empty".to_string(),
            ));
        }

        let messages = prompt.into_messages();
        let mut last_error = None;

        for attempt in 0..=self.config.retry_attempts {
            let result = tokio::time::timeout(self.config.timeout, self.generate_once(&messages))
                .await
                .unwrap_or_else(|_| {
                    Err(GatewayError::Timeout(self.config.timeout.as_millis() as u64))
                });

            match result {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < self.config.retry_attempts => {
                    log::warn!(
                        "Gateway request failed (attempt {}/{}): {}, retrying...",
                        attempt + 1,
                        self.config.retry_attempts + 1,
                        e
                    );
                    last_error = Some(e);
                    tokio::time::sleep(self.config.retry_delay(attempt)).await;
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| GatewayError::Other("Retry loop exited unexpectedly".to_string())))
    }
}
