//! Core `PostGenerator` trait and `ApiPostGenerator` implementation.
//!
//! `ApiPostGenerator` calls any OpenAI-compatible `/v1/chat/completions`
//! endpoint, such as OpenAI, Ollama in OpenAI mode, Groq, LM Studio or vLLM.
//! All connection details come from [`LlmConfig`]; nothing is hardcoded.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::LlmConfig;
use crate::llm::cleanup::clean_generated_html;
use crate::llm::prompt::PromptBuilder;

// ---------------------------------------------------------------------------
// LlmError
// ---------------------------------------------------------------------------

/// Errors that can occur during post generation.
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("LLM request timed out")]
    Timeout,

    /// The service answered with a non-success status.
    #[error("LLM service returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse LLM response: {0}")]
    Parse(String),

    /// The LLM returned a response with no usable text content.
    #[error("No text content in response")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// PostGenerator trait
// ---------------------------------------------------------------------------

/// Async trait turning a transcript into blog-post HTML.
///
/// Implementors return HTML that has already been through
/// [`clean_generated_html`].
#[async_trait]
pub trait PostGenerator: Send + Sync {
    async fn generate(&self, transcript: &str) -> Result<String, LlmError>;
}

// ---------------------------------------------------------------------------
// ApiPostGenerator
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/chat/completions` endpoint.
///
/// The `Authorization: Bearer …` header is attached only when
/// `config.api_key` is a non-empty string, so local providers work without
/// credentials.
pub struct ApiPostGenerator {
    client: reqwest::Client,
    config: LlmConfig,
    prompt_builder: PromptBuilder,
}

impl ApiPostGenerator {
    /// Build an `ApiPostGenerator` with the default style guide.
    pub fn from_config(config: &LlmConfig) -> Self {
        Self::with_prompt(config, PromptBuilder::default())
    }

    /// Build with a custom [`PromptBuilder`].
    pub fn with_prompt(config: &LlmConfig, prompt_builder: PromptBuilder) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
            prompt_builder,
        }
    }
}

#[async_trait]
impl PostGenerator for ApiPostGenerator {
    async fn generate(&self, transcript: &str) -> Result<String, LlmError> {
        let (system_msg, user_msg) = self.prompt_builder.build_chat(transcript);

        let url = format!("{}/v1/chat/completions", self.config.base_url);

        let body = serde_json::json!({
            "model":       self.config.model,
            "messages": [
                { "role": "system", "content": system_msg },
                { "role": "user",   "content": user_msg   }
            ],
            "stream":      false,
            "temperature": self.config.temperature,
            "max_tokens":  self.config.max_tokens
        });

        let mut req = self.client.post(&url).json(&body);

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: message.trim().to_string(),
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        parse_completion(&json)
    }
}

/// Pull the assistant text out of a chat-completions body and clean it.
fn parse_completion(json: &serde_json::Value) -> Result<String, LlmError> {
    let raw = json["choices"][0]["message"]["content"]
        .as_str()
        .ok_or(LlmError::EmptyResponse)?;

    let html = clean_generated_html(raw);
    if html.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(html)
}

// ---------------------------------------------------------------------------
// MockPostGenerator  (test-only)
// ---------------------------------------------------------------------------

/// Test double returning a fixed response and counting calls.
#[cfg(test)]
pub struct MockPostGenerator {
    response: Result<String, LlmError>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockPostGenerator {
    pub fn ok(html: impl Into<String>) -> Self {
        Self {
            response: Ok(html.into()),
            calls: Default::default(),
        }
    }

    pub fn err(error: LlmError) -> Self {
        Self {
            response: Err(error),
            calls: Default::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl PostGenerator for MockPostGenerator {
    async fn generate(&self, _transcript: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
