//! The [`LlmProvider`] seam and what crosses it.

use super::types::{CompletionResponse, Message};
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Longest error body kept in [`LlmError::Api`].
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Timeout for provider health probes.
pub(super) const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Sampling and transport settings for one completion.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    /// Low values keep the mood labels within the suggested vocabulary.
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
    /// Ask the backend for a bare JSON object when it has such a mode.
    /// Replies are still run through the lenient parser.
    pub json_reply: bool,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: None,
            timeout: Duration::from_secs(120),
            json_reply: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Request timeout")]
    Timeout,

    #[error("No API key configured for provider {0}")]
    MissingApiKey(&'static str),

    #[error("API key command failed: {0}")]
    KeyCommand(String),
}

impl LlmError {
    pub(super) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Connection(e.to_string())
        }
    }
}

/// Pass successful responses through; turn the rest into [`LlmError`]s
/// carrying a bounded slice of the error body.
pub(super) async fn ensure_success(response: Response) -> Result<Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(LlmError::RateLimited);
    }
    let body = response.text().await.unwrap_or_default();
    Err(LlmError::Api {
        status: status.as_u16(),
        message: body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect(),
    })
}

/// A text-completion backend.
///
/// Song analysis sends a single user prompt and reads raw text back, so
/// implementations only need plain chat completion, no tools or streaming.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short backend name, e.g. "ollama". Reported by the stats endpoint.
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError>;

    /// Cheap reachability probe, used at startup and by `/health`.
    async fn health_check(&self) -> Result<(), LlmError>;
}
