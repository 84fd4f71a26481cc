//! Local models served by Ollama.

use super::provider::{
    ensure_success, CompletionOptions, LlmError, LlmProvider, HEALTH_CHECK_TIMEOUT,
};
use super::types::{CompletionResponse, FinishReason, Message};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Uses the non-streaming `/api/chat` endpoint.
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaProvider {
    /// # Arguments
    /// * `base_url` - e.g. "http://localhost:11434".
    /// * `model` - A pulled model tag, e.g. "llama3.1:8b".
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    fn chat_request<'a>(&'a self, messages: &'a [Message], options: &CompletionOptions) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            stream: false,
            format: options.json_reply.then_some("json"),
            options: ModelOptions {
                temperature: options.temperature,
                num_predict: options.max_tokens,
            },
        }
    }

    /// Whether `tag` names the configured model. Ollama appends ":latest"
    /// to untagged names.
    fn is_configured_model(&self, tag: &str) -> bool {
        tag == self.model || tag.strip_suffix(":latest") == Some(self.model.as_str())
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        let url = format!("{}/api/chat", self.base_url);
        debug!(model = %self.model, json_reply = options.json_reply, "POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(&self.chat_request(messages, options))
            .timeout(options.timeout)
            .send()
            .await
            .map_err(LlmError::from_transport)?;

        let reply: ChatResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let finish_reason = match reply.done_reason.as_deref() {
            Some("length") => FinishReason::Length,
            _ => FinishReason::Stop,
        };
        Ok(CompletionResponse::new(reply.message.content, finish_reason))
    }

    /// Lists the pulled models; a missing model is only logged, Ollama may
    /// still pull it on first use.
    async fn health_check(&self) -> Result<(), LlmError> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(HEALTH_CHECK_TIMEOUT)
            .send()
            .await
            .map_err(LlmError::from_transport)?;

        let tags: TagsResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        if !tags.models.iter().any(|m| self.is_configured_model(&m.name)) {
            warn!(
                "Model {} is not pulled, available: {:?}",
                self.model,
                tags.models.iter().map(|m| &m.name).collect::<Vec<_>>()
            );
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
    options: ModelOptions,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ModelOptions {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ReplyMessage,
    #[serde(default)]
    done_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<PulledModel>,
}

#[derive(Debug, Deserialize)]
struct PulledModel {
    name: String,
}
