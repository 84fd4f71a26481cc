//! OpenAI-compatible chat completions (OpenAI, OpenRouter, vLLM, ...).

use super::api_key::ApiKeySource;
use super::provider::{
    ensure_success, CompletionOptions, LlmError, LlmProvider, HEALTH_CHECK_TIMEOUT,
};
use super::types::{CompletionResponse, FinishReason, Message};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub struct OpenAIProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key: ApiKeySource,
}

impl OpenAIProvider {
    /// # Arguments
    /// * `base_url` - API root including the version, e.g. "https://api.openai.com/v1".
    /// * `model` - e.g. "gpt-4o-mini".
    /// * `api_key` - Self-hosted servers often need none.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, api_key: ApiKeySource) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
        }
    }

    async fn authorize(&self, builder: RequestBuilder) -> Result<RequestBuilder, LlmError> {
        Ok(match self.api_key.resolve().await? {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        })
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
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            response_format: options.json_reply.then_some(ResponseFormat {
                kind: "json_object",
            }),
        }
    }
}

fn into_completion(response: ChatResponse) -> Result<CompletionResponse, LlmError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse("reply has no choices".to_string()))?;

    let finish_reason = match choice.finish_reason.as_deref() {
        None | Some("stop") => FinishReason::Stop,
        Some("length") => FinishReason::Length,
        Some(_) => FinishReason::Other,
    };
    Ok(CompletionResponse::new(
        choice.message.content.unwrap_or_default(),
        finish_reason,
    ))
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(model = %self.model, json_reply = options.json_reply, "POST {}", url);

        let builder = self
            .client
            .post(&url)
            .json(&self.chat_request(messages, options))
            .timeout(options.timeout);
        let response = self
            .authorize(builder)
            .await?
            .send()
            .await
            .map_err(LlmError::from_transport)?;

        let reply: ChatResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        into_completion(reply)
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        let builder = self
            .client
            .get(format!("{}/models", self.base_url))
            .timeout(HEALTH_CHECK_TIMEOUT);
        let response = self
            .authorize(builder)
            .await?
            .send()
            .await
            .map_err(LlmError::from_transport)?;
        ensure_success(response).await.map(|_| ())
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    content: Option<String>,
}
