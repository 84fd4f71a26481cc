//! Google Gemini through the `generateContent` REST endpoint.

use super::api_key::ApiKeySource;
use super::provider::{
    ensure_success, CompletionOptions, LlmError, LlmProvider, HEALTH_CHECK_TIMEOUT,
};
use super::types::{CompletionResponse, FinishReason, Message, MessageRole};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key: ApiKeySource,
}

impl GeminiProvider {
    /// # Arguments
    /// * `base_url` - e.g. "https://generativelanguage.googleapis.com/v1beta".
    /// * `model` - e.g. "gemini-1.5-flash".
    /// * `api_key` - Required; requests fail with [`LlmError::MissingApiKey`] without one.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, api_key: ApiKeySource) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
        }
    }

    fn model_url(&self) -> String {
        format!("{}/models/{}", self.base_url, self.model)
    }

    async fn authorize(&self, builder: RequestBuilder) -> Result<RequestBuilder, LlmError> {
        let key = self.api_key.require("gemini").await?;
        Ok(builder.header(API_KEY_HEADER, key))
    }
}

/// System messages become the system instruction; assistant turns are
/// sent with the "model" role.
fn generate_request(messages: &[Message], options: &CompletionOptions) -> GenerateRequest {
    let instruction: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == MessageRole::System)
        .map(|m| m.content.as_str())
        .collect();

    GenerateRequest {
        system_instruction: (!instruction.is_empty()).then(|| Content::text(None, instruction.join("\n"))),
        contents: messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(|m| {
                let role = if m.role == MessageRole::Assistant { "model" } else { "user" };
                Content::text(Some(role), m.content.clone())
            })
            .collect(),
        generation_config: GenerationConfig {
            temperature: options.temperature,
            max_output_tokens: options.max_tokens,
            response_mime_type: options.json_reply.then_some("application/json"),
        },
    }
}

fn into_completion(response: GenerateResponse) -> Result<CompletionResponse, LlmError> {
    let candidate = response.candidates.into_iter().next().ok_or_else(|| {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates".to_string());
        LlmError::InvalidResponse(format!("reply has no candidates ({})", reason))
    })?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();
    let finish_reason = match candidate.finish_reason.as_deref() {
        None | Some("STOP") => FinishReason::Stop,
        Some("MAX_TOKENS") => FinishReason::Length,
        Some(_) => FinishReason::Other,
    };
    Ok(CompletionResponse::new(text, finish_reason))
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        let url = format!("{}:generateContent", self.model_url());
        debug!(model = %self.model, json_reply = options.json_reply, "POST {}", url);

        let builder = self
            .client
            .post(&url)
            .json(&generate_request(messages, options))
            .timeout(options.timeout);
        let response = self
            .authorize(builder)
            .await?
            .send()
            .await
            .map_err(LlmError::from_transport)?;

        let reply: GenerateResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        into_completion(reply)
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        let builder = self.client.get(self.model_url()).timeout(HEALTH_CHECK_TIMEOUT);
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
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: String) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part { text }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn system_messages_become_the_instruction() {
        let messages = vec![
            Message::system("Rispondi solo in JSON"),
            Message::user("Canzone: \"Azzurro\""),
            Message::assistant("ok"),
        ];
        let body =
            serde_json::to_value(generate_request(&messages, &CompletionOptions::default())).unwrap();

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Rispondi solo in JSON");
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["contents"].as_array().unwrap().len(), 2);
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert!(body["generationConfig"].get("maxOutputTokens").is_none());
    }

    #[test]
    fn reply_parts_are_joined() {
        let reply: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "```json\n"}, {"text": "{}\n```"}]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        let completion = into_completion(reply).unwrap();
        assert_eq!(completion.text(), "```json\n{}\n```");
        assert_eq!(completion.finish_reason, FinishReason::Stop);
    }

    #[test]
    fn blocked_prompt_names_the_reason() {
        let reply: GenerateResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        let err = into_completion(reply).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[tokio::test]
    async fn missing_key_is_reported_before_any_request() {
        let provider = GeminiProvider::new("http://127.0.0.1:9", "gemini-1.5-flash", ApiKeySource::None);
        let result = provider
            .complete(&[Message::user("Volare")], &CompletionOptions::default())
            .await;
        assert!(matches!(result, Err(LlmError::MissingApiKey("gemini"))));
    }
}
