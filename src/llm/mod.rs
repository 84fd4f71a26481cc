//! LLM provider abstraction layer.
//!
//! This module provides a trait-based abstraction for LLM providers,
//! allowing song analysis to run against different backends
//! (Ollama, OpenAI-compatible services, Gemini).

mod api_key;
mod gemini;
mod ollama;
mod openai;
mod provider;
mod types;

pub use api_key::ApiKeySource;
pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAIProvider;
pub use provider::{CompletionOptions, LlmError, LlmProvider};
pub use types::{CompletionResponse, FinishReason, Message, MessageRole};

use crate::config::LlmSettings;
use anyhow::{bail, Result};
use std::sync::Arc;

/// Provider names accepted in configuration.
pub const PROVIDER_NAMES: [&str; 3] = ["ollama", "openai", "gemini"];

/// Build the provider described by the given settings.
pub fn build_provider(settings: &LlmSettings) -> Result<Arc<dyn LlmProvider>> {
    let api_key = ApiKeySource::from_settings(
        settings.api_key.as_deref(),
        settings.api_key_command.as_deref(),
    );

    let provider: Arc<dyn LlmProvider> = match settings.provider.as_str() {
        "ollama" => Arc::new(OllamaProvider::new(&settings.base_url, &settings.model)),
        "openai" => Arc::new(OpenAIProvider::new(
            &settings.base_url,
            &settings.model,
            api_key,
        )),
        "gemini" => Arc::new(GeminiProvider::new(
            &settings.base_url,
            &settings.model,
            api_key,
        )),
        other => bail!(
            "Unknown LLM provider '{}', expected one of {:?}",
            other,
            PROVIDER_NAMES
        ),
    };
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_every_known_provider() {
        for name in PROVIDER_NAMES {
            let settings = LlmSettings::for_provider(name);
            let provider = build_provider(&settings).unwrap();
            assert_eq!(provider.name(), name);
            assert_eq!(provider.model(), settings.model);
        }
    }

    #[test]
    fn rejects_unknown_provider() {
        let mut settings = LlmSettings::default();
        settings.provider = "llamafile".to_string();
        assert!(build_provider(&settings).is_err());
    }
}
