//! In-process analysis against a language model.

use super::{analysis_prompt, AnalysisError, MoodAnalyzer};
use crate::llm::{CompletionOptions, FinishReason, LlmError, LlmProvider, Message};
use crate::mood::{parse_mood_response_or_fallback, MoodRecord};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Asks an [`LlmProvider`] for a song's genre and mood.
///
/// Provider failures are returned as errors; an undecodable reply is not an
/// error and degrades to [`MoodRecord::fallback`].
#[derive(Clone)]
pub struct SongAnalyzer {
    provider: Arc<dyn LlmProvider>,
    options: CompletionOptions,
}

impl SongAnalyzer {
    pub fn new(provider: Arc<dyn LlmProvider>, options: CompletionOptions) -> Self {
        Self { provider, options }
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    pub async fn analyze_song(&self, title: &str) -> Result<MoodRecord, LlmError> {
        let messages = [Message::user(analysis_prompt(title))];
        let response = self.provider.complete(&messages, &self.options).await?;

        debug!(
            provider = self.provider.name(),
            title = %title,
            "Raw model reply: {:?}",
            response.text()
        );
        if response.finish_reason != FinishReason::Stop {
            warn!(
                title = %title,
                finish_reason = ?response.finish_reason,
                "Model reply did not finish normally"
            );
        }

        Ok(parse_mood_response_or_fallback(response.text()))
    }
}

#[async_trait]
impl MoodAnalyzer for SongAnalyzer {
    async fn analyze(&self, title: &str) -> Result<MoodRecord, AnalysisError> {
        self.analyze_song(title)
            .await
            .map_err(|source| AnalysisError::Provider {
                title: title.to_string(),
                source,
            })
    }
}
