//! Scripted language model used in place of a real provider.

use super::constants::*;
use async_trait::async_trait;
use mood_gradient::llm::{
    CompletionOptions, CompletionResponse, FinishReason, LlmError, LlmProvider, Message,
    MessageRole,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// How the scripted model answers one song.
#[derive(Clone, Debug)]
pub enum Script {
    Reply(String),
    /// Reply after a delay, to reorder concurrent requests.
    DelayedReply(String, Duration),
    Fail,
}

impl Script {
    /// A fenced JSON reply, the way hosted models usually answer.
    pub fn fenced(genre: &str, mood: &str) -> Self {
        Script::Reply(format!(
            "```json\n{{\"genere\": \"{}\", \"umore\": \"{}\"}}\n```",
            genre, mood
        ))
    }
}

pub struct ScriptedProvider {
    scripts: Mutex<HashMap<String, Script>>,
    healthy: bool,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            healthy: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Knows songs A, B and C, answers one title with prose and fails on another.
    pub fn standard() -> Self {
        Self::new()
            .with(SONG_A, Script::fenced(GENRE, MOOD_A))
            .with(
                SONG_B,
                Script::Reply(format!(
                    "Certo! Ecco l'analisi: {{\"genere\": \"{}\", \"umore\": \"{}\"}} Spero ti piaccia.",
                    GENRE, MOOD_B
                )),
            )
            .with(
                SONG_C,
                Script::Reply(format!("{{\"genre\": \"{}\", \"mood\": \"{}\"}}", GENRE, MOOD_C)),
            )
            .with(
                SONG_UNPARSEABLE,
                Script::Reply("Sure! {genere: Pop...'".to_string()),
            )
            .with(SONG_PROVIDER_ERROR, Script::Fail)
    }

    pub fn with(self, title: &str, script: Script) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(title.to_string(), script);
        self
    }

    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The prompt ends with `Canzone: "<title>"`.
    fn title_from_prompt(prompt: &str) -> Option<&str> {
        let start = prompt.rfind("Canzone: \"")? + "Canzone: \"".len();
        prompt[start..].strip_suffix('"')
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-1"
    }

    async fn complete(
        &self,
        messages: &[Message],
        _options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let prompt = messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        let script = Self::title_from_prompt(prompt)
            .and_then(|title| self.scripts.lock().unwrap().get(title).cloned())
            .unwrap_or_else(|| Script::Reply("Non conosco questa canzone.".to_string()));

        let text = match script {
            Script::Reply(text) => text,
            Script::DelayedReply(text, delay) => {
                tokio::time::sleep(delay).await;
                text
            }
            Script::Fail => {
                return Err(LlmError::Api {
                    status: 503,
                    message: "model overloaded".to_string(),
                })
            }
        };

        Ok(CompletionResponse::new(text, FinishReason::Stop))
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        if self.healthy {
            Ok(())
        } else {
            Err(LlmError::Connection("scripted outage".to_string()))
        }
    }
}
