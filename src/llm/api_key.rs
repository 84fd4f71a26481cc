//! Where hosted providers get their API key from.

use super::provider::LlmError;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

const KEY_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiKeySource {
    None,
    Static(String),
    /// Shell command printing a key on stdout, run before every request so
    /// rotating tokens stay fresh.
    Command(String),
}

impl ApiKeySource {
    /// A static key wins over a command.
    pub fn from_settings(api_key: Option<&str>, api_key_command: Option<&str>) -> Self {
        match (api_key, api_key_command) {
            (Some(key), _) if !key.trim().is_empty() => ApiKeySource::Static(key.trim().to_string()),
            (_, Some(command)) if !command.trim().is_empty() => {
                ApiKeySource::Command(command.to_string())
            }
            _ => ApiKeySource::None,
        }
    }

    pub async fn resolve(&self) -> Result<Option<String>, LlmError> {
        match self {
            ApiKeySource::None => Ok(None),
            ApiKeySource::Static(key) => Ok(Some(key.clone())),
            ApiKeySource::Command(command) => run_key_command(command).await.map(Some),
        }
    }

    /// Like [`ApiKeySource::resolve`], but a missing key is an error.
    pub async fn require(&self, provider: &'static str) -> Result<String, LlmError> {
        self.resolve()
            .await?
            .ok_or(LlmError::MissingApiKey(provider))
    }
}

async fn run_key_command(command: &str) -> Result<String, LlmError> {
    debug!("Running API key command");
    let output = tokio::time::timeout(
        KEY_COMMAND_TIMEOUT,
        Command::new("sh").arg("-c").arg(command).output(),
    )
    .await
    .map_err(|_| {
        warn!("API key command timed out after {:?}", KEY_COMMAND_TIMEOUT);
        LlmError::KeyCommand("timed out".to_string())
    })?
    .map_err(|e| LlmError::KeyCommand(format!("could not start: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(status = %output.status, "API key command failed: {}", stderr.trim());
        return Err(LlmError::KeyCommand(format!("exited with {}", output.status)));
    }

    let key = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if key.is_empty() {
        return Err(LlmError::KeyCommand("printed an empty key".to_string()));
    }
    Ok(key)
}
