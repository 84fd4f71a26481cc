mod file_config;

pub use file_config::{FileConfig, LlmFileConfig};

use crate::llm::{CompletionOptions, PROVIDER_NAMES};
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_LLM_PROVIDER: &str = "ollama";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub cors_origin: Option<String>,
    pub llm_provider: Option<String>,
    pub llm_base_url: Option<String>,
    pub llm_model: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_api_key_command: Option<String>,
    pub llm_temperature: Option<f32>,
    pub llm_timeout_secs: Option<u64>,
    pub llm_json_mode: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub cors_origin: String,
    pub llm: LlmSettings,
}

/// Which language model answers analysis requests, and how.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub provider: String,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub api_key_command: Option<String>,
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Request the backend's JSON output mode. Some OpenAI-compatible
    /// servers reject it.
    pub json_mode: bool,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self::for_provider(DEFAULT_LLM_PROVIDER)
    }
}

impl LlmSettings {
    /// Settings with the public endpoint and a small default model for
    /// `provider`. Unknown names keep the Ollama endpoint.
    pub fn for_provider(provider: &str) -> Self {
        let (base_url, model) = match provider {
            "openai" => ("https://api.openai.com/v1", "gpt-4o-mini"),
            "gemini" => (
                "https://generativelanguage.googleapis.com/v1beta",
                "gemini-1.5-flash",
            ),
            _ => ("http://localhost:11434", "llama3.1:8b"),
        };
        Self {
            provider: provider.to_string(),
            base_url: base_url.to_string(),
            model: model.to_string(),
            api_key: None,
            api_key_command: None,
            temperature: 0.3,
            timeout_secs: 120,
            json_mode: true,
        }
    }

    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: self.temperature,
            timeout: Duration::from_secs(self.timeout_secs),
            json_reply: self.json_mode,
            ..CompletionOptions::default()
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);

        let logging_level = match file.logging_level {
            Some(s) => match parse_logging_level(&s) {
                Some(level) => level,
                None => bail!(
                    "Invalid logging_level '{}', expected one of none, path, headers, body",
                    s
                ),
            },
            None => cli.logging_level.clone(),
        };

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let cors_origin = file
            .cors_origin
            .or_else(|| cli.cors_origin.clone())
            .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());
        if cors_origin.parse::<axum::http::HeaderValue>().is_err() {
            bail!("cors_origin is not a valid header value: {:?}", cors_origin);
        }

        let llm = resolve_llm(cli, file.llm.unwrap_or_default())?;

        Ok(Self {
            port,
            logging_level,
            frontend_dir_path,
            cors_origin,
            llm,
        })
    }
}

fn resolve_llm(cli: &CliConfig, file: LlmFileConfig) -> Result<LlmSettings> {
    let provider = file
        .provider
        .or_else(|| cli.llm_provider.clone())
        .unwrap_or_else(|| DEFAULT_LLM_PROVIDER.to_string())
        .to_lowercase();
    if !PROVIDER_NAMES.contains(&provider.as_str()) {
        bail!(
            "Unknown LLM provider '{}', expected one of {:?}",
            provider,
            PROVIDER_NAMES
        );
    }

    let defaults = LlmSettings::for_provider(&provider);

    let base_url = file
        .base_url
        .or_else(|| cli.llm_base_url.clone())
        .unwrap_or(defaults.base_url);
    let model = file
        .model
        .or_else(|| cli.llm_model.clone())
        .unwrap_or(defaults.model);
    let api_key = file.api_key.or_else(|| cli.llm_api_key.clone());
    let api_key_command = file
        .api_key_command
        .or_else(|| cli.llm_api_key_command.clone());

    let temperature = file
        .temperature
        .or(cli.llm_temperature)
        .unwrap_or(defaults.temperature);
    if !temperature.is_finite() || temperature < 0.0 {
        bail!("LLM temperature must be a non-negative number, got {}", temperature);
    }

    let timeout_secs = file
        .timeout_secs
        .or(cli.llm_timeout_secs)
        .unwrap_or(defaults.timeout_secs);
    if timeout_secs == 0 {
        bail!("LLM timeout_secs must be greater than zero");
    }

    let json_mode = file
        .json_mode
        .or(cli.llm_json_mode)
        .unwrap_or(defaults.json_mode);

    Ok(LlmSettings {
        provider,
        base_url,
        model,
        api_key,
        api_key_command,
        temperature,
        timeout_secs,
        json_mode,
    })
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
