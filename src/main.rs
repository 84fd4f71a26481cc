use anyhow::{Context, Result};
use clap::Parser;
use mood_gradient::cli_style::get_styles;
use mood_gradient::config::{AppConfig, CliConfig, FileConfig, DEFAULT_PORT};
use mood_gradient::llm::{build_provider, PROVIDER_NAMES};
use mood_gradient::server::{run_server, RequestsLoggingLevel, ServerConfig};
use mood_gradient::SongAnalyzer;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_provider(s: &str) -> Result<String, String> {
    let name = s.to_lowercase();
    if PROVIDER_NAMES.contains(&name.as_str()) {
        Ok(name)
    } else {
        Err(format!("expected one of {}", PROVIDER_NAMES.join(", ")))
    }
}

/// Serves the song analysis endpoint backed by a language model.
#[derive(Parser, Debug)]
#[command(styles = get_styles())]
struct CliArgs {
    /// Path to a TOML config file. Its values override the flags below.
    #[clap(short, long)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Browser origin allowed to call the API.
    #[clap(long)]
    pub cors_origin: Option<String>,

    /// Language model backend.
    #[clap(long, value_parser = parse_provider)]
    pub llm_provider: Option<String>,

    /// Base URL of the language model API. Defaults to the provider's public endpoint.
    #[clap(long)]
    pub llm_base_url: Option<String>,

    /// Model name.
    #[clap(long)]
    pub llm_model: Option<String>,

    /// API key for providers that need one.
    #[clap(long, env = "LLM_API_KEY", hide_env_values = true)]
    pub llm_api_key: Option<String>,

    /// Shell command printing the API key, run on every request.
    #[clap(long)]
    pub llm_api_key_command: Option<String>,

    /// Sampling temperature.
    #[clap(long)]
    pub llm_temperature: Option<f32>,

    /// Timeout in seconds for each model request.
    #[clap(long)]
    pub llm_timeout_secs: Option<u64>,

    /// Ask the model for a bare JSON reply. Disable for servers that reject JSON mode.
    #[clap(long)]
    pub llm_json_mode: Option<bool>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            port: self.port,
            logging_level: self.logging_level.clone(),
            frontend_dir_path: self.frontend_dir_path.clone(),
            cors_origin: self.cors_origin.clone(),
            llm_provider: self.llm_provider.clone(),
            llm_base_url: self.llm_base_url.clone(),
            llm_model: self.llm_model.clone(),
            llm_api_key: self.llm_api_key.clone(),
            llm_api_key_command: self.llm_api_key_command.clone(),
            llm_temperature: self.llm_temperature,
            llm_timeout_secs: self.llm_timeout_secs,
            llm_json_mode: self.llm_json_mode,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    let provider = build_provider(&config.llm)?;
    info!(
        "Using {} model {} at {}",
        provider.name(),
        provider.model(),
        config.llm.base_url
    );
    if let Err(e) = provider.health_check().await {
        warn!("Language model is not reachable yet: {}", e);
    }

    let analyzer = SongAnalyzer::new(provider, config.llm.completion_options());

    info!("Ready to serve at port {}!", config.port);
    info!("Accepting browser requests from {}", config.cors_origin);
    run_server(ServerConfig::from(&config), analyzer).await
}
