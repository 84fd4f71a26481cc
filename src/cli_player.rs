use anyhow::{bail, Context, Result};
use clap::Parser;
use mood_gradient::analysis::{MoodAnalyzer, SongAnalysisClient, SongAnalyzer};
use mood_gradient::cli_style::{get_styles, print_error, print_success};
use mood_gradient::config::{AppConfig, CliConfig, FileConfig};
use mood_gradient::gradient::AnimatorConfig;
use mood_gradient::llm::build_provider;
use mood_gradient::terminal::{self, PlayerOptions};
use std::fs::File;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build a playlist and watch its moods scroll by.
#[derive(Parser, Debug)]
#[command(styles = get_styles())]
struct CliArgs {
    /// Root URL of the analysis server.
    #[clap(long, env = "MOOD_GRADIENT_SERVER", default_value = "http://localhost:3001")]
    pub server_url: String,

    /// Timeout in seconds for each analysis request.
    #[clap(long, default_value_t = 60)]
    pub timeout_secs: u64,

    /// Ask the language model directly instead of going through a server.
    #[clap(long)]
    pub local: bool,

    /// TOML config with an [llm] section, used with --local.
    #[clap(short, long, requires = "local")]
    pub config: Option<PathBuf>,

    /// Language model backend, used with --local.
    #[clap(long, requires = "local")]
    pub llm_provider: Option<String>,

    /// Model name, used with --local.
    #[clap(long, requires = "local")]
    pub llm_model: Option<String>,

    /// Base URL of the language model API, used with --local.
    #[clap(long, requires = "local")]
    pub llm_base_url: Option<String>,

    /// API key, used with --local.
    #[clap(long, env = "LLM_API_KEY", hide_env_values = true)]
    pub llm_api_key: Option<String>,

    /// Write logs to this file. Logging is off otherwise, the screen belongs to the UI.
    #[clap(long)]
    pub log_file: Option<PathBuf>,

    /// Animation frames per second.
    #[clap(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..=120))]
    pub fps: u32,

    /// Scroll speed at the top and bottom edges is half this, in rows per frame.
    #[clap(long, default_value_t = 1.6)]
    pub sensitivity: f64,

    /// How quickly the speed follows the pointer, between 0 and 1.
    #[clap(long, default_value_t = AnimatorConfig::default().easing)]
    pub easing: f64,

    /// Scroll speed without a pointer, in rows per frame.
    #[clap(long, default_value_t = 0.12)]
    pub idle_velocity: f64,

    /// Rows per colour stop.
    #[clap(long, default_value_t = AnimatorConfig::default().stop_height)]
    pub stop_height: f64,
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("Failed to create log file {:?}", path))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")
}

fn make_analyzer(args: &CliArgs) -> Result<Arc<dyn MoodAnalyzer>> {
    if !args.local {
        info!("Using analysis server at {}", args.server_url);
        return Ok(Arc::new(SongAnalysisClient::new(
            args.server_url.clone(),
            Duration::from_secs(args.timeout_secs),
        )));
    }

    let file_config = args.config.as_deref().map(FileConfig::load).transpose()?;
    let cli_config = CliConfig {
        llm_provider: args.llm_provider.clone(),
        llm_model: args.llm_model.clone(),
        llm_base_url: args.llm_base_url.clone(),
        llm_api_key: args.llm_api_key.clone(),
        llm_timeout_secs: Some(args.timeout_secs),
        ..CliConfig::default()
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;
    let provider = build_provider(&config.llm)?;
    info!("Using {} model {} directly", provider.name(), provider.model());
    Ok(Arc::new(SongAnalyzer::new(
        provider,
        config.llm.completion_options(),
    )))
}

fn animator_config(args: &CliArgs) -> Result<AnimatorConfig> {
    for (name, value) in [
        ("--sensitivity", args.sensitivity),
        ("--easing", args.easing),
        ("--idle-velocity", args.idle_velocity),
        ("--stop-height", args.stop_height),
    ] {
        if !value.is_finite() {
            bail!("{} must be a finite number, got {}", name, value);
        }
    }
    Ok(AnimatorConfig {
        sensitivity: args.sensitivity,
        easing: args.easing.clamp(0.0, 1.0),
        idle_velocity: args.idle_velocity,
        stop_height: args.stop_height.max(1.0),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_file.as_ref())?;

    let analyzer = match make_analyzer(&args) {
        Ok(analyzer) => analyzer,
        Err(e) => {
            print_error(&format!("{:#}", e));
            return Err(e);
        }
    };

    let options = PlayerOptions {
        animator: animator_config(&args)?,
        refresh_interval: Duration::from_secs(1) / args.fps,
    };

    terminal::run(analyzer, options).await?;
    print_success("Bye!");
    Ok(())
}
