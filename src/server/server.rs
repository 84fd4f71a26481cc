use anyhow::{Context, Result};
use std::time::Duration;

use tracing::{error, info, warn};

use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;

#[cfg(feature = "slowdown")]
use super::slowdown_request;
use super::{log_requests, state::*, ServerConfig};
use crate::analysis::{AnalyzeSongResponse, ErrorResponse, SongAnalyzer};

pub const MISSING_TITLE_MESSAGE: &str = "Missing song title.";
pub const ANALYSIS_FAILED_MESSAGE: &str = "Internal server error while analysing the song.";
pub const MODEL_UNAVAILABLE_MESSAGE: &str = "Language model unavailable.";

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub provider: String,
    pub model: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let provider = state.analyzer.provider();
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        provider: provider.name().to_string(),
        model: provider.model().to_string(),
    };
    Json(stats)
}

async fn health(State(analyzer): State<SongAnalyzer>) -> Response {
    match analyzer.provider().health_check().await {
        Ok(()) => Json(serde_json::json!({ "status": "ok" })).into_response(),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::with_details(
                    MODEL_UNAVAILABLE_MESSAGE,
                    e.to_string(),
                )),
            )
                .into_response()
        }
    }
}

/// Any body that is not a JSON object with a non-blank string `songTitle`
/// counts as a missing title.
fn song_title(body: Result<Json<Value>, JsonRejection>) -> Option<String> {
    let Json(value) = body.ok()?;
    let title = value.get("songTitle")?.as_str()?.trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

async fn analyze_song(
    State(analyzer): State<SongAnalyzer>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let title = match song_title(body) {
        Some(title) => title,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(MISSING_TITLE_MESSAGE)),
            )
                .into_response()
        }
    };

    match analyzer.analyze_song(&title).await {
        Ok(record) => {
            info!(
                "Analyzed \"{}\": {} / {}",
                title, record.genre, record.mood
            );
            Json(AnalyzeSongResponse::from(record)).into_response()
        }
        Err(e) => {
            error!("Error analysing \"{}\": {}", title, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::with_details(
                    ANALYSIS_FAILED_MESSAGE,
                    e.to_string(),
                )),
            )
                .into_response()
        }
    }
}

fn make_cors_layer(origin: &str) -> Result<CorsLayer> {
    let origin: HeaderValue = origin
        .parse()
        .with_context(|| format!("Invalid CORS origin: {:?}", origin))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]))
}

pub fn make_app(config: ServerConfig, analyzer: SongAnalyzer) -> Result<Router> {
    let state = ServerState::new(config.clone(), analyzer);

    let api_routes: Router = Router::new()
        .route("/analyze-song", post(analyze_song))
        .route("/health", get(health))
        .with_state(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    #[allow(unused_mut)]
    let mut app: Router = home_router.merge(api_routes);

    #[cfg(feature = "slowdown")]
    {
        app = app.layer(middleware::from_fn(slowdown_request));
    }
    let app = app
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .layer(make_cors_layer(&config.cors_origin)?);

    Ok(app)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, shutting down"),
        Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
    }
}

pub async fn run_server(config: ServerConfig, analyzer: SongAnalyzer) -> Result<()> {
    let port = config.port;
    let app = make_app(config, analyzer)?;

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}
