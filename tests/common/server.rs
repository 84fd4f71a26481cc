//! Analysis servers for end-to-end tests
//!
//! Each test gets its own server on a random port, answering from its own
//! scripted model.

use super::constants::*;
use super::fixtures::ScriptedProvider;
use mood_gradient::llm::CompletionOptions;
use mood_gradient::server::{server::make_app, RequestsLoggingLevel, ServerConfig};
use mood_gradient::SongAnalyzer;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Test server instance backed by a [`ScriptedProvider`]
///
/// When dropped, the server gracefully shuts down.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// The scripted model, for inspecting calls
    pub provider: Arc<ScriptedProvider>,

    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server answering with [`ScriptedProvider::standard`]
    pub async fn spawn() -> Self {
        Self::spawn_with(ScriptedProvider::standard()).await
    }

    /// Spawns a new test server on a random port
    ///
    /// # Panics
    ///
    /// Panics if port binding fails or the server doesn't become ready
    /// within timeout.
    pub async fn spawn_with(provider: ScriptedProvider) -> Self {
        let provider = Arc::new(provider);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            ..ServerConfig::default()
        };
        let analyzer = SongAnalyzer::new(provider.clone(), CompletionOptions::default());
        let app = make_app(config, analyzer).expect("Failed to build app");

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            provider,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Polls the stats endpoint, which answers even when the model is
    /// unhealthy, until the server responds.
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");
        let stats_url = format!("{}/", self.base_url);

        let poll = async {
            loop {
                if let Ok(response) = client.get(&stats_url).send().await {
                    if response.status().is_success() {
                        return;
                    }
                }
                tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
            }
        };

        tokio::time::timeout(Duration::from_millis(SERVER_READY_TIMEOUT_MS), poll)
            .await
            .unwrap_or_else(|_| {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                )
            });
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
