use axum::extract::FromRef;
use std::time::Instant;

use super::ServerConfig;
use crate::analysis::SongAnalyzer;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub analyzer: SongAnalyzer,
}

impl ServerState {
    pub fn new(config: ServerConfig, analyzer: SongAnalyzer) -> Self {
        ServerState {
            config,
            start_time: Instant::now(),
            analyzer,
        }
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for SongAnalyzer {
    fn from_ref(input: &ServerState) -> Self {
        input.analyzer.clone()
    }
}
