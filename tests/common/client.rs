//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per server endpoint.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::json;
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// POST /analyze-song
    pub async fn analyze_song(&self, title: &str) -> Response {
        self.analyze_song_raw(json!({ "songTitle": title })).await
    }

    /// POST /analyze-song with an arbitrary JSON body
    pub async fn analyze_song_raw(&self, body: serde_json::Value) -> Response {
        self.client
            .post(format!("{}/analyze-song", self.base_url))
            .json(&body)
            .send()
            .await
            .expect("Analyze request failed")
    }

    /// GET /
    pub async fn stats(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Stats request failed")
    }

    /// GET /health
    pub async fn health(&self) -> Response {
        self.client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .expect("Health request failed")
    }
}
