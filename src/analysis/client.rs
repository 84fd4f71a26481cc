//! HTTP client for the `/analyze-song` endpoint.

use super::{AnalysisError, MoodAnalyzer};
use crate::mood::MoodRecord;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Body of `POST /analyze-song`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeSongRequest {
    #[serde(rename = "songTitle")]
    pub song_title: String,
}

/// Successful reply of `POST /analyze-song`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeSongResponse {
    #[serde(alias = "genre")]
    pub genere: String,
    #[serde(alias = "mood")]
    pub umore: String,
}

impl From<MoodRecord> for AnalyzeSongResponse {
    fn from(record: MoodRecord) -> Self {
        Self {
            genere: record.genre,
            umore: record.mood,
        }
    }
}

impl From<AnalyzeSongResponse> for MoodRecord {
    fn from(response: AnalyzeSongResponse) -> Self {
        MoodRecord::new(response.genere, response.umore)
    }
}

/// Error body returned by the endpoint with a status >= 400.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// Calls a remote analysis server. One request per call, no retries.
#[derive(Clone)]
pub struct SongAnalysisClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl SongAnalysisClient {
    /// # Arguments
    /// * `base_url` - Server root, e.g. "http://localhost:3001".
    /// * `timeout` - Upper bound for the whole request.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn status_message(status: reqwest::StatusCode, body: &str) -> String {
        match serde_json::from_str::<ErrorResponse>(body) {
            Ok(ErrorResponse {
                error,
                details: Some(details),
            }) => format!("{} ({})", error, details),
            Ok(ErrorResponse { error, .. }) => error,
            Err(_) if !body.trim().is_empty() => body.trim().to_string(),
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        }
    }
}

#[async_trait]
impl MoodAnalyzer for SongAnalysisClient {
    async fn analyze(&self, title: &str) -> Result<MoodRecord, AnalysisError> {
        let url = format!("{}/analyze-song", self.base_url);
        debug!(title = %title, url = %url, "Requesting song analysis");

        let response = self
            .client
            .post(&url)
            .json(&AnalyzeSongRequest {
                song_title: title.to_string(),
            })
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AnalysisError::Transport {
                title: title.to_string(),
                message: if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    e.to_string()
                },
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = Self::status_message(status, &body);
            warn!(title = %title, status = status.as_u16(), "Song analysis failed: {}", message);
            return Err(AnalysisError::Status {
                title: title.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let body: AnalyzeSongResponse =
            response
                .json()
                .await
                .map_err(|e| AnalysisError::InvalidResponse {
                    title: title.to_string(),
                    message: e.to_string(),
                })?;

        debug!(title = %title, genre = %body.genere, mood = %body.umore, "Song analyzed");
        Ok(body.into())
    }
}
