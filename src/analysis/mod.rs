//! Song analysis: turning a title into a [`MoodRecord`].
//!
//! Two implementations share the [`MoodAnalyzer`] seam:
//! - [`SongAnalysisClient`] calls a remote `/analyze-song` endpoint
//! - [`SongAnalyzer`] talks to an [`LlmProvider`](crate::llm::LlmProvider) in-process

mod analyzer;
mod client;
mod prompt;

pub use analyzer::SongAnalyzer;
pub use client::{AnalyzeSongRequest, AnalyzeSongResponse, ErrorResponse, SongAnalysisClient};
pub use prompt::analysis_prompt;

use crate::llm::LlmError;
use crate::mood::MoodRecord;
use async_trait::async_trait;
use thiserror::Error;

/// Failure of a single analysis attempt. Every variant names the song so
/// the message can be shown to the user as-is.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Could not reach the analysis service for \"{title}\": {message}")]
    Transport { title: String, message: String },

    #[error("Analysis of \"{title}\" failed (status {status}): {message}")]
    Status {
        title: String,
        status: u16,
        message: String,
    },

    #[error("Analysis of \"{title}\" returned an unreadable response: {message}")]
    InvalidResponse { title: String, message: String },

    #[error("Analysis of \"{title}\" failed: {source}")]
    Provider {
        title: String,
        #[source]
        source: LlmError,
    },
}

impl AnalysisError {
    /// Title of the song whose analysis failed.
    pub fn title(&self) -> &str {
        match self {
            AnalysisError::Transport { title, .. }
            | AnalysisError::Status { title, .. }
            | AnalysisError::InvalidResponse { title, .. }
            | AnalysisError::Provider { title, .. } => title,
        }
    }
}

/// Anything that can infer the mood of a song from its title.
///
/// One call is one attempt; implementations do not retry.
#[async_trait]
pub trait MoodAnalyzer: Send + Sync {
    async fn analyze(&self, title: &str) -> Result<MoodRecord, AnalysisError>;
}
