//! Mood inference results and their mapping to colors.
//!
//! - `parser` recovers a [`MoodRecord`] from free-form model output
//! - `color` turns a mood label and a song title into a deterministic color

mod color;
mod parser;

pub use color::{synthesize, title_hash, HslColor, NEUTRAL_COLOR};
pub use parser::{parse_mood_response, parse_mood_response_or_fallback, ParseFailure};

use serde::{Deserialize, Serialize};

/// Genre used when the model did not provide one.
pub const FALLBACK_GENRE: &str = "Sconosciuto";

/// Mood used when the model did not provide one.
pub const FALLBACK_MOOD: &str = "neutro";

/// Genre and mood of a single song, as inferred by one analysis call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodRecord {
    pub genre: String,
    pub mood: String,
}

impl MoodRecord {
    pub fn new(genre: impl Into<String>, mood: impl Into<String>) -> Self {
        Self {
            genre: genre.into(),
            mood: mood.into(),
        }
    }

    /// The record substituted when a model reply cannot be decoded.
    pub fn fallback() -> Self {
        Self::new(FALLBACK_GENRE, FALLBACK_MOOD)
    }

    pub fn is_fallback(&self) -> bool {
        self.genre == FALLBACK_GENRE && self.mood == FALLBACK_MOOD
    }
}
