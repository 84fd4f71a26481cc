//! Mood Gradient Library
//!
//! Turns song titles into mood-derived colors and renders them as a
//! continuously scrolling gradient. Exposes the internal modules for the
//! server and terminal binaries, and for testing.

pub mod analysis;
pub mod cli_style;
pub mod config;
pub mod gradient;
pub mod llm;
pub mod mood;
pub mod playlist;
pub mod server;
pub mod terminal;

// Re-export commonly used types for convenience
pub use analysis::{AnalysisError, MoodAnalyzer, SongAnalysisClient, SongAnalyzer};
pub use gradient::{AnimationHandle, AnimationLoop, AnimatorConfig, GradientAnimator};
pub use mood::{synthesize, HslColor, MoodRecord, ParseFailure};
pub use playlist::{PlaylistStore, Rejected, Song, MAX_SONGS};
pub use server::{run_server, RequestsLoggingLevel};
