//! Shared constants for end-to-end tests
//!
//! When the scripted model replies change, update only this file.

// ============================================================================
// Songs known to the scripted model
// ============================================================================

pub const SONG_A: &str = "A";
pub const SONG_B: &str = "B";
pub const SONG_C: &str = "C";

pub const MOOD_A: &str = "triste";
pub const MOOD_B: &str = "allegro";
pub const MOOD_C: &str = "calmo";

/// Title the scripted model answers with prose only.
pub const SONG_UNPARSEABLE: &str = "Canzone Misteriosa";

/// Title the scripted model fails on.
pub const SONG_PROVIDER_ERROR: &str = "Errore";

/// Genre the scripted model gives every known song.
pub const GENRE: &str = "Pop";

// ============================================================================
// Expected server messages
// ============================================================================

pub const MISSING_TITLE_ERROR: &str = "Missing song title.";
pub const ANALYSIS_FAILED_ERROR: &str = "Internal server error while analysing the song.";

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Interval between readiness checks (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;

/// Per-request timeout for test clients (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 5;
