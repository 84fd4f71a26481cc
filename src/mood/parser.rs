//! Extraction of a [`MoodRecord`] from raw language-model text.
//!
//! Models are asked for a bare JSON object but routinely wrap it in a fenced
//! block or surround it with prose. Candidates are tried in order:
//! 1. the interior of the first fenced block (any language tag);
//! 2. the greedy slice from the first `{` to the last `}`;
//! 3. the whole text.
//!
//! The brace slice is deliberately not bracket-matched: prose containing its
//! own braces around the object makes the slice undecodable.
//!
//! A fenced block that fails to decode does not end the search: the brace
//! slice and the whole text are still tried. This is more lenient than using
//! the fence contents alone, and only rescues replies that would otherwise
//! fall back.

use super::{MoodRecord, FALLBACK_GENRE, FALLBACK_MOOD};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

lazy_static! {
    static ref FENCED_BLOCK: Regex =
        Regex::new(r"(?s)```(?:[A-Za-z0-9_+-]+)?\s*(.*?)\s*```").unwrap();
}

/// Raw model text that could not be coerced into a [`MoodRecord`].
#[derive(Debug, Error)]
#[error("Could not decode mood record from model reply: {source}")]
pub struct ParseFailure {
    /// The unmodified model reply.
    pub raw: String,
    #[source]
    pub source: serde_json::Error,
}

/// Wire shape accepted from the model. Italian and English keys may both
/// be present; the Italian one wins unless it is blank.
#[derive(Debug, Deserialize)]
struct RawMoodRecord {
    #[serde(default)]
    genere: Option<String>,
    #[serde(default)]
    genre: Option<String>,
    #[serde(default)]
    umore: Option<String>,
    #[serde(default)]
    mood: Option<String>,
}

impl From<RawMoodRecord> for MoodRecord {
    fn from(raw: RawMoodRecord) -> Self {
        fn pick(preferred: Option<String>, other: Option<String>, default: &str) -> String {
            [preferred, other]
                .into_iter()
                .flatten()
                .map(|v| v.trim().to_string())
                .find(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        }
        MoodRecord {
            genre: pick(raw.genere, raw.genre, FALLBACK_GENRE),
            mood: pick(raw.umore, raw.mood, FALLBACK_MOOD),
        }
    }
}

fn fenced_interior(text: &str) -> Option<&str> {
    FENCED_BLOCK
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn brace_slice(text: &str) -> Option<&str> {
    let first = text.find('{')?;
    let last = text.rfind('}')?;
    if first > last {
        return None;
    }
    Some(&text[first..=last])
}

fn decode(candidate: &str) -> Result<MoodRecord, serde_json::Error> {
    serde_json::from_str::<RawMoodRecord>(candidate).map(MoodRecord::from)
}

/// Parse a model reply into a [`MoodRecord`].
///
/// Missing or blank fields are filled with the fallback genre and mood.
/// Fails only when no candidate decodes as a JSON object with string fields;
/// the reported error is the one from the most specific candidate.
pub fn parse_mood_response(text: &str) -> Result<MoodRecord, ParseFailure> {
    let mut first_error: Option<serde_json::Error> = None;

    for candidate in [fenced_interior(text), brace_slice(text)]
        .into_iter()
        .flatten()
    {
        match decode(candidate) {
            Ok(record) => return Ok(record),
            Err(e) => {
                debug!("Mood candidate rejected ({}): {:?}", e, candidate);
                first_error.get_or_insert(e);
            }
        }
    }

    decode(text.trim()).map_err(|e| ParseFailure {
        raw: text.to_string(),
        source: first_error.unwrap_or(e),
    })
}

/// Like [`parse_mood_response`], but a parse failure degrades to
/// [`MoodRecord::fallback`] so the caller still gets a usable record.
pub fn parse_mood_response_or_fallback(text: &str) -> MoodRecord {
    match parse_mood_response(text) {
        Ok(record) => record,
        Err(failure) => {
            warn!(
                "Falling back to neutral mood: {} (raw reply: {:?})",
                failure, failure.raw
            );
            MoodRecord::fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_fenced_block() {
        let text = "```json\n{\"genere\":\"Pop\",\"umore\":\"allegro\"}\n```";
        let record = parse_mood_response(text).unwrap();
        assert_eq!(record, MoodRecord::new("Pop", "allegro"));
    }

    #[test]
    fn parses_untagged_fence_surrounded_by_prose() {
        let text = "Ecco l'analisi:\n```\n{\"genere\": \"Jazz\", \"umore\": \"calmo\"}\n```\nSpero aiuti!";
        let record = parse_mood_response(text).unwrap();
        assert_eq!(record, MoodRecord::new("Jazz", "calmo"));
    }

    #[test]
    fn parses_object_embedded_in_prose() {
        let text = "Sure! Here it is: {\"genere\": \"Rock\", \"umore\": \"energetico\"} Enjoy.";
        let record = parse_mood_response(text).unwrap();
        assert_eq!(record, MoodRecord::new("Rock", "energetico"));
    }

    #[test]
    fn accepts_english_field_names() {
        let record = parse_mood_response(r#"{"genre":"Metal","mood":"aggressivo"}"#).unwrap();
        assert_eq!(record, MoodRecord::new("Metal", "aggressivo"));
    }

    #[test]
    fn mixed_language_keys_prefer_italian() {
        let record =
            parse_mood_response(r#"{"genere":"Pop","genre":"Pop","umore":"allegro"}"#).unwrap();
        assert_eq!(record, MoodRecord::new("Pop", "allegro"));

        let record = parse_mood_response(
            r#"{"genere":"Cantautorato","genre":"Singer-songwriter","umore":"","mood":"malinconico"}"#,
        )
        .unwrap();
        assert_eq!(record, MoodRecord::new("Cantautorato", "malinconico"));
    }

    #[test]
    fn missing_fields_use_fallback_values() {
        let record = parse_mood_response(r#"{"umore":"triste"}"#).unwrap();
        assert_eq!(record, MoodRecord::new(FALLBACK_GENRE, "triste"));

        let record = parse_mood_response(r#"{"genere":"Pop","umore":"   "}"#).unwrap();
        assert_eq!(record, MoodRecord::new("Pop", FALLBACK_MOOD));

        let record = parse_mood_response("{}").unwrap();
        assert!(record.is_fallback());
    }

    #[test]
    fn truncated_json_is_a_parse_failure() {
        let text = "Sure! {genere: Pop...'";
        let failure = parse_mood_response(text).unwrap_err();
        assert_eq!(failure.raw, text);

        assert_eq!(
            parse_mood_response_or_fallback(text),
            MoodRecord::new("Sconosciuto", "neutro")
        );
    }

    #[test]
    fn brace_slice_is_greedy_not_balanced() {
        // The slice runs from the first `{` to the last `}`, swallowing the
        // prose between the two objects, so nothing decodes.
        let text = r#"Nota {vedi sotto} poi {"genere":"Pop","umore":"calmo"}"#;
        assert_eq!(
            brace_slice(text),
            Some(r#"{vedi sotto} poi {"genere":"Pop","umore":"calmo"}"#)
        );
        assert!(parse_mood_response(text).is_err());
    }

    #[test]
    fn invalid_fence_falls_through_to_brace_slice() {
        let text = "```\nnot json\n``` but later {\"genere\":\"Folk\",\"umore\":\"rilassante\"}";
        let record = parse_mood_response(text).unwrap();
        assert_eq!(record, MoodRecord::new("Folk", "rilassante"));
    }

    #[test]
    fn non_string_field_is_rejected() {
        assert!(parse_mood_response(r#"{"genere": 5, "umore": "calmo"}"#).is_err());
    }

    #[test]
    fn empty_text_is_a_parse_failure() {
        assert!(parse_mood_response("").is_err());
        assert!(parse_mood_response_or_fallback("   ").is_fallback());
    }
}
