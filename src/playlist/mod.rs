//! The ordered, bounded list of analyzed songs.
//!
//! Adding a song is two-phase because analysis is asynchronous:
//! [`PlaylistStore::reserve`] validates the title and holds a slot, then the
//! analysis result is applied with [`PlaylistStore::fulfil`] or
//! [`PlaylistStore::fail`]. A reservation that was cancelled (or dropped by
//! [`PlaylistStore::clear`]) before its result arrived is discarded.

mod session;

pub use session::{add_song, add_songs, AddSongError};

use crate::analysis::AnalysisError;
use crate::mood::{synthesize, HslColor, MoodRecord};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Maximum number of songs in a playlist, pending reservations included.
pub const MAX_SONGS: usize = 8;

/// An analyzed song. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Song {
    pub title: String,
    pub genre: String,
    pub mood: String,
    pub color: HslColor,
}

impl Song {
    pub fn from_record(title: impl Into<String>, record: MoodRecord) -> Self {
        let title = title.into();
        let color = synthesize(&record.mood, &title);
        Self {
            title,
            genre: record.genre,
            mood: record.mood,
            color,
        }
    }
}

/// Reasons a title is refused before any analysis is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejected {
    #[error("empty title")]
    EmptyTitle,
    #[error("list full")]
    ListFull,
    #[error("\"{0}\" is already being analyzed")]
    AlreadyPending(String),
}

/// A slot held for a title whose analysis is in flight.
#[derive(Debug)]
pub struct PendingAdd {
    ticket: u64,
    title: String,
}

impl PendingAdd {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    /// The trimmed title that will be stored.
    pub fn title(&self) -> &str {
        &self.title
    }
}

#[derive(Debug, Default)]
pub struct PlaylistStore {
    songs: Vec<Song>,
    pending: Vec<(u64, String)>,
    next_ticket: u64,
    error: Option<String>,
}

impl PlaylistStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// No more songs can be stored, even once pending analyses complete.
    pub fn is_full(&self) -> bool {
        self.songs.len() + self.pending.len() >= MAX_SONGS
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, title: &str) -> bool {
        let title = title.trim();
        self.pending.iter().any(|(_, t)| t == title)
    }

    /// Message of the last failed action, if not cleared since.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Song colors in playlist order.
    pub fn colors(&self) -> Vec<HslColor> {
        self.songs.iter().map(|s| s.color).collect()
    }

    /// Validate `title` and hold a slot for it.
    pub fn reserve(&mut self, title: &str) -> Result<PendingAdd, Rejected> {
        let title = title.trim();
        let rejection = if title.is_empty() {
            Some(Rejected::EmptyTitle)
        } else if self.is_full() {
            Some(Rejected::ListFull)
        } else if self.is_pending(title) {
            Some(Rejected::AlreadyPending(title.to_string()))
        } else {
            None
        };

        if let Some(rejected) = rejection {
            debug!("Rejected song {:?}: {}", title, rejected);
            self.error = Some(rejected.to_string());
            return Err(rejected);
        }

        self.error = None;
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.pending.push((ticket, title.to_string()));
        Ok(PendingAdd {
            ticket,
            title: title.to_string(),
        })
    }

    fn release(&mut self, ticket: u64) -> bool {
        match self.pending.iter().position(|(t, _)| *t == ticket) {
            Some(index) => {
                self.pending.remove(index);
                true
            }
            None => false,
        }
    }

    /// Store the analyzed song. Returns `None` when the reservation no
    /// longer exists and the result was discarded.
    pub fn fulfil(&mut self, pending: PendingAdd, record: MoodRecord) -> Option<&Song> {
        if !self.release(pending.ticket) {
            debug!("Discarding analysis of {:?}: reservation gone", pending.title);
            return None;
        }
        self.songs.push(Song::from_record(pending.title, record));
        self.songs.last()
    }

    /// Give the slot back and record the failure message. Returns `false`
    /// when the reservation no longer exists.
    pub fn fail(&mut self, pending: PendingAdd, error: &AnalysisError) -> bool {
        if !self.release(pending.ticket) {
            debug!("Discarding failed analysis of {:?}: reservation gone", pending.title);
            return false;
        }
        self.error = Some(error.to_string());
        true
    }

    /// Drop an in-flight reservation; its result will be discarded.
    pub fn cancel(&mut self, ticket: u64) -> bool {
        self.release(ticket)
    }

    /// Remove the song at `index`, shifting later songs down. Out-of-range
    /// indices are ignored. Clears the error message either way.
    pub fn remove(&mut self, index: usize) -> Option<Song> {
        self.error = None;
        if index < self.songs.len() {
            Some(self.songs.remove(index))
        } else {
            None
        }
    }

    /// Reset the list, dropping songs and in-flight reservations.
    pub fn clear(&mut self) {
        self.songs.clear();
        self.pending.clear();
        self.error = None;
    }
}
