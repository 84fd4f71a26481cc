use std::ops::Range;

/// Columns of the `[x]` marker in front of every song.
pub const REMOVE_COLUMNS: Range<u16> = 2..5;

const HEADER_ROW: u16 = 1;
const FIRST_SONG_ROW: u16 = 3;

/// Rows used by each part of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub header_row: u16,
    pub first_song_row: u16,
    pub input_row: Option<u16>,
    pub status_row: u16,
    pub help_row: u16,
}

impl Layout {
    pub fn compute(song_count: usize, input_visible: bool, height: u16) -> Self {
        let after_songs = FIRST_SONG_ROW + song_count as u16 + 1;
        let input_row = input_visible.then_some(after_songs);
        let status_row = match input_row {
            Some(row) => row + 1,
            None => after_songs,
        };
        Self {
            header_row: HEADER_ROW,
            first_song_row: FIRST_SONG_ROW,
            input_row,
            status_row,
            help_row: height.saturating_sub(1).max(status_row + 1),
        }
    }

    pub fn song_row(&self, index: usize) -> u16 {
        self.first_song_row + index as u16
    }

    /// Index of the song whose remove marker is at `(column, row)`.
    pub fn remove_target(&self, song_count: usize, column: u16, row: u16) -> Option<usize> {
        if !REMOVE_COLUMNS.contains(&column) || row < self.first_song_row {
            return None;
        }
        let index = (row - self.first_song_row) as usize;
        (index < song_count).then_some(index)
    }
}
