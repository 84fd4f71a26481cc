//! Front-end state and input handling, independent of the actual terminal.

use super::layout::Layout;
use crate::analysis::AnalysisError;
use crate::gradient::{AnimatorMessage, PointerEvent};
use crate::mood::MoodRecord;
use crate::playlist::{PendingAdd, PlaylistStore, MAX_SONGS};
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use tracing::debug;

/// Result of an analysis started by [`Effect::Analyze`].
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub ticket: u64,
    pub result: Result<MoodRecord, AnalysisError>,
}

/// Work the event loop must carry out on behalf of the [`App`].
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Analyze { ticket: u64, title: String },
    Animator(AnimatorMessage),
    Quit,
}

#[derive(Debug, Default)]
pub struct App {
    store: PlaylistStore,
    input: String,
    in_flight: Option<PendingAdd>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &PlaylistStore {
        &self.store
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Title currently being analyzed, if any.
    pub fn pending_title(&self) -> Option<&str> {
        self.in_flight.as_ref().map(PendingAdd::title)
    }

    pub fn input_visible(&self) -> bool {
        self.store.len() < MAX_SONGS
    }

    fn input_enabled(&self) -> bool {
        self.input_visible() && self.in_flight.is_none()
    }

    fn colors_changed(&self) -> Vec<Effect> {
        vec![Effect::Animator(AnimatorMessage::SetColors(
            self.store.colors(),
        ))]
    }

    pub fn handle_event(&mut self, event: &Event, size: (u16, u16)) -> Vec<Effect> {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse, size),
            Event::FocusLost => vec![Effect::Animator(AnimatorMessage::Pointer(
                PointerEvent::Leave,
            ))],
            _ => vec![],
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> Vec<Effect> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Esc => vec![Effect::Quit],
            KeyCode::Char('c') if ctrl => vec![Effect::Quit],
            KeyCode::Char('d') if ctrl => self.clear(),
            // Digits remove songs when they cannot be typed into the input.
            KeyCode::Char(c @ '1'..='8') if alt || !self.input_visible() => {
                self.remove(c as usize - '1' as usize)
            }
            KeyCode::Char(c) if !ctrl && !alt => {
                if self.input_enabled() {
                    self.input.push(c);
                }
                vec![]
            }
            KeyCode::Backspace => {
                if self.input_enabled() {
                    self.input.pop();
                }
                vec![]
            }
            KeyCode::Enter => self.submit(),
            _ => vec![],
        }
    }

    pub fn handle_mouse(&mut self, mouse: &MouseEvent, size: (u16, u16)) -> Vec<Effect> {
        let (_, height) = size;
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                vec![Effect::Animator(AnimatorMessage::Pointer(
                    PointerEvent::Move {
                        y: mouse.row as f64 + 0.5,
                        top: 0.0,
                        height: height as f64,
                    },
                ))]
            }
            MouseEventKind::Down(MouseButton::Left) => {
                let layout = Layout::compute(self.store.len(), self.input_visible(), height);
                match layout.remove_target(self.store.len(), mouse.column, mouse.row) {
                    Some(index) => self.remove(index),
                    None => vec![],
                }
            }
            _ => vec![],
        }
    }

    /// Reserve a slot for the typed title and ask for its analysis.
    pub fn submit(&mut self) -> Vec<Effect> {
        if !self.input_enabled() {
            return vec![];
        }
        match self.store.reserve(&self.input) {
            Ok(pending) => {
                self.input.clear();
                let effect = Effect::Analyze {
                    ticket: pending.ticket(),
                    title: pending.title().to_string(),
                };
                self.in_flight = Some(pending);
                vec![effect]
            }
            Err(rejected) => {
                debug!("Submission rejected: {}", rejected);
                vec![]
            }
        }
    }

    pub fn remove(&mut self, index: usize) -> Vec<Effect> {
        match self.store.remove(index) {
            Some(song) => {
                debug!("Removed \"{}\"", song.title);
                self.colors_changed()
            }
            None => vec![],
        }
    }

    /// Empty the playlist. An analysis still running is discarded on arrival.
    pub fn clear(&mut self) -> Vec<Effect> {
        self.store.clear();
        self.in_flight = None;
        self.input.clear();
        self.colors_changed()
    }

    pub fn apply_outcome(&mut self, outcome: AnalysisOutcome) -> Vec<Effect> {
        let pending = match self.in_flight.take() {
            Some(pending) if pending.ticket() == outcome.ticket => pending,
            other => {
                debug!("Discarding stale analysis result #{}", outcome.ticket);
                self.in_flight = other;
                return vec![];
            }
        };

        match outcome.result {
            Ok(record) => match self.store.fulfil(pending, record) {
                Some(_) => self.colors_changed(),
                None => vec![],
            },
            Err(e) => {
                self.store.fail(pending, &e);
                vec![]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mood::synthesize;
    use crossterm::event::KeyEventState;

    const SIZE: (u16, u16) = (80, 24);

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn key_with(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_event(&key(KeyCode::Char(c)), SIZE);
        }
    }

    fn add(app: &mut App, title: &str, mood: &str) {
        type_text(app, title);
        let effects = app.handle_event(&key(KeyCode::Enter), SIZE);
        let ticket = match &effects[..] {
            [Effect::Analyze { ticket, .. }] => *ticket,
            other => panic!("unexpected effects {:?}", other),
        };
        app.apply_outcome(AnalysisOutcome {
            ticket,
            result: Ok(MoodRecord::new("Pop", mood)),
        });
    }

    fn click(column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn submit_starts_analysis_and_locks_input() {
        let mut app = App::new();
        type_text(&mut app, "Volare");
        assert_eq!(app.input(), "Volare");

        let effects = app.handle_event(&key(KeyCode::Enter), SIZE);
        assert_eq!(
            effects,
            vec![Effect::Analyze {
                ticket: 0,
                title: "Volare".to_string()
            }]
        );
        assert_eq!(app.input(), "");
        assert_eq!(app.pending_title(), Some("Volare"));

        type_text(&mut app, "x");
        assert_eq!(app.input(), "");
        assert!(app.handle_event(&key(KeyCode::Enter), SIZE).is_empty());
    }

    #[test]
    fn successful_outcome_updates_colors() {
        let mut app = App::new();
        type_text(&mut app, "Azzurro");
        app.handle_event(&key(KeyCode::Enter), SIZE);

        let effects = app.apply_outcome(AnalysisOutcome {
            ticket: 0,
            result: Ok(MoodRecord::new("Pop", "allegro")),
        });

        assert_eq!(
            effects,
            vec![Effect::Animator(AnimatorMessage::SetColors(vec![
                synthesize("allegro", "Azzurro")
            ]))]
        );
        assert!(app.pending_title().is_none());
        assert_eq!(app.store().len(), 1);
    }

    #[test]
    fn failed_outcome_shows_error() {
        let mut app = App::new();
        type_text(&mut app, "Nowhere");
        app.handle_event(&key(KeyCode::Enter), SIZE);

        let effects = app.apply_outcome(AnalysisOutcome {
            ticket: 0,
            result: Err(AnalysisError::Transport {
                title: "Nowhere".to_string(),
                message: "connection refused".to_string(),
            }),
        });

        assert!(effects.is_empty());
        assert!(app.store().error().unwrap().contains("\"Nowhere\""));
        assert!(app.pending_title().is_none());
        type_text(&mut app, "a");
        assert_eq!(app.input(), "a");
    }

    #[test]
    fn empty_submission_sets_error_without_analysis() {
        let mut app = App::new();
        type_text(&mut app, "   ");
        assert!(app.handle_event(&key(KeyCode::Enter), SIZE).is_empty());
        assert_eq!(app.store().error(), Some("empty title"));
    }

    #[test]
    fn clear_discards_late_result() {
        let mut app = App::new();
        add(&mut app, "A", "triste");
        type_text(&mut app, "B");
        app.handle_event(&key(KeyCode::Enter), SIZE);

        let effects = app.handle_event(
            &key_with(KeyCode::Char('d'), KeyModifiers::CONTROL),
            SIZE,
        );
        assert_eq!(
            effects,
            vec![Effect::Animator(AnimatorMessage::SetColors(vec![]))]
        );

        let effects = app.apply_outcome(AnalysisOutcome {
            ticket: 1,
            result: Ok(MoodRecord::new("Pop", "allegro")),
        });
        assert!(effects.is_empty());
        assert!(app.store().is_empty());
    }

    #[test]
    fn alt_digit_removes_song() {
        let mut app = App::new();
        add(&mut app, "A", "triste");
        add(&mut app, "B", "allegro");
        type_text(&mut app, "2");
        assert_eq!(app.input(), "2");

        let effects = app.handle_event(&key_with(KeyCode::Char('1'), KeyModifiers::ALT), SIZE);
        assert_eq!(effects.len(), 1);
        assert_eq!(app.store().songs()[0].title, "B");
        assert_eq!(app.input(), "2");
    }

    #[test]
    fn plain_digit_removes_when_list_is_full() {
        let mut app = App::new();
        for i in 0..MAX_SONGS {
            add(&mut app, &format!("S{}", i), "calmo");
        }
        assert!(!app.input_visible());

        app.handle_event(&key(KeyCode::Char('8')), SIZE);
        assert_eq!(app.store().len(), MAX_SONGS - 1);
        assert!(app.input_visible());
    }

    #[test]
    fn clicking_remove_marker_removes_song() {
        let mut app = App::new();
        add(&mut app, "A", "triste");
        add(&mut app, "B", "allegro");
        let layout = Layout::compute(2, true, SIZE.1);

        // Text of the row, not the marker
        assert!(app
            .handle_event(&click(20, layout.song_row(1)), SIZE)
            .is_empty());

        app.handle_event(&click(3, layout.song_row(1)), SIZE);
        assert_eq!(app.store().len(), 1);
        assert_eq!(app.store().songs()[0].title, "A");
    }

    #[test]
    fn pointer_events_drive_animator() {
        let mut app = App::new();
        let moved = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Moved,
            column: 10,
            row: 5,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(
            app.handle_event(&moved, SIZE),
            vec![Effect::Animator(AnimatorMessage::Pointer(
                PointerEvent::Move {
                    y: 5.5,
                    top: 0.0,
                    height: 24.0
                }
            ))]
        );
        assert_eq!(
            app.handle_event(&Event::FocusLost, SIZE),
            vec![Effect::Animator(AnimatorMessage::Pointer(
                PointerEvent::Leave
            ))]
        );
    }

    #[test]
    fn quit_keys() {
        let mut app = App::new();
        assert_eq!(app.handle_event(&key(KeyCode::Esc), SIZE), vec![Effect::Quit]);
        assert_eq!(
            app.handle_event(&key_with(KeyCode::Char('c'), KeyModifiers::CONTROL), SIZE),
            vec![Effect::Quit]
        );
    }

    #[test]
    fn key_release_is_ignored() {
        let mut app = App::new();
        let release = Event::Key(KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        app.handle_event(&release, SIZE);
        assert_eq!(app.input(), "");
    }
}
