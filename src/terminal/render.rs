use super::app::App;
use super::layout::Layout;
use crate::cli_style::{error_color_on, glyphs, rgb, text_color_on};
use crate::gradient::GradientFrame;
use crate::playlist::MAX_SONGS;
use crossterm::style::{Color, Print, SetBackgroundColor, SetForegroundColor};
use crossterm::{cursor::MoveTo, queue};
use std::io::Write;

const HELP: &str = "Enter add · Alt+1-8 or click [x] remove · Ctrl-D clear · Esc quit";

/// One fully styled terminal row.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub background: (u8, u8, u8),
    pub foreground: Color,
    pub text: String,
}

fn fit(text: &str, width: usize) -> String {
    let mut fitted: String = text.chars().take(width).collect();
    let len = fitted.chars().count();
    fitted.extend(std::iter::repeat(' ').take(width - len));
    fitted
}

fn row_text(app: &App, layout: &Layout, row: u16, tick: u64) -> (String, bool) {
    let songs = app.store().songs();
    if row == layout.header_row {
        return (
            format!("  mood gradient  {}/{}", songs.len(), MAX_SONGS),
            false,
        );
    }
    if let Some(index) = layout.remove_target(songs.len(), 2, row) {
        let song = &songs[index];
        return (
            format!(
                "  {} {}. {}  ({}, {})",
                glyphs::REMOVE,
                index + 1,
                song.title,
                song.genre,
                song.mood
            ),
            false,
        );
    }
    if Some(row) == layout.input_row {
        let text = match app.pending_title() {
            Some(title) => {
                let spinner = glyphs::SPINNER[(tick as usize / 4) % glyphs::SPINNER.len()];
                format!("  {} Analyzing \"{}\"...", spinner, title)
            }
            None => format!("  {} {}_", glyphs::PROMPT, app.input()),
        };
        return (text, false);
    }
    if row == layout.status_row {
        if let Some(error) = app.store().error() {
            return (format!("  {}", error), true);
        }
        if layout.input_row.is_none() {
            return (format!("  Playlist full ({} songs)", MAX_SONGS), false);
        }
    }
    if row == layout.help_row {
        return (format!("  {}", HELP), false);
    }
    (String::new(), false)
}

/// Every row of the screen: the gradient as background, UI text on top.
pub fn compose(app: &App, frame: &GradientFrame, size: (u16, u16), tick: u64) -> Vec<Line> {
    let (width, height) = size;
    let layout = Layout::compute(app.store().len(), app.input_visible(), height);
    (0..height)
        .map(|row| {
            let background = frame.sample(row as f64 + 0.5);
            let (text, is_error) = row_text(app, &layout, row, tick);
            let foreground = if is_error {
                error_color_on(background)
            } else {
                text_color_on(background)
            };
            Line {
                background,
                foreground,
                text: fit(&text, width as usize),
            }
        })
        .collect()
}

pub fn draw<W: Write>(
    out: &mut W,
    app: &App,
    frame: &GradientFrame,
    size: (u16, u16),
    tick: u64,
) -> std::io::Result<()> {
    for (row, line) in compose(app, frame, size, tick).into_iter().enumerate() {
        queue!(
            out,
            MoveTo(0, row as u16),
            SetBackgroundColor(rgb(line.background)),
            SetForegroundColor(line.foreground),
            Print(line.text)
        )?;
    }
    out.flush()
}
