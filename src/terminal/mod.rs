//! Full-screen terminal front-end: the playlist drawn over the animated
//! gradient.

mod app;
mod layout;
mod render;

pub use app::{AnalysisOutcome, App, Effect};
pub use layout::{Layout, REMOVE_COLUMNS};
pub use render::{compose, draw, Line};

use crate::analysis::MoodAnalyzer;
use crate::gradient::{AnimationHandle, AnimationLoop, AnimatorConfig, GradientAnimator};
use anyhow::{Context, Result};
use crossterm::event::{
    DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, EventStream,
};
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{cursor, execute};
use futures::StreamExt;
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

/// Raw mode, alternate screen and mouse capture for as long as it lives.
struct TerminalGuard {
    stdout: Stdout,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableFocusChange,
            cursor::Hide
        )
        .context("Failed to set up the terminal")?;
        Ok(Self { stdout })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(
            self.stdout,
            cursor::Show,
            DisableFocusChange,
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        let _ = disable_raw_mode();
    }
}

pub struct PlayerOptions {
    pub animator: AnimatorConfig,
    pub refresh_interval: Duration,
}

fn spawn_analysis(
    analyzer: &Arc<dyn MoodAnalyzer>,
    results: &mpsc::UnboundedSender<AnalysisOutcome>,
    ticket: u64,
    title: String,
) {
    let analyzer = analyzer.clone();
    let results = results.clone();
    tokio::spawn(async move {
        let result = analyzer.analyze(&title).await;
        let _ = results.send(AnalysisOutcome { ticket, result });
    });
}

/// Carry out effects; returns `false` once the user asked to quit.
fn perform(
    effects: Vec<Effect>,
    animation: &AnimationHandle,
    analyzer: &Arc<dyn MoodAnalyzer>,
    results: &mpsc::UnboundedSender<AnalysisOutcome>,
) -> bool {
    for effect in effects {
        match effect {
            Effect::Analyze { ticket, title } => {
                debug!("Analyzing \"{}\" (#{})", title, ticket);
                spawn_analysis(analyzer, results, ticket, title);
            }
            Effect::Animator(message) => {
                animation.send(message);
            }
            Effect::Quit => return false,
        }
    }
    true
}

/// Run the interactive player until the user quits.
pub async fn run(analyzer: Arc<dyn MoodAnalyzer>, options: PlayerOptions) -> Result<()> {
    let mut guard = TerminalGuard::enter()?;
    let mut size = terminal::size().context("Failed to read terminal size")?;

    let animator = GradientAnimator::new(options.animator);
    let (frame_tx, mut frame_rx) = watch::channel(animator.frame());
    let animation = AnimationLoop::spawn(animator, options.refresh_interval, move |frame| {
        let _ = frame_tx.send(frame);
    });

    let (results_tx, mut results_rx) = mpsc::unbounded_channel();
    let mut events = EventStream::new();
    let mut app = App::new();
    let mut tick: u64 = 0;
    let mut running = true;

    info!("Player started ({}x{})", size.0, size.1);
    while running {
        tokio::select! {
            changed = frame_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                tick = tick.wrapping_add(1);
                let frame = frame_rx.borrow_and_update().clone();
                draw(&mut guard.stdout, &app, &frame, size, tick)?;
            }
            event = events.next() => match event {
                Some(Ok(event)) => {
                    if let crossterm::event::Event::Resize(width, height) = event {
                        size = (width, height);
                    }
                    let effects = app.handle_event(&event, size);
                    running = perform(effects, &animation, &analyzer, &results_tx);
                }
                Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                None => break,
            },
            Some(outcome) = results_rx.recv() => {
                let effects = app.apply_outcome(outcome);
                running = perform(effects, &animation, &analyzer, &results_tx);
            }
        }
    }

    animation.unmount().await;
    info!("Player stopped with {} songs", app.store().len());
    Ok(())
}
