//! Async helpers running the whole add flow against a [`MoodAnalyzer`].

use super::{PendingAdd, PlaylistStore, Rejected, Song};
use crate::analysis::{AnalysisError, MoodAnalyzer};
use crate::mood::MoodRecord;
use futures::future::join_all;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum AddSongError {
    #[error(transparent)]
    Rejected(#[from] Rejected),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("\"{0}\" was removed before its analysis completed")]
    Discarded(String),
}

fn apply(
    store: &mut PlaylistStore,
    pending: PendingAdd,
    outcome: Result<MoodRecord, AnalysisError>,
) -> Result<Song, AddSongError> {
    match outcome {
        Ok(record) => {
            let title = pending.title().to_string();
            match store.fulfil(pending, record) {
                Some(song) => {
                    info!(
                        "Added \"{}\" ({} / {}) as {}",
                        song.title, song.genre, song.mood, song.color
                    );
                    Ok(song.clone())
                }
                None => Err(AddSongError::Discarded(title)),
            }
        }
        Err(e) => {
            store.fail(pending, &e);
            Err(e.into())
        }
    }
}

/// Validate, analyze and append one song.
///
/// On failure the store is left without the song and its error message is
/// set; nothing is retried.
pub async fn add_song<A>(
    store: &mut PlaylistStore,
    analyzer: &A,
    title: &str,
) -> Result<Song, AddSongError>
where
    A: MoodAnalyzer + ?Sized,
{
    let pending = store.reserve(title)?;
    let outcome = analyzer.analyze(pending.title()).await;
    apply(store, pending, outcome)
}

/// Add several songs with their analyses running concurrently.
///
/// Each title is reserved up front in submission order, so capacity and
/// duplicate checks see the whole batch. Results are applied in submission
/// order regardless of which analysis finishes first; the returned vector
/// has one entry per title.
pub async fn add_songs<A>(
    store: &mut PlaylistStore,
    analyzer: &A,
    titles: &[&str],
) -> Vec<Result<Song, AddSongError>>
where
    A: MoodAnalyzer + ?Sized,
{
    let mut results: Vec<(usize, Result<Song, AddSongError>)> = Vec::with_capacity(titles.len());
    let mut in_flight: Vec<(usize, PendingAdd)> = Vec::new();

    for (index, title) in titles.iter().enumerate() {
        match store.reserve(title) {
            Ok(pending) => in_flight.push((index, pending)),
            Err(rejected) => results.push((index, Err(rejected.into()))),
        }
    }

    let outcomes = join_all(
        in_flight
            .iter()
            .map(|(_, pending)| analyzer.analyze(pending.title())),
    )
    .await;

    for ((index, pending), outcome) in in_flight.into_iter().zip(outcomes) {
        results.push((index, apply(store, pending, outcome)));
    }

    results.sort_by_key(|(index, _)| *index);
    results.into_iter().map(|(_, result)| result).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mood::synthesize;
    use crate::playlist::MAX_SONGS;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Analyzer answering from a table, after a per-title delay.
    #[derive(Default)]
    struct TableAnalyzer {
        moods: HashMap<String, (&'static str, u64)>,
        calls: AtomicUsize,
    }

    impl TableAnalyzer {
        fn with(mut self, title: &str, mood: &'static str, delay_ms: u64) -> Self {
            self.moods.insert(title.to_string(), (mood, delay_ms));
            self
        }
    }

    #[async_trait]
    impl MoodAnalyzer for TableAnalyzer {
        async fn analyze(&self, title: &str) -> Result<MoodRecord, AnalysisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.moods.get(title) {
                Some((mood, delay_ms)) => {
                    tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                    Ok(MoodRecord::new("Pop", *mood))
                }
                None => Err(AnalysisError::Status {
                    title: title.to_string(),
                    status: 500,
                    message: "Internal server error while analysing the song.".to_string(),
                }),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn three_songs_produce_three_colors_in_order() {
        let analyzer = TableAnalyzer::default()
            .with("A", "triste", 0)
            .with("B", "allegro", 0)
            .with("C", "calmo", 0);
        let mut store = PlaylistStore::new();

        for title in ["A", "B", "C"] {
            add_song(&mut store, &analyzer, title).await.unwrap();
        }

        assert_eq!(
            store.colors(),
            vec![
                synthesize("triste", "A"),
                synthesize("allegro", "B"),
                synthesize("calmo", "C"),
            ]
        );
    }

    #[tokio::test]
    async fn rejected_title_is_never_analyzed() {
        let analyzer = TableAnalyzer::default();
        let mut store = PlaylistStore::new();

        let err = add_song(&mut store, &analyzer, "  ").await.unwrap_err();
        assert!(matches!(err, AddSongError::Rejected(Rejected::EmptyTitle)));
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_analysis_sets_error_and_leaves_list_unchanged() {
        let analyzer = TableAnalyzer::default().with("Known", "calmo", 0);
        let mut store = PlaylistStore::new();
        add_song(&mut store, &analyzer, "Known").await.unwrap();

        let err = add_song(&mut store, &analyzer, "Unknown").await.unwrap_err();
        assert!(matches!(err, AddSongError::Analysis(_)));
        assert_eq!(store.len(), 1);
        assert!(store.error().unwrap().contains("\"Unknown\""));
        assert!(!store.is_full());
    }

    #[tokio::test(start_paused = true)]
    async fn batch_applies_results_in_submission_order() {
        // The first title finishes last.
        let analyzer = TableAnalyzer::default()
            .with("Slow", "triste", 300)
            .with("Medium", "allegro", 200)
            .with("Fast", "calmo", 100);
        let mut store = PlaylistStore::new();

        let results = add_songs(&mut store, &analyzer, &["Slow", "Medium", "Fast"]).await;

        assert!(results.iter().all(|r| r.is_ok()));
        let titles: Vec<&str> = store.songs().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Slow", "Medium", "Fast"]);
    }

    #[tokio::test(start_paused = true)]
    async fn batch_reports_each_failure_in_place() {
        let analyzer = TableAnalyzer::default()
            .with("One", "calmo", 10)
            .with("Three", "vivace", 5);
        let mut store = PlaylistStore::new();

        let results = add_songs(&mut store, &analyzer, &["One", "Two", "", "Three", "One"]).await;

        assert_eq!(results.len(), 5);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(AddSongError::Analysis(_))));
        assert!(matches!(
            results[2],
            Err(AddSongError::Rejected(Rejected::EmptyTitle))
        ));
        assert!(results[3].is_ok());
        assert!(matches!(
            results[4],
            Err(AddSongError::Rejected(Rejected::AlreadyPending(_)))
        ));
        assert_eq!(store.len(), 2);
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn batch_never_exceeds_capacity() {
        let titles: Vec<String> = (0..MAX_SONGS + 3).map(|i| format!("Song {}", i)).collect();
        let mut analyzer = TableAnalyzer::default();
        for title in &titles {
            analyzer = analyzer.with(title, "pop", 1);
        }
        let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
        let mut store = PlaylistStore::new();

        let results = add_songs(&mut store, &analyzer, &refs).await;

        assert_eq!(store.len(), MAX_SONGS);
        let full = results
            .iter()
            .filter(|r| matches!(r, Err(AddSongError::Rejected(Rejected::ListFull))))
            .count();
        assert_eq!(full, 3);
    }
}
