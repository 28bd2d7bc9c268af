//! Renderer contracts consumed by the session controller's subscribers.
//!
//! Renderers receive pre-shaped, ordered lines and cards. Position only feeds
//! reveal timing; it never identifies an entry.

use std::time::Duration;

use futures::{Stream, StreamExt};
use shared::domain::{Message, Movie, Variant};

use crate::session::SessionSnapshot;

pub const FALLBACK_POSTER: &str =
    "https://images.unsplash.com/photo-1536440136628-849c177e76a1?auto=format&fit=crop&q=80&w=800";

pub const TRANSCRIPT_STAGGER: Duration = Duration::from_millis(50);
pub const GALLERY_STAGGER: Duration = Duration::from_millis(80);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscriptLine<'a> {
    pub content: &'a str,
    pub variant: Variant,
    pub position: usize,
}

impl TranscriptLine<'_> {
    pub fn reveal_delay(&self) -> Duration {
        stagger(TRANSCRIPT_STAGGER, self.position)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryCard<'a> {
    pub title: &'a str,
    pub year: Option<i32>,
    pub poster: &'a str,
    /// One decimal place, absent when the movie is unrated.
    pub rating: Option<String>,
    pub position: usize,
}

impl GalleryCard<'_> {
    pub fn reveal_delay(&self) -> Duration {
        stagger(GALLERY_STAGGER, self.position)
    }
}

fn stagger(step: Duration, position: usize) -> Duration {
    step.saturating_mul(u32::try_from(position).unwrap_or(u32::MAX))
}

pub fn transcript_lines(messages: &[Message]) -> Vec<TranscriptLine<'_>> {
    messages
        .iter()
        .enumerate()
        .map(|(position, message)| TranscriptLine {
            content: &message.content,
            variant: message.variant,
            position,
        })
        .collect()
}

pub fn gallery_cards(movies: &[Movie]) -> Vec<GalleryCard<'_>> {
    movies
        .iter()
        .enumerate()
        .map(|(position, movie)| GalleryCard {
            title: &movie.title,
            year: movie.year,
            poster: movie.poster.as_deref().unwrap_or(FALLBACK_POSTER),
            // A zero rating means the title has no votes yet.
            rating: movie
                .rating
                .filter(|rating| *rating > 0.0)
                .map(|rating| format!("{rating:.1}")),
            position,
        })
        .collect()
}

pub trait TranscriptRenderer {
    /// Called with the full ordered transcript on every change. Must be
    /// idempotent.
    fn render_transcript(&mut self, lines: &[TranscriptLine<'_>]);
}

pub trait GalleryRenderer {
    fn render_gallery(&mut self, cards: &[GalleryCard<'_>]);

    fn render_loading(&mut self, _recommending: bool) {}
}

pub fn paint<R>(snapshot: &SessionSnapshot, renderer: &mut R)
where
    R: TranscriptRenderer + GalleryRenderer + ?Sized,
{
    renderer.render_transcript(&transcript_lines(&snapshot.messages));
    renderer.render_gallery(&gallery_cards(&snapshot.movies));
    renderer.render_loading(snapshot.is_recommending);
}

/// Repaints on every published snapshot until the stream ends.
pub async fn run_renderers<S, R>(mut snapshots: S, renderer: &mut R)
where
    S: Stream<Item = SessionSnapshot> + Unpin,
    R: TranscriptRenderer + GalleryRenderer + ?Sized,
{
    while let Some(snapshot) = snapshots.next().await {
        paint(&snapshot, renderer);
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
