//! Line-oriented terminal renderer for transcript and gallery snapshots.

use std::io::Write;

use client_core::{GalleryCard, GalleryRenderer, TranscriptLine, TranscriptRenderer};
use shared::domain::Variant;

const USER_PREFIX: &str = "you › ";
const BOT_PREFIX: &str = "bot › ";
const CONTINUATION: &str = "      ";

pub struct TerminalRenderer<W: Write> {
    out: W,
    transcript: Vec<(String, Variant)>,
    gallery: Vec<String>,
    recommending: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            transcript: Vec::new(),
            gallery: Vec::new(),
            recommending: false,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(err) = writeln!(self.out, "{text}").and_then(|()| self.out.flush()) {
            tracing::warn!(error = %err, "terminal: write failed");
        }
    }
}

pub fn format_line(line: &TranscriptLine<'_>) -> String {
    let prefix = match line.variant {
        Variant::User => USER_PREFIX,
        Variant::Bot => BOT_PREFIX,
    };
    let mut rendered = String::new();
    for (i, part) in line.content.split('\n').enumerate() {
        if i > 0 {
            rendered.push('\n');
            rendered.push_str(CONTINUATION);
        } else {
            rendered.push_str(prefix);
        }
        rendered.push_str(part);
    }
    rendered
}

pub fn format_card(card: &GalleryCard<'_>) -> String {
    let mut rendered = format!("{:>2}. {}", card.position + 1, card.title);
    if let Some(year) = card.year {
        rendered.push_str(&format!(" ({year})"));
    }
    if let Some(rating) = &card.rating {
        rendered.push_str(&format!("  ★ {rating}"));
    }
    rendered.push_str(&format!("\n    {}", card.poster));
    rendered
}

impl<W: Write> TranscriptRenderer for TerminalRenderer<W> {
    fn render_transcript(&mut self, lines: &[TranscriptLine<'_>]) {
        let appended = lines.len() >= self.transcript.len()
            && self
                .transcript
                .iter()
                .zip(lines)
                .all(|((content, variant), line)| content == line.content && *variant == line.variant);

        let fresh = if appended {
            &lines[self.transcript.len()..]
        } else {
            self.emit("────────");
            lines
        };
        for line in fresh {
            let text = format_line(line);
            self.emit(&text);
        }

        self.transcript = lines
            .iter()
            .map(|line| (line.content.to_string(), line.variant))
            .collect();
    }
}

impl<W: Write> GalleryRenderer for TerminalRenderer<W> {
    fn render_gallery(&mut self, cards: &[GalleryCard<'_>]) {
        let formatted: Vec<String> = cards.iter().map(format_card).collect();
        if formatted == self.gallery {
            return;
        }
        if !formatted.is_empty() {
            self.emit("🎬 recommended");
            for card in &formatted {
                self.emit(card);
            }
        }
        self.gallery = formatted;
    }

    fn render_loading(&mut self, recommending: bool) {
        if recommending && !self.recommending {
            self.emit("   … (recommend in progress, you can keep chatting)");
        }
        self.recommending = recommending;
    }
}

#[cfg(test)]
#[path = "tests/terminal_tests.rs"]
mod tests;
