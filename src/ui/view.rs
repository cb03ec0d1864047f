//! Pure derivation of what a frame shows from an `Update`.
//!
//! Nothing here touches the terminal, so the renderer stays a thin mapping
//! from `NowPlayingView` to widgets and this part can be tested directly.

use crate::lyrics::SyncedLine;
use crate::state::{LyricsStatus, Update, cursor};
use crate::text_utils::{first_lines, format_time};

/// Number of lyric lines shown at once.
pub const WINDOW_LINES: usize = 7;
/// Lines shown before the current one once playback reaches the lyrics.
pub const LINES_BEFORE: usize = 3;

pub const WAITING_TEXT: &str = "Waiting for cmus... (q to quit)";
pub const SEARCHING_TEXT: &str = "(searching lyrics...)";
pub const NO_LYRICS_TEXT: &str = "(no lyrics)";
pub const LOOKUP_FAILED_TEXT: &str = "(lyrics lookup failed)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Past,
    Current,
    Upcoming,
    Placeholder,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledLine {
    pub emphasis: Emphasis,
    pub text: String,
}

impl StyledLine {
    fn new(emphasis: Emphasis, text: impl Into<String>) -> Self {
        Self {
            emphasis,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NowPlayingView {
    pub artist: String,
    pub title: String,
    /// `None` while the player reports no duration; the frame then shows
    /// the waiting placeholder instead of bar, time and lyrics.
    pub progress: Option<f64>,
    pub time: String,
    pub lyrics: Vec<StyledLine>,
    pub error: Option<String>,
}

impl NowPlayingView {
    pub fn from_update(update: &Update) -> Self {
        let track = &update.track;
        let progress = progress_ratio(track.position, track.duration);
        let lyrics = if progress.is_some() {
            lyric_window(&update.lyrics, track.position)
        } else {
            Vec::new()
        };
        Self {
            artist: track.artist.clone(),
            title: track.title.clone(),
            progress,
            time: format!(
                "{} / {}",
                format_time(track.position),
                format_time(track.duration)
            ),
            lyrics,
            error: update.err.clone(),
        }
    }
}

/// Position over duration clamped to `[0, 1]`, or `None` when duration is 0.
pub fn progress_ratio(position: u32, duration: u32) -> Option<f64> {
    if duration == 0 {
        return None;
    }
    Some((position as f64 / duration as f64).clamp(0.0, 1.0))
}

/// The lyric lines to display for the given lookup state and position.
pub fn lyric_window(lyrics: &LyricsStatus, position: u32) -> Vec<StyledLine> {
    match lyrics {
        LyricsStatus::Searching => vec![StyledLine::new(Emphasis::Placeholder, SEARCHING_TEXT)],
        LyricsStatus::Missing => vec![StyledLine::new(Emphasis::Placeholder, NO_LYRICS_TEXT)],
        LyricsStatus::Failed(_) => vec![StyledLine::new(Emphasis::Error, LOOKUP_FAILED_TEXT)],
        LyricsStatus::Found(resolved) if !resolved.lines.is_empty() => {
            synced_window(&resolved.lines, position)
        }
        LyricsStatus::Found(resolved) => match resolved.plain() {
            Some(plain) => plain_window(plain),
            None => vec![StyledLine::new(Emphasis::Placeholder, NO_LYRICS_TEXT)],
        },
    }
}

fn synced_window(lines: &[SyncedLine], position: u32) -> Vec<StyledLine> {
    let Some(idx) = cursor(lines, position) else {
        // before the first line
        return lines
            .iter()
            .take(WINDOW_LINES)
            .map(|l| StyledLine::new(Emphasis::Upcoming, l.text.as_str()))
            .collect();
    };
    let start = idx.saturating_sub(LINES_BEFORE);
    let end = (idx + (WINDOW_LINES - LINES_BEFORE)).min(lines.len());
    (start..end)
        .map(|i| {
            let emphasis = match i.cmp(&idx) {
                std::cmp::Ordering::Less => Emphasis::Past,
                std::cmp::Ordering::Equal => Emphasis::Current,
                std::cmp::Ordering::Greater => Emphasis::Upcoming,
            };
            StyledLine::new(emphasis, lines[i].text.as_str())
        })
        .collect()
}

fn plain_window(plain: &str) -> Vec<StyledLine> {
    first_lines(plain, WINDOW_LINES)
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let emphasis = if i == 0 { Emphasis::Current } else { Emphasis::Upcoming };
            StyledLine::new(emphasis, line)
        })
        .collect()
}
