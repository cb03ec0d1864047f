// state.rs: State data structures for lyrics and player

use crate::cache::{CacheEntry, LyricsCache, ResolvedLyrics, cache_key};
use crate::lyrics::SyncedLine;
use crate::player::TrackSnapshot;
use std::collections::HashSet;
use std::sync::Arc;

/// What is known about the lyrics of the live track.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LyricsStatus {
    /// A lookup is in flight or has not been issued yet.
    #[default]
    Searching,
    /// The store has no lyrics for this track.
    Missing,
    /// The lookup failed; revisiting the track tries again.
    Failed(String),
    Found(Arc<ResolvedLyrics>),
}

impl From<&CacheEntry> for LyricsStatus {
    fn from(entry: &CacheEntry) -> Self {
        match entry {
            CacheEntry::Found(resolved) => LyricsStatus::Found(resolved.clone()),
            CacheEntry::Missing => LyricsStatus::Missing,
        }
    }
}

/// Represents a UI update for lyrics and player state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    pub track: TrackSnapshot,
    pub lyrics: LyricsStatus,
    pub err: Option<String>,
    pub version: u64, // Incremented on any state change
}

impl Update {
    /// Synced line active at the reported position, if any.
    pub fn cursor(&self) -> Option<usize> {
        match &self.lyrics {
            LyricsStatus::Found(resolved) => cursor(&resolved.lines, self.track.position),
            _ => None,
        }
    }
}

/// Index of the last line whose time is at or before `position`.
///
/// `None` means playback is before the first line (or there are no lines).
/// `lines` must be sorted by time.
pub fn cursor(lines: &[SyncedLine], position: u32) -> Option<usize> {
    lines.partition_point(|line| line.time <= position).checked_sub(1)
}

/// All mutable state, owned by the event loop.
#[derive(Debug, Default)]
pub struct StateBundle {
    /// Last snapshot from a successful poll; `None` before the first one.
    pub track: Option<TrackSnapshot>,
    pub lyrics: LyricsStatus,
    pub cache: LyricsCache,
    /// Keys with a lookup currently running.
    pub in_flight: HashSet<String>,
    pub err: Option<String>,
    pub version: u64, // Incremented on any state change
}

impl StateBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key of the live track, if any.
    pub fn live_key(&self) -> Option<String> {
        self.track.as_ref().map(|t| cache_key(&t.artist, &t.title))
    }

    pub fn is_live(&self, key: &str) -> bool {
        self.live_key().as_deref() == Some(key)
    }

    /// Refresh duration and position of the unchanged live track.
    pub fn update_playback(&mut self, snapshot: &TrackSnapshot) {
        if let Some(track) = self.track.as_mut()
            && (track.position != snapshot.position || track.duration != snapshot.duration)
        {
            track.position = snapshot.position;
            track.duration = snapshot.duration;
            self.version += 1;
        }
    }

    pub fn set_lyrics(&mut self, lyrics: LyricsStatus) {
        self.lyrics = lyrics;
        self.version += 1;
    }

    pub fn set_err(&mut self, err: Option<String>) {
        if self.err != err {
            self.err = err;
            self.version += 1;
        }
    }

    pub fn to_update(&self) -> Update {
        Update {
            track: self.track.clone().unwrap_or_default(),
            lyrics: self.lyrics.clone(),
            err: self.err.clone(),
            version: self.version,
        }
    }
}
