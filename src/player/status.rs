//! Parsing of the line-oriented `cmus-remote -Q` status output.
//!
//! The output looks like:
//!
//! ```text
//! status playing
//! file /music/radiohead/ok computer/06 karma police.flac
//! duration 258
//! position 42
//! tag artist Radiohead
//! tag title Karma Police
//! ```
//!
//! Only the artist, title, duration and position lines are of interest;
//! everything else is ignored.

use std::process::ExitStatus;

/// Errors that can occur while querying the player status
#[derive(thiserror::Error, Debug)]
pub enum StatusError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}; output: {output}")]
    Exit {
        program: String,
        status: ExitStatus,
        output: String,
    },
    #[error("empty status output")]
    EmptyOutput,
}

/// One poll worth of player state. Missing fields stay at their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackSnapshot {
    pub artist: String,
    pub title: String,
    /// Duration in seconds
    pub duration: u32,
    /// Current position in seconds
    pub position: u32,
}

impl TrackSnapshot {
    /// Track identity is artist + title; duration and position are not part of it.
    pub fn same_track(&self, other: &TrackSnapshot) -> bool {
        self.artist == other.artist && self.title == other.title
    }
}

const ARTIST_PREFIX: &str = "tag artist ";
const TITLE_PREFIX: &str = "tag title ";
const DURATION_PREFIX: &str = "duration ";
const POSITION_PREFIX: &str = "position ";

/// Parse status output into a snapshot. Later lines overwrite earlier ones.
pub fn parse_status(output: &str) -> Result<TrackSnapshot, StatusError> {
    if output.trim().is_empty() {
        return Err(StatusError::EmptyOutput);
    }

    let mut snapshot = TrackSnapshot::default();
    for raw in output.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(artist) = line.strip_prefix(ARTIST_PREFIX) {
            snapshot.artist = artist.trim().to_string();
        } else if let Some(title) = line.strip_prefix(TITLE_PREFIX) {
            snapshot.title = title.trim().to_string();
        } else if let Some(rest) = line.strip_prefix(DURATION_PREFIX) {
            if let Some(secs) = parse_seconds(rest) {
                snapshot.duration = secs;
            }
        } else if let Some(rest) = line.strip_prefix(POSITION_PREFIX)
            && let Some(secs) = parse_seconds(rest)
        {
            snapshot.position = secs;
        }
    }
    Ok(snapshot)
}

fn parse_seconds(rest: &str) -> Option<u32> {
    rest.split_whitespace().next()?.parse().ok()
}
