//! Transition rules of the synchronization state machine.
//!
//! `process_event` is the only place state changes. It never performs I/O;
//! work it needs done comes back as `Command`s which the event loop in
//! `pool` runs as independent tasks whose results re-enter as `Event`s.

use crate::cache::cache_key;
use crate::lyrics::{LyricsError, LyricsRecord};
use crate::player::{StatusError, TrackSnapshot};
use crate::state::{LyricsStatus, StateBundle};

#[derive(Debug)]
pub enum Event {
    /// Periodic timer fired.
    Tick,
    /// A status poll finished.
    Status(Result<TrackSnapshot, StatusError>),
    /// A lyrics lookup finished. `key` is the cache key it was issued for.
    Lyrics {
        key: String,
        result: Result<Option<LyricsRecord>, LyricsError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    PollStatus,
    Lookup {
        key: String,
        artist: String,
        title: String,
        duration: u32,
    },
}

pub fn process_event(state: &mut StateBundle, event: Event) -> Vec<Command> {
    match event {
        Event::Tick => vec![Command::PollStatus],
        Event::Status(Ok(snapshot)) => {
            state.set_err(None);
            handle_snapshot(state, snapshot).into_iter().collect()
        }
        Event::Status(Err(e)) => {
            tracing::warn!(error = %e, "Status poll failed");
            state.set_err(Some(e.to_string()));
            Vec::new()
        }
        Event::Lyrics { key, result } => {
            handle_lookup_result(state, key, result);
            Vec::new()
        }
    }
}

fn handle_snapshot(state: &mut StateBundle, snapshot: TrackSnapshot) -> Option<Command> {
    if state.track.as_ref().is_some_and(|t| t.same_track(&snapshot)) {
        state.update_playback(&snapshot);
        return None;
    }

    let key = cache_key(&snapshot.artist, &snapshot.title);
    let title_missing = snapshot.title.trim().is_empty();
    tracing::info!(artist = %snapshot.artist, title = %snapshot.title, "Track changed");
    state.track = Some(snapshot);

    if title_missing {
        state.set_lyrics(LyricsStatus::Missing);
        return None;
    }
    if let Some(entry) = state.cache.get(&key) {
        tracing::debug!(key = %key, "Lyrics cache hit");
        let lyrics = LyricsStatus::from(entry);
        state.set_lyrics(lyrics);
        return None;
    }

    state.set_lyrics(LyricsStatus::Searching);
    if !state.in_flight.insert(key.clone()) {
        // a lookup for this key is still running; its result will apply
        return None;
    }
    let track = state.track.as_ref()?;
    Some(Command::Lookup {
        key,
        artist: track.artist.clone(),
        title: track.title.clone(),
        duration: track.duration,
    })
}

fn handle_lookup_result(
    state: &mut StateBundle,
    key: String,
    result: Result<Option<LyricsRecord>, LyricsError>,
) {
    state.in_flight.remove(&key);
    let live = state.is_live(&key);

    match result {
        Ok(Some(record)) => {
            tracing::debug!(
                track_id = record.id,
                name = %record.name_lower,
                duration = ?record.duration_seconds,
                synced = record.synced_lyrics.is_some(),
                "Lyrics found"
            );
            let resolved = state.cache.insert_found(key, record);
            if live {
                state.set_lyrics(LyricsStatus::Found(resolved));
                state.set_err(None);
            } else {
                tracing::debug!("Discarding stale lookup result");
            }
        }
        Ok(None) => {
            tracing::debug!(key = %key, "No lyrics in store");
            state.cache.mark_missing(key);
            tracing::debug!(cached = state.cache.len(), "Cached missing marker");
            if live {
                state.set_lyrics(LyricsStatus::Missing);
                state.set_err(None);
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Lyrics lookup failed");
            if live {
                let msg = e.to_string();
                state.set_lyrics(LyricsStatus::Failed(msg.clone()));
                state.set_err(Some(msg));
            }
        }
    }
}
