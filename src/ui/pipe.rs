use crate::lyrics::SqliteLyricsStore;
use crate::pool;
use crate::state::{LyricsStatus, Update};
use std::io::{self, Write};
use tokio::sync::mpsc;

/// Tracks which line was printed last so each line is printed once.
#[derive(Default)]
struct PipeState {
    last_track_id: Option<(String, String)>,
    last_track_had_lyric: bool,
    last_line_idx: Option<usize>,
}

impl PipeState {
    /// Lines to print for this update, in order. An empty string is a
    /// separator between tracks.
    fn lines_for(&mut self, upd: &Update) -> Vec<String> {
        let mut out = Vec::new();
        let track_id = (upd.track.artist.clone(), upd.track.title.clone());
        if self.last_track_id.as_ref() != Some(&track_id) {
            if self.last_track_id.is_some() && self.last_track_had_lyric {
                out.push(String::new());
            }
            self.last_track_id = Some(track_id);
            self.last_track_had_lyric = false;
            self.last_line_idx = None;
        }

        let LyricsStatus::Found(resolved) = &upd.lyrics else {
            return out;
        };
        let idx = upd.cursor();
        if idx != self.last_line_idx {
            if let Some(line) = idx.and_then(|i| resolved.lines.get(i)) {
                out.push(line.text.clone());
                self.last_track_had_lyric = true;
            }
            self.last_line_idx = idx;
        }
        out
    }
}

/// Display lyrics in pipe mode (stdout only, for scripting)
pub async fn display_lyrics_pipe(
    store: SqliteLyricsStore,
    config: crate::Config,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (tx, mut rx) = mpsc::channel(32);
    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
    let backend_loop = tokio::spawn(pool::listen(
        tx,
        shutdown_rx,
        store,
        config.status_command(),
        config.poll_interval(),
    ));

    let mut state = PipeState::default();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut stdout = io::stdout();
    loop {
        tokio::select! {
            upd = rx.recv() => {
                let Some(upd) = upd else { break };
                for line in state.lines_for(&upd) {
                    writeln!(stdout, "{}", line)?;
                }
                stdout.flush()?;
            }
            _ = &mut ctrl_c => break,
        }
    }

    drop(shutdown_tx);
    drop(rx);
    if let Err(e) = backend_loop.await {
        tracing::warn!(error = %e, "Event loop task failed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ResolvedLyrics;
    use crate::lyrics::{LyricsRecord, SyncedLine};
    use crate::player::TrackSnapshot;
    use std::sync::Arc;

    fn update(title: &str, position: u32, lines: Option<Vec<SyncedLine>>) -> Update {
        let lyrics = match lines {
            Some(lines) => LyricsStatus::Found(Arc::new(ResolvedLyrics {
                record: LyricsRecord {
                    id: 1,
                    name_lower: title.to_lowercase(),
                    duration_seconds: None,
                    plain_lyrics: None,
                    synced_lyrics: None,
                },
                lines: Arc::new(lines),
            })),
            None => LyricsStatus::Missing,
        };
        Update {
            track: TrackSnapshot {
                artist: "A".into(),
                title: title.into(),
                duration: 100,
                position,
            },
            lyrics,
            err: None,
            version: 0,
        }
    }

    #[test]
    fn prints_each_line_once_and_separates_tracks() {
        let lines = vec![SyncedLine::new(1, "one"), SyncedLine::new(5, "two")];
        let mut state = PipeState::default();
        assert!(state.lines_for(&update("T", 0, Some(lines.clone()))).is_empty());
        assert_eq!(state.lines_for(&update("T", 1, Some(lines.clone()))), ["one"]);
        assert!(state.lines_for(&update("T", 2, Some(lines.clone()))).is_empty());
        assert_eq!(state.lines_for(&update("T", 6, Some(lines))), ["two"]);
        assert_eq!(state.lines_for(&update("U", 0, None)), [""]);
        assert!(state.lines_for(&update("V", 0, None)).is_empty());
    }
}
