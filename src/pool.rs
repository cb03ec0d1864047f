// pool.rs: Central event loop for polling, lookups and UI updates

use crate::event::{Command, Event, process_event};
use crate::lyrics::{LyricsStore, lookup_lyrics};
use crate::player::StatusCommand;
use crate::state::{StateBundle, Update};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::MissedTickBehavior;

/// Runs the state machine until `shutdown_rx` fires or closes, or the UI
/// stops listening. Every state change is pushed to `update_tx`.
///
/// Sends never wait: if the UI lags and the channel is full, the loop keeps
/// polling and offers the newest state again on the next event.
pub async fn listen<S: LyricsStore>(
    update_tx: mpsc::Sender<Update>,
    mut shutdown_rx: mpsc::Receiver<()>,
    store: S,
    status: StatusCommand,
    poll_interval: Duration,
) {
    let mut state = StateBundle::new();
    let (event_tx, mut event_rx) = mpsc::channel(32);
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_sent: Option<u64> = None;

    loop {
        let event = tokio::select! {
            _ = shutdown_rx.recv() => break,
            _ = ticker.tick() => Event::Tick,
            Some(event) = event_rx.recv() => event,
        };
        for command in process_event(&mut state, event) {
            dispatch(command, &store, &status, &event_tx);
        }
        if last_sent != Some(state.version) {
            match update_tx.try_send(state.to_update()) {
                Ok(()) => last_sent = Some(state.version),
                Err(TrySendError::Full(_)) => {
                    tracing::trace!(version = state.version, "UI lagging, update deferred");
                }
                Err(TrySendError::Closed(_)) => break,
            }
        }
    }
    tracing::debug!("Event loop stopped");
}

/// Spawn the task for a command; its result comes back on `event_tx`.
fn dispatch<S: LyricsStore>(
    command: Command,
    store: &S,
    status: &StatusCommand,
    event_tx: &mpsc::Sender<Event>,
) {
    let tx = event_tx.clone();
    match command {
        Command::PollStatus => {
            tracing::trace!(program = status.program(), "Polling status");
            let status = status.clone();
            tokio::spawn(async move {
                let result = status.query().await;
                let _ = tx.send(Event::Status(result)).await;
            });
        }
        Command::Lookup {
            key,
            artist,
            title,
            duration,
        } => {
            tracing::debug!(%artist, %title, duration, "Looking up lyrics");
            let store = store.clone();
            tokio::spawn(async move {
                let result = lookup_lyrics(
                    &store,
                    &artist.to_lowercase(),
                    &title.to_lowercase(),
                    duration,
                )
                .await;
                let _ = tx.send(Event::Lyrics { key, result }).await;
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::{LyricsError, LyricsRecord};
    use crate::state::LyricsStatus;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Default)]
    struct CountingStore {
        queries: Arc<AtomicUsize>,
    }

    impl LyricsStore for CountingStore {
        async fn find_track(
            &self,
            artist_lower: &str,
            name_lower: &str,
            _duration: Option<u32>,
        ) -> Result<Option<LyricsRecord>, LyricsError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            if artist_lower == "low" && name_lower == "words" {
                Ok(Some(LyricsRecord {
                    id: 1,
                    name_lower: name_lower.to_string(),
                    duration_seconds: Some(200),
                    plain_lyrics: None,
                    synced_lyrics: Some("[00:01]one\n[00:03]two".to_string()),
                }))
            } else {
                Ok(None)
            }
        }
    }

    fn status(artist: &str, title: &str) -> StatusCommand {
        let script = format!(
            "printf 'tag artist {}\\ntag title {}\\nduration 200\\nposition 2\\n'",
            artist, title
        );
        StatusCommand::new("sh", ["-c".to_string(), script])
    }

    async fn next_update(rx: &mut mpsc::Receiver<Update>) -> Update {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for update")
            .expect("event loop stopped")
    }

    #[tokio::test]
    async fn repeated_polls_query_the_store_once() {
        let store = CountingStore::default();
        let queries = store.queries.clone();
        let (update_tx, mut update_rx) = mpsc::channel(32);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let handle = tokio::spawn(listen(
            update_tx,
            shutdown_rx,
            store,
            status("Low", "Words"),
            Duration::from_millis(10),
        ));

        let found = loop {
            let update = next_update(&mut update_rx).await;
            if let LyricsStatus::Found(resolved) = update.lyrics {
                break resolved;
            }
        };
        assert_eq!(found.lines.len(), 2);

        // let a few more polls go through
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(queries.load(Ordering::SeqCst), 1);

        drop(shutdown_tx);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn missing_lyrics_are_reported() {
        let store = CountingStore::default();
        let (update_tx, mut update_rx) = mpsc::channel(32);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let handle = tokio::spawn(listen(
            update_tx,
            shutdown_rx,
            store,
            status("Nobody", "Nothing"),
            Duration::from_millis(10),
        ));

        loop {
            let update = next_update(&mut update_rx).await;
            if update.lyrics == LyricsStatus::Missing {
                assert_eq!(update.track.title, "Nothing");
                break;
            }
        }
        shutdown_tx.send(()).await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn slow_ui_does_not_stall_polling() {
        let log = std::env::temp_dir().join(format!("cmus-lyrics-polls-{}.log", std::process::id()));
        let _ = std::fs::remove_file(&log);
        let script = format!(
            "echo poll >> '{}'; printf 'tag artist Low\\ntag title Words\\nduration 200\\nposition 2\\n'",
            log.display()
        );
        let status = StatusCommand::new("sh", ["-c".to_string(), script]);

        // nobody reads from this channel
        let (update_tx, _update_rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let handle = tokio::spawn(listen(
            update_tx,
            shutdown_rx,
            CountingStore::default(),
            status,
            Duration::from_millis(10),
        ));

        tokio::time::sleep(Duration::from_millis(400)).await;
        let polls = std::fs::read_to_string(&log).unwrap_or_default().lines().count();
        assert!(polls >= 5, "only {} polls ran", polls);

        drop(shutdown_tx);
        handle.await.unwrap();
        let _ = std::fs::remove_file(&log);
    }
}
