//! Local lyrics store access.
//!
//! The store is an SQLite database in the LRCLIB dump layout: a `tracks`
//! table (id, artist_name_lower, name_lower, duration) and a `lyrics` table
//! (track_id, plain_lyrics, synced_lyrics, ...) joined on `track_id`. It is
//! only ever read.
//!
//! # Lookup
//!
//! ```text
//! ┌──────────────────────────┐
//! │ artist, title, duration  │
//! └────────────┬─────────────┘
//!              │ normalize title
//!              ▼
//! ┌──────────────────────────┐
//! │ exact (with duration)    │───── Hit ──────▶ Record
//! └────────────┬─────────────┘
//!              │ Miss
//!              ▼
//! ┌──────────────────────────┐
//! │ any duration             │───── Hit ──────▶ Record
//! └────────────┬─────────────┘
//!              │ Miss
//!              ▼
//!           NotFound
//! ```

use crate::lyrics::types::{LyricsError, LyricsRecord};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::future::Future;
use std::path::Path;

const SELECT_EXACT: &str = r#"
SELECT
  t.id AS id,
  t.name_lower AS name_lower,
  CAST(t.duration AS INTEGER) AS duration_seconds,
  l.plain_lyrics AS plain_lyrics,
  l.synced_lyrics AS synced_lyrics
FROM tracks t
JOIN lyrics l ON l.track_id = t.id
WHERE
  t.artist_name_lower = ? AND
  t.name_lower = ? AND
  t.duration = ?
LIMIT 1
"#;

const SELECT_ANY_DURATION: &str = r#"
SELECT
  t.id AS id,
  t.name_lower AS name_lower,
  CAST(t.duration AS INTEGER) AS duration_seconds,
  l.plain_lyrics AS plain_lyrics,
  l.synced_lyrics AS synced_lyrics
FROM tracks t
JOIN lyrics l ON l.track_id = t.id
WHERE
  t.artist_name_lower = ? AND
  t.name_lower = ?
LIMIT 1
"#;

/// A queryable lyrics store.
///
/// `find_track` runs a single query; `duration: None` drops the duration
/// constraint. `Ok(None)` means no row matched.
pub trait LyricsStore: Clone + Send + Sync + 'static {
    fn find_track(
        &self,
        artist_lower: &str,
        name_lower: &str,
        duration: Option<u32>,
    ) -> impl Future<Output = Result<Option<LyricsRecord>, LyricsError>> + Send;
}

/// SQLite-backed store over a read-only connection pool.
#[derive(Debug, Clone)]
pub struct SqliteLyricsStore {
    pool: SqlitePool,
}

impl SqliteLyricsStore {
    /// Opens the database at `path`. The file must already exist.
    pub async fn open(path: &Path) -> Result<Self, LyricsError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;
        tracing::info!(path = %path.display(), "Opened lyrics store");
        Ok(Self { pool })
    }

    #[cfg(test)]
    pub(crate) fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Releases all connections. Safe to call more than once.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Closed lyrics store");
    }
}

impl LyricsStore for SqliteLyricsStore {
    async fn find_track(
        &self,
        artist_lower: &str,
        name_lower: &str,
        duration: Option<u32>,
    ) -> Result<Option<LyricsRecord>, LyricsError> {
        let record = match duration {
            Some(duration) => {
                sqlx::query_as::<_, LyricsRecord>(SELECT_EXACT)
                    .bind(artist_lower)
                    .bind(name_lower)
                    .bind(duration)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as::<_, LyricsRecord>(SELECT_ANY_DURATION)
                    .bind(artist_lower)
                    .bind(name_lower)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };
        Ok(record)
    }
}

/// Normalizes a title for lookup: trims it and drops everything from the
/// first `(` on, so "karma police (remastered)" matches "karma police".
pub fn normalize_title(title: &str) -> &str {
    let title = title.trim();
    match title.find('(') {
        Some(idx) => title[..idx].trim(),
        None => title,
    }
}

/// Looks up lyrics for a track, first with the exact duration and then
/// without it. `Ok(None)` means the store has no matching track.
pub async fn lookup_lyrics<S: LyricsStore>(
    store: &S,
    artist_lower: &str,
    title_lower: &str,
    duration: u32,
) -> Result<Option<LyricsRecord>, LyricsError> {
    let name_lower = normalize_title(title_lower);
    if let Some(record) = store.find_track(artist_lower, name_lower, Some(duration)).await? {
        return Ok(Some(record));
    }
    tracing::debug!(
        artist = artist_lower,
        title = name_lower,
        duration,
        "No exact duration match, retrying without duration"
    );
    store.find_track(artist_lower, name_lower, None).await
}
