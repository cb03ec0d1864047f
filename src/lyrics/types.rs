use thiserror::Error;

/// A single timestamped lyric line. Time is in whole seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncedLine {
    pub time: u32,
    pub text: String,
}

impl SyncedLine {
    pub fn new(time: u32, text: impl Into<String>) -> Self {
        Self {
            time,
            text: text.into(),
        }
    }
}

/// One matched row from the lyrics store.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct LyricsRecord {
    pub id: i64,
    pub name_lower: String,
    pub duration_seconds: Option<i64>,
    pub plain_lyrics: Option<String>,
    pub synced_lyrics: Option<String>,
}

#[derive(Error, Debug)]
pub enum LyricsError {
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),
}
