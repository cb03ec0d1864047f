// lyrics/mod.rs - top-level lyrics module re-exporting submodules
pub mod database;
pub mod parse;
pub mod types;

pub use database::{LyricsStore, SqliteLyricsStore, lookup_lyrics};
pub use parse::parse_synced_lyrics;
pub use types::{LyricsError, LyricsRecord, SyncedLine};
