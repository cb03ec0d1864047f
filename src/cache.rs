// cache.rs: Process-lifetime cache of lookup and parse results per track

use crate::lyrics::{LyricsRecord, SyncedLine, parse_synced_lyrics};
use std::collections::HashMap;
use std::sync::Arc;

/// Case-insensitive cache key for an (artist, title) pair.
pub fn cache_key(artist: &str, title: &str) -> String {
    format!(
        "{}\n{}",
        artist.trim().to_lowercase(),
        title.trim().to_lowercase()
    )
}

/// A store record together with its parsed synced lines.
///
/// `lines` is empty when the record has no synced text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLyrics {
    pub record: LyricsRecord,
    pub lines: Arc<Vec<SyncedLine>>,
}

impl ResolvedLyrics {
    pub fn plain(&self) -> Option<&str> {
        self.record.plain_lyrics.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEntry {
    Found(Arc<ResolvedLyrics>),
    /// The store was asked and had nothing for this key.
    Missing,
}

/// Unbounded map from cache key to lookup outcome.
///
/// Entries are never evicted. The key space is the set of distinct tracks
/// played in one session, so growth is bounded by listening time.
#[derive(Debug, Default)]
pub struct LyricsCache {
    entries: HashMap<String, CacheEntry>,
}

impl LyricsCache {
    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn mark_missing(&mut self, key: String) {
        self.entries.insert(key, CacheEntry::Missing);
    }

    /// Caches a found record and returns the shared entry.
    ///
    /// Synced text is parsed at most once per key: if the key already holds
    /// parsed lines they are reused.
    pub fn insert_found(&mut self, key: String, record: LyricsRecord) -> Arc<ResolvedLyrics> {
        let lines = match self.entries.get(&key) {
            Some(CacheEntry::Found(existing)) if !existing.lines.is_empty() => existing.lines.clone(),
            _ => Arc::new(
                record
                    .synced_lyrics
                    .as_deref()
                    .map(parse_synced_lyrics)
                    .unwrap_or_default(),
            ),
        };
        let resolved = Arc::new(ResolvedLyrics { record, lines });
        self.entries.insert(key, CacheEntry::Found(resolved.clone()));
        resolved
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(synced: Option<&str>, plain: Option<&str>) -> LyricsRecord {
        LyricsRecord {
            id: 1,
            name_lower: "song".to_string(),
            duration_seconds: Some(100),
            plain_lyrics: plain.map(str::to_string),
            synced_lyrics: synced.map(str::to_string),
        }
    }

    #[test]
    fn key_is_trimmed_and_lowercased() {
        assert_eq!(cache_key("  Radiohead ", "Karma Police"), "radiohead\nkarma police");
        assert_eq!(cache_key("A", "B"), cache_key("a ", " b"));
    }

    #[test]
    fn found_entry_parses_synced_text() {
        let mut cache = LyricsCache::default();
        let resolved = cache.insert_found("k".into(), record(Some("[00:02]b\n[00:01]a"), None));
        assert_eq!(resolved.lines.len(), 2);
        assert_eq!(resolved.lines[0].text, "a");
        assert!(matches!(cache.get("k"), Some(CacheEntry::Found(_))));
    }

    #[test]
    fn parsed_lines_are_reused_for_same_key() {
        let mut cache = LyricsCache::default();
        let first = cache.insert_found("k".into(), record(Some("[00:01]a"), None));
        let second = cache.insert_found("k".into(), record(Some("[00:01]a"), None));
        assert!(Arc::ptr_eq(&first.lines, &second.lines));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn plain_only_record_has_no_lines() {
        let mut cache = LyricsCache::default();
        let resolved = cache.insert_found("k".into(), record(None, Some("la la")));
        assert!(resolved.lines.is_empty());
        assert_eq!(resolved.plain(), Some("la la"));
    }

    #[test]
    fn missing_marker_is_remembered() {
        let mut cache = LyricsCache::default();
        assert!(cache.get("k").is_none());
        cache.mark_missing("k".into());
        assert_eq!(cache.get("k"), Some(&CacheEntry::Missing));
    }
}
