use crate::lyrics::types::SyncedLine;
use once_cell::sync::Lazy;
use regex::Regex;

// `[mm:ss]` or `[mm:ss.ff]`, anchored at the start of the remaining text.
static TIMESTAMP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(\d+):(\d+)(?:\.\d+)?\]").expect("timestamp regex is valid"));

/// Parse time-synced (LRC style) lyrics into lines sorted by time.
///
/// Each line may start with several timestamps, e.g. `[00:10.00][00:12.50]Hello`,
/// producing one entry per timestamp. Fractional seconds are truncated.
/// Lines without a leading timestamp are dropped. Never fails.
pub fn parse_synced_lyrics(synced: &str) -> Vec<SyncedLine> {
    let mut lines = Vec::new();
    for raw in synced.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let (stamps, text) = split_timestamps(line);
        if stamps.is_empty() {
            continue;
        }
        for time in stamps {
            lines.push(SyncedLine::new(time, text));
        }
    }
    // stable: ties keep emission order
    lines.sort_by_key(|l| l.time);
    lines
}

/// Strip leading timestamps off `line`, returning them with the trimmed rest.
///
/// Extraction stops at the first bracket that is not a valid timestamp; an
/// unterminated `[` stays in the text as-is.
fn split_timestamps(line: &str) -> (Vec<u32>, &str) {
    let mut stamps = Vec::new();
    let mut rest = line;
    while rest.starts_with('[') {
        let Some(caps) = TIMESTAMP_RE.captures(rest) else {
            break;
        };
        let (Some(min), Some(sec)) = (caps.get(1), caps.get(2)) else {
            break;
        };
        let parsed = min
            .as_str()
            .parse::<u32>()
            .ok()
            .zip(sec.as_str().parse::<u32>().ok())
            .and_then(|(m, s)| m.checked_mul(60)?.checked_add(s));
        let Some(time) = parsed else {
            break;
        };
        stamps.push(time);
        rest = rest[caps[0].len()..].trim_start();
    }
    (stamps, rest.trim())
}
