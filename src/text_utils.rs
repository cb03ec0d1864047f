// src/text_utils.rs
// Utility functions for text formatting

/// Format whole seconds as `MM:SS`. Minutes are not wrapped into hours.
pub fn format_time(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// The first `n` lines of `text`, blank lines included.
pub fn first_lines(text: &str, n: usize) -> Vec<&str> {
    text.lines().take(n).collect()
}
