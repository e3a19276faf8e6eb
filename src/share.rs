//! Locally built share links.
//!
//! A share link only carries a note id and the time it was made. Nothing
//! serves or resolves it.
use chrono::{DateTime, Utc};

/// Characters of content shown alongside a shared link
pub const PREVIEW_CHARS: usize = 200;

/// Builds `<base_url>?shared=<id>&t=<epoch millis>`
pub fn share_link(base_url: &str, note_id: &str, now: DateTime<Utc>) -> String {
    format!("{}?shared={}&t={}", base_url, note_id, now.timestamp_millis())
}

/// The first [`PREVIEW_CHARS`] characters of `content`, with `...` when cut
pub fn share_preview(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
