//! Core data structures for the notedeck application.
//!
//! This module contains the persisted [`Note`] record and the [`NotePatch`]
//! used to change one.
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Title given to notes created without one
pub const DEFAULT_TITLE: &str = "Untitled Note";

/// Category given to every new note
pub const DEFAULT_CATEGORY: &str = "General";

/// Represents a single note in our system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier for the note
    pub id: String,
    /// Note title
    pub title: String,
    /// Note body, may be empty
    pub content: String,
    /// Free-form grouping label
    pub category: String,
    /// Tags in insertion order, no duplicates
    pub tags: Vec<String>,
    /// When the note was created
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
    /// Whether the note is starred
    pub is_starred: bool,
}

impl Note {
    /// Creates a new note with the given title and content at `now`.
    ///
    /// The id is the creation time in epoch milliseconds; the store is
    /// responsible for keeping it unique within its collection.
    pub fn new(title: Option<String>, content: Option<String>, now: DateTime<Utc>) -> Self {
        Note {
            id: now.timestamp_millis().to_string(),
            title: title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            content: content.unwrap_or_default(),
            category: DEFAULT_CATEGORY.to_string(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
            is_starred: false,
        }
    }

    /// Appends `tag` unless the note already carries it.
    ///
    /// Returns `true` when the tag list changed.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        if self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    /// Removes `tag` if present. Returns `true` when the tag list changed.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    /// Number of whitespace separated words in the content
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    /// Merges `patch` over this note and refreshes `updated_at`.
    ///
    /// `id` and `created_at` are never touched. `updated_at` always moves
    /// forward, even when the clock reads the same instant twice.
    pub fn apply(&mut self, patch: NotePatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(tags) = patch.tags {
            self.tags.clear();
            for tag in tags {
                self.add_tag(&tag);
            }
        }
        if let Some(is_starred) = patch.is_starred {
            self.is_starred = is_starred;
        }
        self.touch(now);
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::nanoseconds(1)
        };
    }
}

/// A partial set of field changes for [`Note::apply`].
///
/// Has no `id` or `createdAt` field; those belong to the store. When
/// deserialized from JSON any such keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_starred: Option<bool>,
}

impl NotePatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Default::default()
        }
    }

    pub fn starred(is_starred: bool) -> Self {
        Self {
            is_starred: Some(is_starred),
            ..Default::default()
        }
    }

    pub fn tags(tags: Vec<String>) -> Self {
        Self {
            tags: Some(tags),
            ..Default::default()
        }
    }

    /// True when the patch carries no field changes
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn new_note_uses_defaults() {
        let note = Note::new(None, None, at(1_700_000_000));

        assert_eq!(note.id, "1700000000000");
        assert_eq!(note.title, DEFAULT_TITLE);
        assert_eq!(note.content, "");
        assert_eq!(note.category, DEFAULT_CATEGORY);
        assert!(note.tags.is_empty());
        assert!(!note.is_starred);
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn add_tag_ignores_duplicates() {
        let mut note = Note::new(None, None, at(1));
        assert!(note.add_tag("x"));
        assert!(note.add_tag("y"));
        assert!(!note.add_tag("x"));
        assert_eq!(note.tags, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn remove_tag_reports_change() {
        let mut note = Note::new(None, None, at(1));
        note.add_tag("x");
        assert!(note.remove_tag("x"));
        assert!(!note.remove_tag("x"));
        assert!(note.tags.is_empty());
    }

    #[test]
    fn apply_merges_only_supplied_fields() {
        let mut note = Note::new(Some("a".into()), Some("body".into()), at(10));
        note.apply(NotePatch::title("b"), at(20));

        assert_eq!(note.title, "b");
        assert_eq!(note.content, "body");
        assert_eq!(note.created_at, at(10));
        assert_eq!(note.updated_at, at(20));
    }

    #[test]
    fn apply_dedupes_supplied_tags() {
        let mut note = Note::new(None, None, at(1));
        note.apply(
            NotePatch::tags(vec!["a".into(), "b".into(), "a".into()]),
            at(2),
        );
        assert_eq!(note.tags, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn updated_at_moves_forward_on_clock_tie() {
        let mut note = Note::new(None, None, at(5));
        note.apply(NotePatch::starred(true), at(5));
        assert!(note.updated_at > at(5));
    }

    #[test]
    fn patch_ignores_store_owned_fields() {
        let patch: NotePatch = serde_json::from_str(
            r#"{"id":"evil","createdAt":"2000-01-01T00:00:00Z","title":"ok"}"#,
        )
        .unwrap();
        assert_eq!(patch, NotePatch::title("ok"));
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let note = Note::new(None, None, at(0));
        let value = serde_json::to_value(&note).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert_eq!(value["isStarred"], serde_json::json!(false));
    }

    #[test]
    fn word_count_skips_blank_runs() {
        let note = Note::new(None, Some("  one two\n\nthree ".into()), at(0));
        assert_eq!(note.word_count(), 3);
    }
}
