//! Derived views over the note collection.
//!
//! Nothing here is persisted: the visible subset and the category list are
//! recomputed from the collection and the current filter inputs on every read.
use std::{collections::HashSet, fmt};

use crate::Note;

/// Category selector entry matching every note
pub const ALL_CATEGORY: &str = "All";

/// Category selector entry matching starred notes
pub const STARRED_CATEGORY: &str = "Starred";

/// Parsed form of the category selector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Starred,
    /// Exact, case-sensitive match on `Note::category`
    Named(String),
}

impl CategoryFilter {
    pub fn parse(value: &str) -> Self {
        match value {
            ALL_CATEGORY => CategoryFilter::All,
            STARRED_CATEGORY => CategoryFilter::Starred,
            other => CategoryFilter::Named(other.to_string()),
        }
    }

    pub fn matches(&self, note: &Note) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Starred => note.is_starred,
            CategoryFilter::Named(category) => note.category == *category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str(ALL_CATEGORY),
            CategoryFilter::Starred => f.write_str(STARRED_CATEGORY),
            CategoryFilter::Named(category) => f.write_str(category),
        }
    }
}

/// True when `query` appears in the title or content, ignoring case.
/// An empty query matches every note.
pub fn matches_query(note: &Note, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    note.title.to_lowercase().contains(&needle) || note.content.to_lowercase().contains(&needle)
}

/// Notes matching both the search query and the category selector,
/// in collection order.
pub fn compute_visible(notes: &[Note], search_query: &str, selected_category: &str) -> Vec<Note> {
    let category = CategoryFilter::parse(selected_category);
    notes
        .iter()
        .filter(|note| matches_query(note, search_query) && category.matches(note))
        .cloned()
        .collect()
}

/// `["All", "Starred", ...]` followed by each distinct category in order of
/// first appearance.
///
/// A note whose category is literally "All" or "Starred" still adds that
/// value, so the fixed entries can appear twice.
pub fn compute_categories(notes: &[Note]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut categories = vec![ALL_CATEGORY.to_string(), STARRED_CATEGORY.to_string()];
    for note in notes {
        if seen.insert(note.category.as_str()) {
            categories.push(note.category.clone());
        }
    }
    categories
}

/// The UI-bound filter inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewFilter {
    pub search_query: String,
    pub selected_category: String,
}

impl Default for ViewFilter {
    fn default() -> Self {
        Self {
            search_query: String::new(),
            selected_category: ALL_CATEGORY.to_string(),
        }
    }
}

impl ViewFilter {
    pub fn new(search_query: impl Into<String>, selected_category: impl Into<String>) -> Self {
        Self {
            search_query: search_query.into(),
            selected_category: selected_category.into(),
        }
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn set_selected_category(&mut self, category: impl Into<String>) {
        self.selected_category = category.into();
    }

    pub fn visible(&self, notes: &[Note]) -> Vec<Note> {
        compute_visible(notes, &self.search_query, &self.selected_category)
    }

    pub fn categories(&self, notes: &[Note]) -> Vec<String> {
        compute_categories(notes)
    }
}
