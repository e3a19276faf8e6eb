//! Drawing panel support: bounded undo/redo history and per-note saved
//! drawings.
use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::{Result, SlotStore};

/// Snapshots kept on each of the undo and redo stacks
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Undo and redo stacks of immutable snapshots.
///
/// Each stack holds at most `capacity` entries; pushing past that drops the
/// oldest entry.
#[derive(Debug, Clone)]
pub struct SnapshotHistory<T> {
    capacity: usize,
    undo: VecDeque<T>,
    redo: VecDeque<T>,
}

impl<T> Default for SnapshotHistory<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl<T> SnapshotHistory<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            undo: VecDeque::with_capacity(capacity),
            redo: VecDeque::with_capacity(capacity),
        }
    }

    /// Records the state before a new edit. Any redo history is discarded.
    pub fn record(&mut self, snapshot: T) {
        Self::push_bounded(&mut self.undo, snapshot, self.capacity);
        self.redo.clear();
    }

    /// Steps back: stores `current` for redo and returns the state to show.
    pub fn undo(&mut self, current: T) -> Option<T> {
        let previous = self.undo.pop_back()?;
        Self::push_bounded(&mut self.redo, current, self.capacity);
        Some(previous)
    }

    /// Steps forward: stores `current` for undo and returns the state to show.
    pub fn redo(&mut self, current: T) -> Option<T> {
        let next = self.redo.pop_back()?;
        Self::push_bounded(&mut self.undo, current, self.capacity);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Most recently recorded snapshot, used as the base when previewing a shape
    pub fn latest(&self) -> Option<&T> {
        self.undo.back()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    fn push_bounded(stack: &mut VecDeque<T>, value: T, capacity: usize) {
        if stack.len() == capacity {
            stack.pop_front();
        }
        stack.push_back(value);
    }
}

/// A saved drawing attached to a note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drawing {
    pub id: String,
    pub name: String,
    /// Encoded image, typically a data URL
    pub data: String,
    pub created_at: DateTime<Utc>,
}

/// Slot holding the drawings of one note
pub fn drawings_slot(note_id: &str) -> String {
    format!("drawings-{}", note_id)
}

/// Drawings saved for `note_id`; unreadable data reads as none
pub fn load_drawings<S: SlotStore>(slots: &S, note_id: &str) -> Vec<Drawing> {
    let key = drawings_slot(note_id);
    match slots.get(&key) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            error!("Failed to parse drawings in {}: {}", key, e);
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(e) => {
            error!("Failed to read slot {}: {}", key, e);
            Vec::new()
        }
    }
}

/// Appends a drawing to the note's list and returns it
pub fn save_drawing<S: SlotStore>(
    slots: &mut S,
    note_id: &str,
    name: &str,
    data: &str,
) -> Result<Drawing> {
    let mut drawings = load_drawings(slots, note_id);
    let now = Utc::now();
    let base = now.timestamp_millis().to_string();
    let mut id = base.clone();
    let mut suffix = 1;
    while drawings.iter().any(|d| d.id == id) {
        id = format!("{}-{}", base, suffix);
        suffix += 1;
    }

    let drawing = Drawing {
        id,
        name: name.to_string(),
        data: data.to_string(),
        created_at: now,
    };
    drawings.push(drawing.clone());
    slots.set(&drawings_slot(note_id), &serde_json::to_string(&drawings)?)?;

    info!("Saved drawing {} for note {}", drawing.id, note_id);
    Ok(drawing)
}

/// Removes a saved drawing; unknown ids are ignored
pub fn delete_drawing<S: SlotStore>(slots: &mut S, note_id: &str, drawing_id: &str) -> Result<()> {
    let mut drawings = load_drawings(slots, note_id);
    let before = drawings.len();
    drawings.retain(|d| d.id != drawing_id);
    if drawings.len() == before {
        return Ok(());
    }
    slots.set(&drawings_slot(note_id), &serde_json::to_string(&drawings)?)
}
