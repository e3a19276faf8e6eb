use chrono::Utc;
use log::{debug, error, info, trace, warn};

use crate::{Note, NotePatch, Result, SlotStore, NOTES_SLOT};

/// Owns the collection of notes and keeps the durable slot in step with it.
///
/// Every successful mutation rewrites the whole collection to
/// [`NOTES_SLOT`]. Mutations aimed at an id that is not in the collection
/// are silent no-ops.
pub struct NoteStore<S: SlotStore> {
    /// Backing durable slots
    slots: S,

    /// Notes, newest created first
    notes: Vec<Note>,
}

impl<S: SlotStore> NoteStore<S> {
    /// Opens the store, loading whatever the notes slot currently holds.
    ///
    /// A missing slot gives an empty collection. A slot that cannot be read
    /// or parsed is logged and also treated as empty; opening never fails.
    pub fn open(slots: S) -> Self {
        let notes = match slots.get(NOTES_SLOT) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Note>>(&raw) {
                Ok(notes) => {
                    info!("Loaded {} notes from slot {}", notes.len(), NOTES_SLOT);
                    notes
                }
                Err(e) => {
                    error!("Failed to parse stored notes: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => {
                debug!("Slot {} is empty, starting with no notes", NOTES_SLOT);
                Vec::new()
            }
            Err(e) => {
                error!("Failed to read slot {}: {}", NOTES_SLOT, e);
                Vec::new()
            }
        };

        Self { slots, notes }
    }

    /// All notes in collection order
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Looks up a note by id
    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// The underlying slot store
    pub fn slots(&self) -> &S {
        &self.slots
    }

    /// Mutable access to the underlying slot store, for sibling slots such
    /// as settings.
    pub fn slots_mut(&mut self) -> &mut S {
        &mut self.slots
    }

    pub fn into_slots(self) -> S {
        self.slots
    }

    /// Creates a note at the front of the collection and returns its id.
    ///
    /// Missing title and content fall back to "Untitled Note" and "".
    /// The in-memory collection keeps the note even when the write to the
    /// slot fails; the error is still returned.
    pub fn create(&mut self, title: Option<String>, content: Option<String>) -> Result<String> {
        let mut note = Note::new(title, content, Utc::now());
        note.id = self.unique_id(&note.id);
        let id = note.id.clone();

        info!("Creating note: {}", id);
        self.notes.insert(0, note);
        self.persist()?;

        Ok(id)
    }

    /// Merges `patch` into the note with `id` and refreshes its `updatedAt`.
    ///
    /// Does nothing when no such note exists.
    pub fn update(&mut self, id: &str, patch: NotePatch) -> Result<()> {
        let Some(note) = self.notes.iter_mut().find(|note| note.id == id) else {
            trace!("Ignoring update for unknown note: {}", id);
            return Ok(());
        };

        info!("Updating note: {}", id);
        note.apply(patch, Utc::now());
        self.persist()
    }

    /// Removes the note with `id` if present.
    ///
    /// Clearing any selection that pointed at it is the caller's job.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let before = self.notes.len();
        self.notes.retain(|note| note.id != id);
        if self.notes.len() == before {
            trace!("Ignoring delete for unknown note: {}", id);
            return Ok(());
        }

        info!("Deleted note: {}", id);
        self.persist()
    }

    /// Flips the starred flag of the note with `id`
    pub fn toggle_star(&mut self, id: &str) -> Result<()> {
        let Some(is_starred) = self.get(id).map(|note| note.is_starred) else {
            return Ok(());
        };
        self.update(id, NotePatch::starred(!is_starred))
    }

    /// Adds `tag` to the note with `id`; a tag it already has is left alone
    pub fn add_tag(&mut self, id: &str, tag: &str) -> Result<()> {
        let Some(mut tags) = self.get(id).map(|note| note.tags.clone()) else {
            return Ok(());
        };
        if tags.iter().any(|t| t == tag) {
            trace!("Note {} already tagged {}", id, tag);
            return Ok(());
        }
        tags.push(tag.to_string());
        self.update(id, NotePatch::tags(tags))
    }

    /// Removes `tag` from the note with `id`; a tag it lacks changes nothing
    pub fn remove_tag(&mut self, id: &str, tag: &str) -> Result<()> {
        let Some(mut tags) = self.get(id).map(|note| note.tags.clone()) else {
            return Ok(());
        };
        if !tags.iter().any(|t| t == tag) {
            return Ok(());
        }
        tags.retain(|t| t != tag);
        self.update(id, NotePatch::tags(tags))
    }

    /// Writes the whole collection to the notes slot.
    fn persist(&mut self) -> Result<()> {
        trace!("Serializing {} notes to JSON", self.notes.len());
        let json = serde_json::to_string(&self.notes).map_err(|e| {
            error!("Failed to serialize notes: {}", e);
            e
        })?;

        self.slots.set(NOTES_SLOT, &json).map_err(|e| {
            warn!("Failed to persist notes: {}", e);
            e
        })?;

        debug!("Persisted {} notes", self.notes.len());
        Ok(())
    }

    /// Millisecond ids can collide when notes are created in a burst.
    fn unique_id(&self, base: &str) -> String {
        let mut id = base.to_string();
        let mut suffix = 1;
        while self.contains(&id) {
            id = format!("{}-{}", base, suffix);
            suffix += 1;
        }
        id
    }
}
