//! Application session: the note store plus everything the UI layer tracks
//! around it (filters, selection, which view is showing, settings).
use chrono::Utc;
use log::{debug, info, warn};

use crate::{
    compute_categories, delete_drawing, drawings_slot, load_drawings, save_drawing, share_link,
    Drawing, Note, NotePatch, NoteStore, ReadingPatch, Result, SettingsPatch, SettingsStore,
    SlotStore, UploadedNote, ViewFilter,
};

/// Which main panel is showing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewState {
    #[default]
    Editor,
    /// Read-only rendering of the selected note
    Preview,
    Downloads,
    NotesList,
}

pub struct Session<S: SlotStore> {
    store: NoteStore<S>,
    settings: SettingsStore,
    filter: ViewFilter,
    selected_note_id: Option<String>,
    view: ViewState,
}

impl<S: SlotStore> Session<S> {
    /// Loads notes and settings from `slots`
    pub fn open(slots: S) -> Self {
        let store = NoteStore::open(slots);
        let settings = SettingsStore::load(store.slots());
        Self {
            store,
            settings,
            filter: ViewFilter::default(),
            selected_note_id: None,
            view: ViewState::default(),
        }
    }

    pub fn store(&self) -> &NoteStore<S> {
        &self.store
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn filter(&self) -> &ViewFilter {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut ViewFilter {
        &mut self.filter
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn selected_note_id(&self) -> Option<&str> {
        self.selected_note_id.as_deref()
    }

    pub fn selected_note(&self) -> Option<&Note> {
        self.selected_note_id
            .as_deref()
            .and_then(|id| self.store.get(id))
    }

    /// Notes passing the current search and category filters
    pub fn visible_notes(&self) -> Vec<Note> {
        self.filter.visible(self.store.notes())
    }

    pub fn categories(&self) -> Vec<String> {
        compute_categories(self.store.notes())
    }

    /// Creates a note, selects it and opens the editor.
    ///
    /// Missing title and content take the store defaults.
    pub fn create_note(&mut self, title: Option<String>, content: Option<String>) -> Result<String> {
        let id = self.store.create(title, content)?;
        self.selected_note_id = Some(id.clone());
        self.view = ViewState::Editor;
        Ok(id)
    }

    /// Creates a note from an uploaded file and selects it
    pub fn upload(&mut self, upload: UploadedNote) -> Result<String> {
        let id = self.create_note(Some(upload.title), Some(upload.content))?;
        info!("Created note {} from upload", id);
        Ok(id)
    }

    /// Selects a note and opens it in the editor.
    ///
    /// Returns `false`, changing nothing, when no note has that id.
    pub fn select_note(&mut self, id: &str) -> bool {
        if !self.store.contains(id) {
            debug!("Cannot select unknown note: {}", id);
            return false;
        }
        self.selected_note_id = Some(id.to_string());
        self.view = ViewState::Editor;
        true
    }

    /// Switches between editor and preview. Preview needs a selected note.
    pub fn toggle_preview(&mut self) {
        self.view = match self.view {
            ViewState::Preview => ViewState::Editor,
            _ if self.selected_note().is_some() => ViewState::Preview,
            _ => ViewState::Editor,
        };
    }

    pub fn back_to_editor(&mut self) {
        self.view = ViewState::Editor;
    }

    pub fn show_notes_list(&mut self) {
        self.view = ViewState::NotesList;
    }

    /// Opens the downloads list; nothing stays selected there
    pub fn show_downloads(&mut self) {
        self.view = ViewState::Downloads;
        self.selected_note_id = None;
    }

    pub fn update_note(&mut self, id: &str, patch: NotePatch) -> Result<()> {
        self.store.update(id, patch)
    }

    pub fn toggle_star(&mut self, id: &str) -> Result<()> {
        self.store.toggle_star(id)
    }

    pub fn add_tag(&mut self, id: &str, tag: &str) -> Result<()> {
        self.store.add_tag(id, tag)
    }

    pub fn remove_tag(&mut self, id: &str, tag: &str) -> Result<()> {
        self.store.remove_tag(id, tag)
    }

    /// Deletes a note, clearing the selection when it pointed at it.
    ///
    /// The note's saved drawings are dropped as well. The note leaves the
    /// collection even when persisting fails, so the selection is cleared
    /// before that error is returned.
    pub fn delete_note(&mut self, id: &str) -> Result<()> {
        let existed = self.store.contains(id);
        let result = self.store.delete(id);

        if self.selected_note_id.as_deref() == Some(id) {
            self.selected_note_id = None;
            if self.view == ViewState::Preview {
                self.view = ViewState::Editor;
            }
        }

        if existed {
            if let Err(e) = self.store.slots_mut().remove(&drawings_slot(id)) {
                warn!("Failed to remove drawings for note {}: {}", id, e);
            }
        }
        result
    }

    /// Share link for a note, or `None` if it does not exist
    pub fn share_link(&self, base_url: &str, id: &str) -> Option<String> {
        self.store
            .get(id)
            .map(|note| share_link(base_url, &note.id, Utc::now()))
    }

    pub fn drawings(&self, note_id: &str) -> Vec<Drawing> {
        load_drawings(self.store.slots(), note_id)
    }

    /// Saves a drawing for an existing note; `None` for unknown notes
    pub fn save_drawing(&mut self, note_id: &str, name: &str, data: &str) -> Result<Option<Drawing>> {
        if !self.store.contains(note_id) {
            return Ok(None);
        }
        save_drawing(self.store.slots_mut(), note_id, name, data).map(Some)
    }

    pub fn delete_drawing(&mut self, note_id: &str, drawing_id: &str) -> Result<()> {
        delete_drawing(self.store.slots_mut(), note_id, drawing_id)
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) -> Result<()> {
        self.settings.update(self.store.slots_mut(), patch)
    }

    pub fn update_reading_settings(&mut self, patch: ReadingPatch) -> Result<()> {
        self.settings.update_reading(self.store.slots_mut(), patch)
    }

    pub fn set_setting(&mut self, key: &str, value: &str) -> Result<()> {
        self.settings.set(self.store.slots_mut(), key, value)
    }

    pub fn reset_settings(&mut self) -> Result<()> {
        self.settings.reset(self.store.slots_mut())
    }

    pub fn toggle_sidebar(&mut self) -> Result<()> {
        self.settings.toggle_sidebar(self.store.slots_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::Cell, rc::Rc};

    use crate::{MemorySlotStore, NotesError, Theme};
    use pretty_assertions::assert_eq;

    fn session() -> Session<MemorySlotStore> {
        Session::open(MemorySlotStore::new())
    }

    #[test]
    fn create_selects_new_note() {
        let mut session = session();
        let id = session.create_note(None, None).unwrap();

        assert_eq!(session.selected_note_id(), Some(id.as_str()));
        assert_eq!(session.view(), ViewState::Editor);
        assert_eq!(session.selected_note().unwrap().title, "Untitled Note");
    }

    #[test]
    fn deleting_selected_note_clears_selection() {
        let mut session = session();
        let keep = session.create_note(None, None).unwrap();
        let gone = session.create_note(None, None).unwrap();
        session.toggle_preview();
        assert_eq!(session.view(), ViewState::Preview);

        session.delete_note(&gone).unwrap();

        assert_eq!(session.selected_note_id(), None);
        assert_eq!(session.view(), ViewState::Editor);
        assert!(session.store().contains(&keep));
    }

    /// Memory slots whose writes start failing once `fail_writes` is set
    struct FlakySlots {
        inner: MemorySlotStore,
        fail_writes: Rc<Cell<bool>>,
    }

    impl SlotStore for FlakySlots {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            if self.fail_writes.get() {
                return Err(NotesError::Io(std::io::Error::other("disk full")));
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn failed_delete_still_clears_selection() {
        let fail_writes = Rc::new(Cell::new(false));
        let mut session = Session::open(FlakySlots {
            inner: MemorySlotStore::new(),
            fail_writes: Rc::clone(&fail_writes),
        });
        let id = session.create_note(None, None).unwrap();
        session.toggle_preview();
        fail_writes.set(true);

        assert!(session.delete_note(&id).is_err());

        assert!(!session.store().contains(&id));
        assert_eq!(session.selected_note_id(), None);
        assert_eq!(session.view(), ViewState::Editor);
    }

    #[test]
    fn create_with_fields_keeps_single_timestamp() {
        let mut session = session();
        let id = session
            .create_note(Some("Plan".into()), Some("steps".into()))
            .unwrap();

        let note = session.selected_note().unwrap();
        assert_eq!(note.id, id);
        assert_eq!(note.title, "Plan");
        assert_eq!(note.content, "steps");
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn deleting_other_note_keeps_selection() {
        let mut session = session();
        let other = session.create_note(None, None).unwrap();
        let selected = session.create_note(None, None).unwrap();

        session.delete_note(&other).unwrap();

        assert_eq!(session.selected_note_id(), Some(selected.as_str()));
    }

    #[test]
    fn preview_requires_selection() {
        let mut session = session();
        session.toggle_preview();
        assert_eq!(session.view(), ViewState::Editor);

        let id = session.create_note(None, None).unwrap();
        session.show_downloads();
        assert_eq!(session.selected_note_id(), None);

        assert!(session.select_note(&id));
        session.toggle_preview();
        assert_eq!(session.view(), ViewState::Preview);
        session.toggle_preview();
        assert_eq!(session.view(), ViewState::Editor);
    }

    #[test]
    fn select_unknown_note_is_rejected() {
        let mut session = session();
        session.show_notes_list();
        assert!(!session.select_note("nope"));
        assert_eq!(session.view(), ViewState::NotesList);
    }

    #[test]
    fn upload_creates_and_selects() {
        let mut session = session();
        let id = session
            .upload(UploadedNote {
                title: "todo".into(),
                content: "- milk".into(),
            })
            .unwrap();

        let note = session.selected_note().unwrap();
        assert_eq!(note.id, id);
        assert_eq!(note.title, "todo");
        assert_eq!(note.content, "- milk");
    }

    #[test]
    fn filters_drive_visible_notes() {
        let mut session = session();
        let a = session.create_note(None, None).unwrap();
        let b = session.create_note(None, None).unwrap();
        session.update_note(&a, NotePatch::title("Shopping")).unwrap();
        session.update_note(&b, NotePatch::category("Work")).unwrap();
        session.toggle_star(&b).unwrap();

        session.filter_mut().set_search_query("shop");
        let visible: Vec<String> = session.visible_notes().into_iter().map(|n| n.id).collect();
        assert_eq!(visible, vec![a.clone()]);

        session.filter_mut().set_search_query("");
        session.filter_mut().set_selected_category("Starred");
        let visible: Vec<String> = session.visible_notes().into_iter().map(|n| n.id).collect();
        assert_eq!(visible, vec![b]);

        assert_eq!(session.categories(), vec!["All", "Starred", "Work", "General"]);
    }

    #[test]
    fn settings_share_the_slot_store() {
        let mut session = session();
        session.toggle_sidebar().unwrap();
        session.set_setting("theme", "dark").unwrap();

        let reopened = Session::open(session.store.into_slots());
        assert!(reopened.settings().settings().sidebar_collapsed);
        assert_eq!(reopened.settings().reading().theme, Theme::Dark);
    }

    #[test]
    fn share_link_only_for_existing_notes() {
        let mut session = session();
        let id = session.create_note(None, None).unwrap();

        let link = session.share_link("https://notes.local/app", &id).unwrap();
        assert!(link.starts_with(&format!("https://notes.local/app?shared={}&t=", id)));
        assert_eq!(session.share_link("https://notes.local/app", "missing"), None);
    }

    #[test]
    fn deleting_note_drops_its_drawings() {
        let mut session = session();
        let id = session.create_note(None, None).unwrap();
        session.save_drawing(&id, "sketch", "data:x").unwrap().unwrap();
        assert_eq!(session.drawings(&id).len(), 1);

        session.delete_note(&id).unwrap();
        assert!(session.drawings(&id).is_empty());
        assert!(session.save_drawing(&id, "late", "data:y").unwrap().is_none());
    }
}
