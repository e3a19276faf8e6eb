//! Durable key-value slots.
//!
//! A slot is a named location holding one serialized value. Every write
//! replaces the whole value; there are no partial or appended writes.
use std::{
    collections::HashMap,
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use log::{debug, error, trace};
use tempfile::NamedTempFile;

use crate::{NotesError, Result};

/// Slot holding the JSON array of notes
pub const NOTES_SLOT: &str = "notes-app-data";

/// Slot holding the JSON object of UI preferences
pub const SETTINGS_SLOT: &str = "notes-app-settings";

/// Storage of whole values under fixed names.
pub trait SlotStore {
    /// Reads the value stored under `key`, `None` if the slot is empty
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrites the value stored under `key`
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Empties the slot. Removing an empty slot is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Slots kept as `<dir>/<key>.json` files.
#[derive(Debug, Clone)]
pub struct FileSlotStore {
    dir: PathBuf,
}

impl FileSlotStore {
    /// Opens a slot directory, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.exists() {
            debug!("Slot directory does not exist, creating: {}", dir.display());
            fs::create_dir_all(&dir).map_err(|e| {
                error!("Failed to create slot directory {}: {}", dir.display(), e);
                NotesError::DirectoryError { path: dir.clone() }
            })?;
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`. Keys that could name a path outside the slot
    /// directory are rejected.
    fn slot_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty()
            || key.contains(|c: char| matches!(c, '/' | '\\' | '\0'))
            || key.contains("..")
        {
            error!("Refusing unsafe slot key: {:?}", key);
            return Err(NotesError::InvalidSlotKey {
                key: key.to_string(),
            });
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl SlotStore for FileSlotStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key)?;
        trace!("Reading slot {} from {}", key, path.display());
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => {
                error!("Failed to read slot file {}: {}", path.display(), e);
                Err(NotesError::Io(e))
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.slot_path(key)?;
        debug!("Writing slot {} to {}", key, path.display());

        // Write beside the target, then rename over it
        let mut temp_file = NamedTempFile::new_in(&self.dir).map_err(|e| {
            error!("Failed to create temporary file: {}", e);
            NotesError::Io(e)
        })?;

        temp_file.write_all(value.as_bytes()).map_err(|e| {
            error!("Failed to write to temporary file: {}", e);
            NotesError::Io(e)
        })?;

        temp_file.flush().map_err(|e| {
            error!("Failed to flush temporary file: {}", e);
            NotesError::Io(e)
        })?;

        temp_file.persist(&path).map_err(|e| {
            error!("Failed to persist file {}: {}", path.display(), e.error);
            NotesError::Io(e.error)
        })?;

        trace!("Slot {} written ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.slot_path(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(NotesError::Io(e)),
        }
    }
}

/// Slots kept in memory, lost when dropped.
#[derive(Debug, Clone, Default)]
pub struct MemorySlotStore {
    slots: HashMap<String, String>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for MemorySlotStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.slots.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_slot_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = FileSlotStore::open(dir.path()).unwrap();
        assert_eq!(store.get(NOTES_SLOT).unwrap(), None);
    }

    #[test]
    fn file_slot_overwrites_whole_value() {
        let dir = TempDir::new().unwrap();
        let mut store = FileSlotStore::open(dir.path()).unwrap();

        store.set(NOTES_SLOT, "[1,2,3]").unwrap();
        store.set(NOTES_SLOT, "[]").unwrap();

        assert_eq!(store.get(NOTES_SLOT).unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("notes-app-data.json").exists());
    }

    #[test]
    fn file_slot_open_creates_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileSlotStore::open(&nested).unwrap();
        assert!(store.dir().is_dir());
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut store = FileSlotStore::open(dir.path()).unwrap();
        store.set(SETTINGS_SLOT, "{}").unwrap();
        store.remove(SETTINGS_SLOT).unwrap();
        store.remove(SETTINGS_SLOT).unwrap();
        assert_eq!(store.get(SETTINGS_SLOT).unwrap(), None);
    }

    #[test]
    fn keys_escaping_the_directory_are_rejected() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data");
        let mut store = FileSlotStore::open(&data).unwrap();

        for key in ["drawings-/../../x", "../x", "a\\b", ""] {
            assert!(matches!(
                store.set(key, "[]"),
                Err(NotesError::InvalidSlotKey { .. })
            ));
            assert!(store.get(key).is_err());
            assert!(store.remove(key).is_err());
        }
        assert!(!dir.path().join("x.json").exists());
        assert!(store.get("drawings-1700000000000").unwrap().is_none());
    }

    #[test]
    fn memory_slots_are_independent() {
        let mut store = MemorySlotStore::new();
        store.set(NOTES_SLOT, "a").unwrap();
        store.set(SETTINGS_SLOT, "b").unwrap();
        assert_eq!(store.get(NOTES_SLOT).unwrap().as_deref(), Some("a"));
        assert_eq!(store.get(SETTINGS_SLOT).unwrap().as_deref(), Some("b"));
    }
}
