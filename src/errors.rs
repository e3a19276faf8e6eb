//! Error types for the notedeck application.
//!
//! This module defines custom error types that categorize the failures
//! that can occur while persisting, importing and exporting notes.

use std::{io, path::PathBuf};

use thiserror::Error;

/// The main error type for the notedeck application.
#[derive(Error, Debug)]
pub enum NotesError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Note was not found when a caller needed it to exist.
    #[error("Note not found: {id}")]
    NoteNotFound { id: String },

    /// The uploaded file is not a plain text file.
    #[error("Please select a text file (.txt, .md, or other plain text files): {file_name}")]
    UnsupportedUpload { file_name: String },

    /// The uploaded file could not be read as text.
    #[error("Failed to read file {path}: {message}")]
    UploadRead { path: PathBuf, message: String },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Invalid value supplied for a setting.
    #[error("Invalid setting {key}: {message}")]
    InvalidSetting { key: String, message: String },

    /// Slot name that cannot be stored safely.
    #[error("Invalid slot key: {key:?}")]
    InvalidSlotKey { key: String },

    /// Directory creation or access failed.
    #[error("Failed to create or access directory: {path}")]
    DirectoryError { path: PathBuf },

    #[error("{message}")]
    EditorError { message: String },
}
