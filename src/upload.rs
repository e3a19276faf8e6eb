//! Importing a plain text file as a new note.
use std::{fs, path::Path};

use log::{debug, error};

use crate::{NotesError, Result};

/// Extensions accepted as plain text
pub const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "text", "csv", "log", "json", "html", "htm", "xml", "css", "rst",
];

/// Title and body read from an uploaded file, ready for `NoteStore::create`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedNote {
    pub title: String,
    pub content: String,
}

/// Whether a file name looks like plain text
pub fn is_text_file(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// File name with its final extension removed
pub fn title_from_file_name(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => file_name[..dot].to_string(),
        _ => file_name.to_string(),
    }
}

/// Reads `path` as an upload.
///
/// Nothing is created here; on error the caller shows the message and
/// leaves the store alone.
pub fn read_upload(path: &Path) -> Result<UploadedNote> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    if !is_text_file(&file_name) {
        return Err(NotesError::UnsupportedUpload { file_name });
    }

    debug!("Reading upload from {}", path.display());
    let bytes = fs::read(path).map_err(|e| {
        error!("File reading error for {}: {}", path.display(), e);
        NotesError::UploadRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;
    let content = String::from_utf8(bytes).map_err(|e| {
        error!("Upload {} is not valid UTF-8: {}", path.display(), e);
        NotesError::UploadRead {
            path: path.to_path_buf(),
            message: "file is not valid UTF-8 text".to_string(),
        }
    })?;

    Ok(UploadedNote {
        title: title_from_file_name(&file_name),
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn title_drops_only_the_last_extension() {
        assert_eq!(title_from_file_name("notes.md"), "notes");
        assert_eq!(title_from_file_name("archive.tar.txt"), "archive.tar");
        assert_eq!(title_from_file_name("README"), "README");
        assert_eq!(title_from_file_name(".profile"), ".profile");
    }

    #[test]
    fn text_detection_by_extension() {
        assert!(is_text_file("a.md"));
        assert!(is_text_file("A.TXT"));
        assert!(!is_text_file("photo.png"));
        assert!(!is_text_file("Makefile"));
    }

    #[test]
    fn reads_markdown_upload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Meeting notes.md");
        fs::write(&path, "# agenda\n- one").unwrap();

        let upload = read_upload(&path).unwrap();
        assert_eq!(
            upload,
            UploadedNote {
                title: "Meeting notes".into(),
                content: "# agenda\n- one".into(),
            }
        );
    }

    #[test]
    fn rejects_binary_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("image.png");
        fs::write(&path, [0u8, 1, 2]).unwrap();

        assert!(matches!(
            read_upload(&path),
            Err(NotesError::UnsupportedUpload { .. })
        ));
    }

    #[test]
    fn missing_or_invalid_files_are_read_errors() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            read_upload(&dir.path().join("gone.txt")),
            Err(NotesError::UploadRead { .. })
        ));

        let path = dir.path().join("bad.txt");
        fs::write(&path, [0xffu8, 0xfe, 0xfd]).unwrap();
        assert!(matches!(read_upload(&path), Err(NotesError::UploadRead { .. })));
    }
}
