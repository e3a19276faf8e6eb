use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use which::which;

use crate::{NotesError, Result};

/// Origin and path that share links are built on when none is configured
pub const DEFAULT_SHARE_BASE_URL: &str = "http://localhost:5173/";

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory holding the durable slots
    pub data_dir: PathBuf,

    /// Default directory for exported files
    pub export_dir: PathBuf,

    /// `<origin-and-path>` prefix of share links
    pub share_base_url: String,

    /// Editor command used by `edit --editor`
    pub editor_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let (data_dir, export_dir) = match project_dirs() {
            Some(dirs) => (
                dirs.data_dir().to_path_buf(),
                dirs.data_dir().join("exports"),
            ),
            None => (PathBuf::from(".notedeck"), PathBuf::from(".")),
        };

        Self {
            data_dir,
            export_dir,
            share_base_url: DEFAULT_SHARE_BASE_URL.to_string(),
            editor_command: None,
        }
    }
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Loads the config from `path`, or from [`Config::default_path`].
    ///
    /// A missing file yields the defaults; a file that cannot be parsed is
    /// an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => path,
            None => {
                debug!("No config location available, using defaults");
                return Ok(Self::default());
            }
        };

        if !path.exists() {
            debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(&path)?;
        let config = serde_json::from_str(&raw).map_err(|e| NotesError::ConfigError {
            message: format!("failed to parse {}: {}", path.display(), e),
        })?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    // This method provides smart fallbacks when no editor is configured
    pub fn get_editor_command(&self) -> String {
        if let Some(editor) = &self.editor_command {
            return editor.clone();
        }

        if let Ok(editor) = std::env::var("EDITOR") {
            return editor;
        }

        if cfg!(windows) {
            "notepad".to_string()
        } else if cfg!(target_os = "macos") {
            "open -W -t".to_string()
        } else {
            for editor in &["nano", "vim", "vi", "emacs"] {
                if which(editor).is_ok() {
                    return editor.to_string();
                }
            }
            "nano".to_string()
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "notedeck")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(Some(&dir.path().join("config.json"))).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.share_base_url, DEFAULT_SHARE_BASE_URL);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"share_base_url":"https://example.org/notes"}"#).unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.share_base_url, "https://example.org/notes");
        assert_eq!(config.data_dir, Config::default().data_dir);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{").unwrap();

        assert!(matches!(
            Config::load(Some(&path)),
            Err(NotesError::ConfigError { .. })
        ));
    }

    #[test]
    fn configured_editor_wins() {
        let config = Config {
            editor_command: Some("code --wait".into()),
            ..Default::default()
        };
        assert_eq!(config.get_editor_command(), "code --wait");
    }
}
