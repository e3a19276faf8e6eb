//! Persisted UI preferences.
//!
//! Preferences live in their own slot, independent of the notes. Any field
//! missing from the stored object takes its default; a value that does not
//! parse at all is replaced wholesale by the defaults.
use std::{fmt, ops::RangeInclusive, str::FromStr};

use log::{debug, error, info};
use serde::{Deserialize, Serialize};

use crate::{NotesError, Result, SlotStore, SETTINGS_SLOT};

pub const FONT_SIZE_RANGE: RangeInclusive<u32> = 12..=24;
pub const LINE_HEIGHT_RANGE: RangeInclusive<f32> = 1.2..=2.0;
pub const MAX_WIDTH_RANGE: RangeInclusive<u32> = 600..=1200;

/// Font families offered for reading, with their CSS font stacks
pub const FONT_FAMILIES: &[(&str, &str)] = &[
    ("Inter", "Inter, sans-serif"),
    ("System", "-apple-system, BlinkMacSystemFont, sans-serif"),
    ("Georgia", "Georgia, serif"),
    ("Times", "Times, serif"),
    ("Courier", "Courier, monospace"),
    ("Helvetica", "Helvetica, sans-serif"),
];

/// Which main view the app last showed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    List,
    Preview,
    Edit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Sepia,
}

impl Theme {
    /// Background and text colours for rendered documents
    pub fn colors(&self) -> (&'static str, &'static str) {
        match self {
            Theme::Light => ("#ffffff", "#111827"),
            Theme::Dark => ("#111827", "#f3f4f6"),
            Theme::Sepia => ("#fffbeb", "#78350f"),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Sepia => "sepia",
        })
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "sepia" => Ok(Theme::Sepia),
            other => Err(format!("unknown theme '{}'", other)),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ViewMode::List => "list",
            ViewMode::Preview => "preview",
            ViewMode::Edit => "edit",
        })
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "list" => Ok(ViewMode::List),
            "preview" => Ok(ViewMode::Preview),
            "edit" => Ok(ViewMode::Edit),
            other => Err(format!("unknown view '{}'", other)),
        }
    }
}

/// Display settings for reading mode and formatted exports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadingSettings {
    pub font_size: u32,
    /// One of the names in [`FONT_FAMILIES`], or any CSS family
    pub font_family: String,
    pub line_height: f32,
    pub theme: Theme,
    /// Maximum content width in pixels
    pub max_width: u32,
}

impl Default for ReadingSettings {
    fn default() -> Self {
        Self {
            font_size: 16,
            font_family: "Inter".to_string(),
            line_height: 1.6,
            theme: Theme::Light,
            max_width: 800,
        }
    }
}

impl ReadingSettings {
    /// CSS font stack for the configured family
    pub fn font_stack(&self) -> &str {
        FONT_FAMILIES
            .iter()
            .find(|(name, _)| *name == self.font_family)
            .map(|(_, stack)| *stack)
            .unwrap_or(self.font_family.as_str())
    }
}

/// Everything kept in the settings slot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub sidebar_collapsed: bool,
    pub current_view: ViewMode,
    pub reading: ReadingSettings,
}

/// Partial change to the top-level settings
#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub sidebar_collapsed: Option<bool>,
    pub current_view: Option<ViewMode>,
}

/// Partial change to the reading settings
#[derive(Debug, Clone, Default)]
pub struct ReadingPatch {
    pub font_size: Option<u32>,
    pub font_family: Option<String>,
    pub line_height: Option<f32>,
    pub theme: Option<Theme>,
    pub max_width: Option<u32>,
}

/// Current settings plus the write-through to their slot
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    settings: AppSettings,
}

impl SettingsStore {
    /// Loads settings, falling back to defaults when the slot is empty,
    /// unreadable or corrupt.
    pub fn load<S: SlotStore>(slots: &S) -> Self {
        let settings = match slots.get(SETTINGS_SLOT) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                error!("Failed to parse settings: {}", e);
                AppSettings::default()
            }),
            Ok(None) => {
                debug!("No stored settings, using defaults");
                AppSettings::default()
            }
            Err(e) => {
                error!("Failed to read slot {}: {}", SETTINGS_SLOT, e);
                AppSettings::default()
            }
        };
        Self { settings }
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn reading(&self) -> &ReadingSettings {
        &self.settings.reading
    }

    pub fn update<S: SlotStore>(&mut self, slots: &mut S, patch: SettingsPatch) -> Result<()> {
        if let Some(collapsed) = patch.sidebar_collapsed {
            self.settings.sidebar_collapsed = collapsed;
        }
        if let Some(view) = patch.current_view {
            self.settings.current_view = view;
        }
        self.save(slots)
    }

    pub fn update_reading<S: SlotStore>(&mut self, slots: &mut S, patch: ReadingPatch) -> Result<()> {
        let reading = &mut self.settings.reading;
        if let Some(font_size) = patch.font_size {
            reading.font_size = font_size;
        }
        if let Some(font_family) = patch.font_family {
            reading.font_family = font_family;
        }
        if let Some(line_height) = patch.line_height {
            reading.line_height = line_height;
        }
        if let Some(theme) = patch.theme {
            reading.theme = theme;
        }
        if let Some(max_width) = patch.max_width {
            reading.max_width = max_width;
        }
        self.save(slots)
    }

    pub fn toggle_sidebar<S: SlotStore>(&mut self, slots: &mut S) -> Result<()> {
        let collapsed = !self.settings.sidebar_collapsed;
        self.update(
            slots,
            SettingsPatch {
                sidebar_collapsed: Some(collapsed),
                ..Default::default()
            },
        )
    }

    /// Restores the defaults and writes them out
    pub fn reset<S: SlotStore>(&mut self, slots: &mut S) -> Result<()> {
        info!("Resetting settings to defaults");
        self.settings = AppSettings::default();
        self.save(slots)
    }

    /// Sets one setting from its textual `key` and `value`.
    ///
    /// Keys are the camelCase JSON names; reading fields may be given with
    /// or without a `reading.` prefix. Numeric values must lie within the
    /// ranges the reading panel offers.
    pub fn set<S: SlotStore>(&mut self, slots: &mut S, key: &str, value: &str) -> Result<()> {
        let key = key.strip_prefix("reading.").unwrap_or(key);
        let invalid = |message: String| NotesError::InvalidSetting {
            key: key.to_string(),
            message,
        };

        match key {
            "sidebarCollapsed" => {
                let collapsed = value.parse::<bool>().map_err(|e| invalid(e.to_string()))?;
                self.update(
                    slots,
                    SettingsPatch {
                        sidebar_collapsed: Some(collapsed),
                        ..Default::default()
                    },
                )
            }
            "currentView" => {
                let view = value.parse::<ViewMode>().map_err(invalid)?;
                self.update(
                    slots,
                    SettingsPatch {
                        current_view: Some(view),
                        ..Default::default()
                    },
                )
            }
            "fontSize" => {
                let size = value.parse::<u32>().map_err(|e| invalid(e.to_string()))?;
                if !FONT_SIZE_RANGE.contains(&size) {
                    return Err(invalid(format!("must be within {:?}", FONT_SIZE_RANGE)));
                }
                self.update_reading(
                    slots,
                    ReadingPatch {
                        font_size: Some(size),
                        ..Default::default()
                    },
                )
            }
            "fontFamily" => {
                if value.trim().is_empty() {
                    return Err(invalid("must not be empty".to_string()));
                }
                self.update_reading(
                    slots,
                    ReadingPatch {
                        font_family: Some(value.to_string()),
                        ..Default::default()
                    },
                )
            }
            "lineHeight" => {
                let height = value.parse::<f32>().map_err(|e| invalid(e.to_string()))?;
                if !LINE_HEIGHT_RANGE.contains(&height) {
                    return Err(invalid(format!("must be within {:?}", LINE_HEIGHT_RANGE)));
                }
                self.update_reading(
                    slots,
                    ReadingPatch {
                        line_height: Some(height),
                        ..Default::default()
                    },
                )
            }
            "theme" => {
                let theme = value.parse::<Theme>().map_err(invalid)?;
                self.update_reading(
                    slots,
                    ReadingPatch {
                        theme: Some(theme),
                        ..Default::default()
                    },
                )
            }
            "maxWidth" => {
                let width = value.parse::<u32>().map_err(|e| invalid(e.to_string()))?;
                if !MAX_WIDTH_RANGE.contains(&width) {
                    return Err(invalid(format!("must be within {:?}", MAX_WIDTH_RANGE)));
                }
                self.update_reading(
                    slots,
                    ReadingPatch {
                        max_width: Some(width),
                        ..Default::default()
                    },
                )
            }
            _ => Err(invalid("unknown setting".to_string())),
        }
    }

    fn save<S: SlotStore>(&self, slots: &mut S) -> Result<()> {
        let json = serde_json::to_string(&self.settings)?;
        slots.set(SETTINGS_SLOT, &json)?;
        debug!("Settings saved");
        Ok(())
    }
}
