use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::storage::Storage;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,
    Sunset,
    Forest,
    Ocean,
    Lavender,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Grid,
    List,
    Compact,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Font {
    #[default]
    System,
    Vazir,
    Yekan,
    Sahel,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Sm,
    #[default]
    Md,
    Lg,
    Xl,
}

/// Display preferences, persisted and restored as one record. Independent
/// of task data.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    #[serde(default)]
    pub theme: Theme,

    #[serde(default)]
    pub layout: Layout,

    #[serde(default)]
    pub font: Font,

    #[serde(default)]
    pub font_size: FontSize,
}

/// Partial update: fields left as `None` keep their current value.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettingsUpdate {
    pub theme: Option<Theme>,
    pub layout: Option<Layout>,
    pub font: Option<Font>,
    pub font_size: Option<FontSize>,
}

impl Settings {
    pub fn merge(&mut self, update: SettingsUpdate) {
        if let Some(theme) = update.theme {
            self.theme = theme;
        }
        if let Some(layout) = update.layout {
            self.layout = layout;
        }
        if let Some(font) = update.font {
            self.font = font;
        }
        if let Some(font_size) = update.font_size {
            self.font_size = font_size;
        }
    }
}

#[derive(Debug)]
pub struct SettingsStore {
    settings: Settings,
    dark_mode: bool,
    storage: Storage,
}

impl SettingsStore {
    /// Restore the persisted record and dark-mode flag. Undecodable
    /// persisted values clamp to defaults inside the storage layer.
    #[tracing::instrument(skip(storage))]
    pub fn open(storage: Storage) -> Self {
        let settings = storage.load_settings();
        let dark_mode = storage.load_dark_mode();
        info!(?settings, dark_mode, "restored settings");
        Self {
            settings,
            dark_mode,
            storage,
        }
    }

    pub fn get(&self) -> Settings {
        self.settings
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    /// Merge the given fields into the record and persist the result.
    /// The in-memory record keeps the new value even if the write fails.
    #[tracing::instrument(skip(self))]
    pub fn update(&mut self, update: SettingsUpdate) -> anyhow::Result<Settings> {
        self.settings.merge(update);
        debug!(settings = ?self.settings, "settings updated");
        self.storage.save_settings(&self.settings)?;
        Ok(self.settings)
    }

    #[tracing::instrument(skip(self))]
    pub fn toggle_dark_mode(&mut self) -> anyhow::Result<bool> {
        self.dark_mode = !self.dark_mode;
        self.storage.save_dark_mode(self.dark_mode)?;
        Ok(self.dark_mode)
    }
}
