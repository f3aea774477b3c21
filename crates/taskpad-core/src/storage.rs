use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::settings::Settings;
use crate::task::Task;

const TASKS_ENTRY: &str = "tasks";
const DARK_MODE_ENTRY: &str = "dark_mode";
const SETTINGS_ENTRY: &str = "settings";

/// Durable key-value substrate: one file per named entry under the data
/// directory, every value crossing the boundary as a string.
#[derive(Debug)]
pub struct Storage {
    pub data_dir: PathBuf,
}

impl Storage {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let data_dir = data_dir.to_path_buf();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        info!(data_dir = %data_dir.display(), "opened storage");
        Ok(Self { data_dir })
    }

    /// Load the persisted task collection. A missing, unreadable, or corrupt
    /// entry falls back to an empty collection so startup never fails on
    /// bad persisted state.
    #[tracing::instrument(skip(self))]
    pub fn load_tasks(&self) -> Vec<Task> {
        let Some(raw) = self.read_entry(TASKS_ENTRY) else {
            return vec![];
        };

        match serde_json::from_str::<Vec<Task>>(&raw) {
            Ok(tasks) => {
                debug!(count = tasks.len(), "loaded tasks");
                tasks
            }
            Err(err) => {
                warn!(error = %err, "corrupt tasks entry; starting with empty collection");
                vec![]
            }
        }
    }

    #[tracing::instrument(skip(self, tasks))]
    pub fn save_tasks(&self, tasks: &[Task]) -> anyhow::Result<()> {
        let encoded = serde_json::to_string(tasks).context("failed to encode tasks")?;
        self.write_entry(TASKS_ENTRY, &encoded)
            .context("failed to save tasks entry")
    }

    /// Same fallback contract as tasks: an undecodable settings record
    /// clamps to defaults rather than failing startup.
    #[tracing::instrument(skip(self))]
    pub fn load_settings(&self) -> Settings {
        let Some(raw) = self.read_entry(SETTINGS_ENTRY) else {
            return Settings::default();
        };

        match serde_json::from_str::<Settings>(&raw) {
            Ok(settings) => settings,
            Err(err) => {
                warn!(error = %err, "corrupt settings entry; using defaults");
                Settings::default()
            }
        }
    }

    #[tracing::instrument(skip(self, settings))]
    pub fn save_settings(&self, settings: &Settings) -> anyhow::Result<()> {
        let encoded = serde_json::to_string(settings).context("failed to encode settings")?;
        self.write_entry(SETTINGS_ENTRY, &encoded)
            .context("failed to save settings entry")
    }

    #[tracing::instrument(skip(self))]
    pub fn load_dark_mode(&self) -> bool {
        self.read_entry(DARK_MODE_ENTRY)
            .map(|raw| raw.trim() == "true")
            .unwrap_or(false)
    }

    #[tracing::instrument(skip(self))]
    pub fn save_dark_mode(&self, enabled: bool) -> anyhow::Result<()> {
        self.write_entry(DARK_MODE_ENTRY, if enabled { "true" } else { "false" })
            .context("failed to save dark_mode entry")
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}.data"))
    }

    fn read_entry(&self, key: &str) -> Option<String> {
        let path = self.entry_path(key);
        match fs::read_to_string(&path) {
            Ok(raw) => Some(raw),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!(entry = key, error = %err, "failed reading entry");
                None
            }
        }
    }

    fn write_entry(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let path = self.entry_path(key);
        debug!(entry = key, bytes = value.len(), "writing entry atomically");

        let mut temp = NamedTempFile::new_in(&self.data_dir)?;
        temp.write_all(value.as_bytes())?;
        temp.flush()?;

        temp.persist(&path)
            .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

        Ok(())
    }
}

/// Data directory: explicit override, then $TASKPAD_DATA, then ~/.taskpad.
#[tracing::instrument(skip(override_dir))]
pub fn resolve_data_dir(override_dir: Option<&Path>) -> anyhow::Result<PathBuf> {
    if let Some(path) = override_dir {
        return Ok(path.to_path_buf());
    }

    if let Ok(env_dir) = std::env::var("TASKPAD_DATA") {
        return Ok(PathBuf::from(env_dir));
    }

    let home = dirs::home_dir().ok_or_else(|| anyhow!("cannot determine home directory"))?;
    Ok(home.join(".taskpad"))
}
