// Settings loading
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::code::CategorySelection;
use crate::playback::timing::{TimingConfig, DEFAULT_FREQUENCY_HZ, DEFAULT_WPM};

/// Practice settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PracticeSettings {
    /// Characters played by `random` when no count is given
    pub count: usize,
    pub categories: CategorySelection,
}

impl Default for PracticeSettings {
    fn default() -> Self {
        Self {
            count: 10,
            categories: CategorySelection::default(),
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub version: i32, // Settings schema version for future migrations
    pub wpm: f64,
    pub frequency_hz: f32,
    pub practice: PracticeSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: 1,
            wpm: DEFAULT_WPM,
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            practice: PracticeSettings::default(),
        }
    }
}

impl AppSettings {
    /// Default settings directory, e.g. `~/.config/morsetone`
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("morsetone"))
    }

    /// Get the settings file path
    pub fn get_settings_path(app_dir: &Path) -> PathBuf {
        app_dir.join("settings.json")
    }

    /// Load settings from a directory, or return defaults if there is no file
    pub fn load(app_dir: &Path) -> Result<Self> {
        let path = Self::get_settings_path(app_dir);

        if !path.exists() {
            info!(path = ?path, "No settings file found, using defaults");
            return Ok(Self::default());
        }

        Self::load_file(&path)
    }

    /// Load and validate a specific settings file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {:?}", path))?;

        let settings: AppSettings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings file {:?}", path))?;

        settings.timing()
            .with_context(|| format!("Invalid timing in settings file {:?}", path))?;

        info!(path = ?path, "Loaded settings");
        Ok(settings)
    }

    /// Validated timing from these settings
    pub fn timing(&self) -> crate::error::Result<TimingConfig> {
        TimingConfig::new(self.wpm, self.frequency_hz)
    }
}
