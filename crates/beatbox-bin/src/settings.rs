use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use beatbox_chart::Difficulty;
use beatbox_play::EngineConfig;
use directories::ProjectDirs;
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Persisted user settings for the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Master volume (0.0..=1.0)
    pub volume: f32,
    pub difficulty: Difficulty,
    /// Folder holding one sub-folder per song
    pub songs_root: PathBuf,
    /// Fetch charts from this web server instead of `songs_root`
    pub chart_base_url: Option<String>,
    /// Note scroll speed in pixels per second
    pub scroll_speed: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            volume: 0.8,
            difficulty: Difficulty::Expert,
            songs_root: PathBuf::from("songs"),
            chart_base_url: None,
            scroll_speed: EngineConfig::default().scroll_speed,
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults when the file is missing or unreadable.
    pub fn load(path: &Path) -> Self {
        match Self::load_from_file(path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to load settings from {}: {e}, using defaults", path.display());
                Self::default()
            }
        }
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let mut settings: Self = serde_json::from_str(&content)?;
        settings.volume = settings.volume.clamp(0.0, 1.0);
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write settings: {}", path.display()))?;
        info!("Saved settings to {}", path.display());
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        if let Some(proj_dirs) = ProjectDirs::from("com", "beatbox", "beatbox") {
            proj_dirs.config_dir().join("settings.json")
        } else {
            PathBuf::from(".beatbox-settings.json")
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            scroll_speed: self.scroll_speed,
            difficulty: self.difficulty,
            ..Default::default()
        }
    }
}
