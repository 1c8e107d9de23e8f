use std::path::Path;

use anyhow::{Context, Result};
use beatbox_chart::Difficulty;
use serde::{Deserialize, Serialize};

use crate::judge::JudgeWindows;

/// Playfield geometry and timing used by the engine.
/// All lengths are in pixels, all durations in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Note scroll speed in pixels per second.
    pub scroll_speed: f64,
    /// Vertical position of the hit line.
    pub hit_line_y: f64,
    /// Distance past the hit line after which an untouched note is missed.
    pub miss_overshoot_px: f64,
    /// Notes within this timing error are eligible for an input.
    pub hit_window_ms: f64,
    pub windows: JudgeWindows,
    /// Extra margin above and below the surface for visible notes.
    pub visible_margin_px: f64,
    pub difficulty: Difficulty,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scroll_speed: 150.0,
            hit_line_y: 400.0,
            miss_overshoot_px: 100.0,
            hit_window_ms: 120.0,
            windows: JudgeWindows::default(),
            visible_margin_px: 50.0,
            difficulty: Difficulty::Expert,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read engine config: {}", path.display()))?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.scroll_speed > 0.0) {
            anyhow::bail!("scroll_speed must be positive, got {}", self.scroll_speed);
        }
        if self.hit_window_ms <= self.windows.good_ms {
            anyhow::bail!(
                "hit_window_ms ({}) must be wider than the good window ({})",
                self.hit_window_ms,
                self.windows.good_ms
            );
        }
        self.windows.validate()
    }

    /// Time after a note's scheduled time at which it is auto-missed.
    pub fn miss_after_ms(&self) -> f64 {
        self.miss_overshoot_px / self.scroll_speed * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = EngineConfig::default();
        assert!((config.scroll_speed - 150.0).abs() < f64::EPSILON);
        assert!((config.hit_line_y - 400.0).abs() < f64::EPSILON);
        assert_eq!(config.difficulty, Difficulty::Expert);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn miss_threshold_in_ms() {
        let config = EngineConfig::default();
        // 100px at 150px/s
        assert!((config.miss_after_ms() - 666.666).abs() < 0.01);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{ "scroll_speed": 300.0, "difficulty": "hard" }"#).unwrap();
        assert!((config.scroll_speed - 300.0).abs() < f64::EPSILON);
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert!((config.hit_window_ms - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_hit_window_narrower_than_tiers() {
        let result = EngineConfig::from_json(r#"{ "hit_window_ms": 50.0 }"#);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_non_positive_speed() {
        assert!(EngineConfig::from_json(r#"{ "scroll_speed": 0.0 }"#).is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{ "hit_line_y": 500.0 }"#).unwrap();
        let config = EngineConfig::load(&path).unwrap();
        assert!((config.hit_line_y - 500.0).abs() < f64::EPSILON);
    }
}
