use std::path::{Path, PathBuf};

use anyhow::Result;
use beatbox_chart::Difficulty;
use clap::Args;

use crate::settings::Settings;

#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    /// Master volume, clamped to 0.0..=1.0.
    #[arg(long)]
    pub volume: Option<f32>,

    #[arg(long)]
    pub difficulty: Option<Difficulty>,

    #[arg(long)]
    pub songs_root: Option<PathBuf>,

    /// Fetch charts from this web server.
    #[arg(long, conflicts_with = "local")]
    pub chart_base_url: Option<String>,

    /// Read charts from the songs folder again.
    #[arg(long)]
    pub local: bool,

    #[arg(long)]
    pub scroll_speed: Option<f64>,

    /// Restore every default before applying other changes.
    #[arg(long)]
    pub reset: bool,
}

pub fn run(settings: Settings, path: &Path, args: &SettingsArgs) -> Result<()> {
    let (settings, changed) = apply(settings, args);
    if changed {
        settings.save(path)?;
    }
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

/// Apply the requested changes. Returns whether anything was requested.
pub fn apply(mut settings: Settings, args: &SettingsArgs) -> (Settings, bool) {
    let mut changed = false;

    if args.reset {
        settings = Settings::default();
        changed = true;
    }
    if let Some(volume) = args.volume {
        settings.volume = volume.clamp(0.0, 1.0);
        changed = true;
    }
    if let Some(difficulty) = args.difficulty {
        settings.difficulty = difficulty;
        changed = true;
    }
    if let Some(root) = &args.songs_root {
        settings.songs_root = root.clone();
        changed = true;
    }
    if let Some(url) = &args.chart_base_url {
        settings.chart_base_url = Some(url.clone());
        changed = true;
    }
    if args.local {
        settings.chart_base_url = None;
        changed = true;
    }
    if let Some(speed) = args.scroll_speed.filter(|s| *s > 0.0) {
        settings.scroll_speed = speed;
        changed = true;
    }

    (settings, changed)
}
