use std::collections::BTreeMap;

use anyhow::Result;
use beatbox_chart::{Difficulty, LoadedChart};
use beatbox_play::{InputType, Lane, notes_from_chart};
use clap::Args;

use crate::settings::Settings;

#[derive(Args, Debug)]
pub struct InspectArgs {
    pub song_id: String,

    /// Difficulty to inspect (defaults to the saved setting).
    #[arg(short, long)]
    pub difficulty: Option<Difficulty>,

    /// Print the loaded chart as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run(settings: &Settings, args: &InspectArgs) -> Result<()> {
    let loader = super::chart_loader(settings)?;
    let difficulty = args.difficulty.unwrap_or(settings.difficulty);
    let chart = loader.try_load(&args.song_id, difficulty)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&chart)?);
    } else {
        print!("{}", summary(&chart));
    }
    Ok(())
}

/// Note counts keyed by lane and type.
pub fn note_counts(chart: &LoadedChart) -> BTreeMap<(Lane, InputType), usize> {
    let mut counts = BTreeMap::new();
    for note in notes_from_chart(chart) {
        *counts.entry((note.lane, note.input_type)).or_insert(0) += 1;
    }
    counts
}

fn summary(chart: &LoadedChart) -> String {
    let song = &chart.song;
    let mut out = String::new();
    out.push_str(&format!(
        "{} - {}\n",
        song.artist.as_deref().unwrap_or("Unknown artist"),
        song.name.as_deref().unwrap_or("Untitled")
    ));
    if let Some(charter) = &song.charter {
        out.push_str(&format!("Charted by {charter}\n"));
    }
    out.push_str(&format!(
        "File: {}  Difficulty: {}  Resolution: {}  Offset: {}s\n",
        chart.source_file.as_deref().unwrap_or("-"),
        chart.difficulty,
        song.resolution,
        song.offset_s
    ));
    let length_s = chart.moves.last().map_or(0.0, |m| m.ms / 1000.0);
    out.push_str(&format!("Notes: {} over {length_s:.1}s\n", chart.note_count()));
    for ((lane, input_type), count) in note_counts(chart) {
        out.push_str(&format!("  {lane:?} {input_type:?}: {count}\n"));
    }
    out
}
