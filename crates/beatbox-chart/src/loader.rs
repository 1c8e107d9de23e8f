use std::sync::Arc;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{ChartError, ChartSource, Difficulty, RawMove, SongInfo, has_required_sections, parse_chart};

/// Chart file names tried for every song, in priority order.
pub const CHART_CANDIDATES: [&str; 3] = ["chart.chart", "waves.chart", "notes.chart"];

/// A chart ready for play. Empty when nothing usable was found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadedChart {
    pub song_id: Option<String>,
    /// Candidate file the chart was read from.
    pub source_file: Option<String>,
    pub song: SongInfo,
    pub difficulty: Difficulty,
    /// Moves sorted ascending by time.
    pub moves: Vec<RawMove>,
}

impl LoadedChart {
    pub fn empty(song_id: Option<&str>, difficulty: Difficulty) -> Self {
        Self {
            song_id: song_id.map(str::to_string),
            difficulty,
            ..Default::default()
        }
    }

    pub fn note_count(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Finds and parses the chart of a song through a [`ChartSource`].
#[derive(Clone)]
pub struct ChartLoader {
    source: Arc<dyn ChartSource>,
}

impl ChartLoader {
    pub fn new(source: Arc<dyn ChartSource>) -> Self {
        Self { source }
    }

    pub fn from_source<S: ChartSource + 'static>(source: S) -> Self {
        Self::new(Arc::new(source))
    }

    /// Load a chart, degrading to an empty chart on any failure.
    ///
    /// A song may still play without a playable chart, so nothing here is
    /// reported to the caller beyond the empty result.
    pub fn load(&self, song_id: &str, difficulty: Difficulty) -> LoadedChart {
        match self.try_load(song_id, difficulty) {
            Ok(chart) => chart,
            Err(e @ ChartError::NoValidCandidate { .. }) => {
                warn!("ChartValidationFailed song={song_id}: {e}");
                LoadedChart::empty(Some(song_id), difficulty)
            }
            Err(e) => {
                warn!("ChartLoadError song={song_id}: {e}");
                LoadedChart::empty(Some(song_id), difficulty)
            }
        }
    }

    pub fn try_load(&self, song_id: &str, difficulty: Difficulty) -> Result<LoadedChart, ChartError> {
        let (file_name, text) = self.fetch_first_valid(song_id)?;
        let parsed = parse_chart(&text, difficulty)?;

        if parsed.skipped_lines > 0 {
            warn!(
                "Skipped {} malformed lines in {song_id}/{file_name}",
                parsed.skipped_lines
            );
        }
        info!(
            "Loaded chart {song_id}/{file_name}: {} moves ({})",
            parsed.moves.len(),
            parsed.difficulty
        );

        Ok(LoadedChart {
            song_id: Some(song_id.to_string()),
            source_file: Some(file_name.to_string()),
            song: parsed.song,
            difficulty: parsed.difficulty,
            moves: parsed.moves,
        })
    }

    fn fetch_first_valid(&self, song_id: &str) -> Result<(&'static str, String), ChartError> {
        for file_name in CHART_CANDIDATES {
            match self.source.fetch(song_id, file_name) {
                Ok(text) if has_required_sections(&text) => return Ok((file_name, text)),
                Ok(_) => debug!("{song_id}/{file_name} lacks [Song] or [SyncTrack]"),
                Err(e) => debug!("{song_id}/{file_name} unavailable: {e}"),
            }
        }
        Err(ChartError::NoValidCandidate {
            song_id: song_id.to_string(),
        })
    }
}
