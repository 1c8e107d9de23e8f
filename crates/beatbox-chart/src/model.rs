use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Difficulty tier of a chart, hardest first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Expert,
    Hard,
    Normal,
    Easy,
}

impl Difficulty {
    /// All tiers ordered from hardest to easiest.
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Expert,
        Difficulty::Hard,
        Difficulty::Normal,
        Difficulty::Easy,
    ];

    /// Name of the note section holding this tier in a `.chart` file.
    pub fn section_name(self) -> &'static str {
        match self {
            Self::Expert => "ExpertSingle",
            Self::Hard => "HardSingle",
            Self::Normal => "MediumSingle",
            Self::Easy => "EasySingle",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Expert => "expert",
            Self::Hard => "hard",
            Self::Normal => "normal",
            Self::Easy => "easy",
        }
    }

    /// Order in which sections are tried when this tier is requested:
    /// the tier itself, then harder tiers nearest first, then easier tiers.
    pub fn fallback_order(self) -> Vec<Difficulty> {
        let pos = self as usize;
        let mut order = vec![self];
        order.extend(Self::ALL[..pos].iter().rev().copied());
        order.extend(Self::ALL[pos + 1..].iter().copied());
        order
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "expert" => Ok(Self::Expert),
            "hard" => Ok(Self::Hard),
            "normal" | "medium" => Ok(Self::Normal),
            "easy" => Ok(Self::Easy),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// Legacy move names emitted by chart authoring tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveKind {
    Jab,
    Punch,
    Hook,
}

impl MoveKind {
    pub fn token(self) -> &'static str {
        match self {
            Self::Jab => "jab",
            Self::Punch => "punch",
            Self::Hook => "hook",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "jab" => Some(Self::Jab),
            "punch" => Some(Self::Punch),
            "hook" => Some(Self::Hook),
            _ => None,
        }
    }
}

/// A single parsed move before it becomes a playable note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMove {
    /// Absolute time from playback start in milliseconds.
    pub ms: f64,
    /// Raw lane index (0, 1 or 2).
    pub lane_index: u8,
    pub kind: MoveKind,
    /// Tick position in the source chart.
    pub raw_point: u64,
}

/// Metadata from the `[Song]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongInfo {
    pub name: Option<String>,
    pub artist: Option<String>,
    pub charter: Option<String>,
    /// Audio offset in seconds.
    pub offset_s: f64,
    /// Ticks per quarter note.
    pub resolution: u32,
    pub music_stream: Option<String>,
}

pub const DEFAULT_RESOLUTION: u32 = 192;

impl Default for SongInfo {
    fn default() -> Self {
        Self {
            name: None,
            artist: None,
            charter: None,
            offset_s: 0.0,
            resolution: DEFAULT_RESOLUTION,
            music_stream: None,
        }
    }
}

/// Output of parsing one difficulty of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedChart {
    pub song: SongInfo,
    /// Tier whose section the moves came from; the requested tier when no
    /// note section exists at all.
    pub difficulty: Difficulty,
    /// Moves sorted ascending by time.
    pub moves: Vec<RawMove>,
    /// Note lines that could not be parsed.
    pub skipped_lines: usize,
}
