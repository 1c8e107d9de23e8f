use std::fmt;

use beatbox_chart::{LoadedChart, MoveKind};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lane {
    Left,
    Right,
}

impl Lane {
    /// Lane for a raw chart lane index. Index 2 is a legacy right-lane slot.
    pub fn from_index(index: u8) -> Self {
        match index {
            0 => Self::Left,
            _ => Self::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Block,
    Uppercut,
    Hook,
}

impl From<MoveKind> for InputType {
    fn from(kind: MoveKind) -> Self {
        match kind {
            MoveKind::Jab => Self::Block,
            MoveKind::Punch => Self::Uppercut,
            MoveKind::Hook => Self::Hook,
        }
    }
}

/// Session-unique note identity: load order plus source tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NoteId {
    pub index: usize,
    pub tick: u64,
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "note-{}-{}", self.index, self.tick)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    pub id: NoteId,
    pub lane: Lane,
    pub input_type: InputType,
    pub scheduled_time_ms: f64,
    /// Vertical position in pixels as of the last update.
    pub position_px: f64,
    resolved: bool,
}

impl Note {
    pub fn new(id: NoteId, lane: Lane, input_type: InputType, scheduled_time_ms: f64) -> Self {
        Self {
            id,
            lane,
            input_type,
            scheduled_time_ms,
            position_px: 0.0,
            resolved: false,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Mark the note resolved. Returns false if it already was.
    pub(crate) fn resolve(&mut self) -> bool {
        !std::mem::replace(&mut self.resolved, true)
    }

    pub fn position_at(&self, now_ms: f64, hit_line_y: f64, scroll_speed: f64) -> f64 {
        hit_line_y - (self.scheduled_time_ms - now_ms) * scroll_speed / 1000.0
    }
}

/// Build the session's notes from a loaded chart, preserving its time order.
pub fn notes_from_chart(chart: &LoadedChart) -> Vec<Note> {
    chart
        .moves
        .iter()
        .enumerate()
        .map(|(index, m)| {
            Note::new(
                NoteId {
                    index,
                    tick: m.raw_point,
                },
                Lane::from_index(m.lane_index),
                InputType::from(m.kind),
                m.ms,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use beatbox_chart::RawMove;

    use super::*;

    #[test]
    fn legacy_lane_two_is_right() {
        assert_eq!(Lane::from_index(0), Lane::Left);
        assert_eq!(Lane::from_index(1), Lane::Right);
        assert_eq!(Lane::from_index(2), Lane::Right);
    }

    #[test]
    fn resolve_happens_once() {
        let mut note = Note::new(NoteId { index: 0, tick: 0 }, Lane::Left, InputType::Block, 0.0);
        assert!(note.resolve());
        assert!(!note.resolve());
        assert!(note.is_resolved());
    }

    #[test]
    fn position_reaches_hit_line_on_time() {
        let note = Note::new(NoteId { index: 0, tick: 0 }, Lane::Left, InputType::Block, 2000.0);
        assert!((note.position_at(2000.0, 400.0, 150.0) - 400.0).abs() < 1e-9);
        assert!((note.position_at(1000.0, 400.0, 150.0) - 250.0).abs() < 1e-9);
    }

    #[test]
    fn chart_moves_become_notes() {
        let chart = LoadedChart {
            moves: vec![
                RawMove { ms: 500.0, lane_index: 2, kind: MoveKind::Hook, raw_point: 192 },
                RawMove { ms: 1000.0, lane_index: 0, kind: MoveKind::Punch, raw_point: 384 },
            ],
            ..Default::default()
        };
        let notes = notes_from_chart(&chart);
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].lane, Lane::Right);
        assert_eq!(notes[0].input_type, InputType::Hook);
        assert_eq!(notes[1].input_type, InputType::Uppercut);
        assert_eq!(notes[1].id.to_string(), "note-1-384");
    }
}
