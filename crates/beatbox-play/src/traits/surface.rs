use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;

use crate::engine::EngineState;
use crate::note::{Note, NoteId};
use crate::score::SessionStats;

/// Everything a surface needs to draw one frame.
#[derive(Debug, Clone)]
pub struct Frame<'a> {
    pub time_ms: f64,
    pub hit_line_y: f64,
    pub state: EngineState,
    /// Unresolved notes within the surface bounds, in schedule order.
    pub notes: Vec<&'a Note>,
    pub stats: SessionStats,
}

/// Abstraction over whatever draws the playfield.
/// Implementations: FrameRecorder (testing, headless runs).
pub trait Surface {
    /// Drawable height in pixels.
    fn height(&self) -> f64;
    fn present(&mut self, frame: &Frame<'_>) -> Result<()>;
}

/// Owned copy of a presented frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFrame {
    pub time_ms: f64,
    pub state: EngineState,
    pub notes: Vec<(NoteId, f64)>,
    pub stats: SessionStats,
}

/// A Surface that records presented frames instead of drawing them.
///
/// Clones share the recording so one handle can stay outside the engine.
#[derive(Debug, Clone)]
pub struct FrameRecorder {
    height: f64,
    frames: Rc<RefCell<Vec<RecordedFrame>>>,
}

impl FrameRecorder {
    pub fn new(height: f64) -> Self {
        Self {
            height,
            frames: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.borrow().len()
    }

    pub fn last(&self) -> Option<RecordedFrame> {
        self.frames.borrow().last().cloned()
    }

    pub fn clear(&self) {
        self.frames.borrow_mut().clear();
    }
}

impl Surface for FrameRecorder {
    fn height(&self) -> f64 {
        self.height
    }

    fn present(&mut self, frame: &Frame<'_>) -> Result<()> {
        self.frames.borrow_mut().push(RecordedFrame {
            time_ms: frame.time_ms,
            state: frame.state,
            notes: frame
                .notes
                .iter()
                .map(|n| (n.id, n.position_px))
                .collect(),
            stats: frame.stats.clone(),
        });
        Ok(())
    }
}
