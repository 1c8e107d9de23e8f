#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use beatbox_chart::{ChartLoader, LoadedChart, MoveKind, RawMove};
use beatbox_play::traits::{FrameRecorder, MockAudio, MockTimeProvider};
use beatbox_play::{EngineConfig, GameEngine, NoteResult, SessionStats};

pub const SURFACE_HEIGHT: f64 = 600.0;

/// Engine wired to mock collaborators, with handles kept for inspection.
pub struct Harness {
    pub engine: GameEngine,
    pub time: MockTimeProvider,
    pub audio: Rc<RefCell<MockAudio>>,
    pub frames: FrameRecorder,
    pub results: Rc<RefCell<Vec<NoteResult>>>,
    pub ended: Rc<RefCell<Vec<SessionStats>>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::build(config, None)
    }

    pub fn with_loader(loader: ChartLoader) -> Self {
        Self::build(EngineConfig::default(), Some(loader))
    }

    fn build(config: EngineConfig, loader: Option<ChartLoader>) -> Self {
        let time = MockTimeProvider::new();
        let audio = Rc::new(RefCell::new(MockAudio::new()));
        let frames = FrameRecorder::new(SURFACE_HEIGHT);

        let mut engine = GameEngine::new(
            config,
            Box::new(frames.clone()),
            audio.clone(),
            Box::new(time.clone()),
        );
        if let Some(loader) = loader {
            engine = engine.with_loader(loader);
        }

        let results = Rc::new(RefCell::new(Vec::new()));
        let sink = results.clone();
        engine.on_note_result(move |r: &NoteResult| sink.borrow_mut().push(r.clone()));

        let ended = Rc::new(RefCell::new(Vec::new()));
        let sink = ended.clone();
        engine.on_session_end(move |s: &SessionStats| sink.borrow_mut().push(s.clone()));

        Self {
            engine,
            time,
            audio,
            frames,
            results,
            ended,
        }
    }

    /// Start with `chart` preloaded and run the first frame.
    pub fn running(chart: LoadedChart) -> Self {
        let mut h = Self::new();
        h.engine.start_preloaded(Some("neon"), chart);
        h.engine.tick();
        h
    }

    /// Move the mock clock to `ms` of session time.
    pub fn at(&self, ms: f64) {
        self.time.set_time((ms * 1000.0).round() as i64);
    }

    pub fn tick_at(&mut self, ms: f64) {
        self.at(ms);
        self.engine.tick();
    }

    pub fn result_count(&self) -> usize {
        self.results.borrow().len()
    }
}

/// Chart from `(ms, lane_index, kind)` triples.
pub fn chart(moves: &[(f64, u8, MoveKind)]) -> LoadedChart {
    LoadedChart {
        song_id: Some("neon".to_string()),
        moves: moves
            .iter()
            .enumerate()
            .map(|(i, &(ms, lane_index, kind))| RawMove {
                ms,
                lane_index,
                kind,
                raw_point: i as u64 * 192,
            })
            .collect(),
        ..Default::default()
    }
}
