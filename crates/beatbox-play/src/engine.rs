use beatbox_chart::{ChartLoader, LoadedChart};
use log::{debug, info, warn};
use serde::Serialize;

use crate::clock::SessionClock;
use crate::config::EngineConfig;
use crate::input::InputAction;
use crate::judge::{Judge, Judgment};
use crate::load_task::ChartLoadTask;
use crate::note::{InputType, Lane, Note, notes_from_chart};
use crate::score::{Scoreboard, SessionStats};
use crate::traits::{Frame, SharedAudio, Surface, TimeProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    Idle,
    Loading,
    Running,
    Paused,
    Ended,
}

/// Payload delivered for every judgment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteResult {
    pub judgment: Judgment,
    /// The judged note; `None` for a press that found no note.
    pub note: Option<Note>,
    pub accuracy: f64,
}

type NoteResultCallback = Box<dyn FnMut(&NoteResult)>;
type SessionEndCallback = Box<dyn FnMut(&SessionStats)>;

/// Drives one play session: clock, note lifecycle, judging and scoring.
///
/// The host calls [`tick`](Self::tick) once per displayed frame and
/// [`handle_input`](Self::handle_input) for every player action, all on one
/// thread. Only the chart load runs elsewhere.
pub struct GameEngine {
    config: EngineConfig,
    judge: Judge,
    surface: Box<dyn Surface>,
    audio: SharedAudio,
    time: Box<dyn TimeProvider>,
    loader: Option<ChartLoader>,

    state: EngineState,
    resume_to: EngineState,
    clock: SessionClock,
    now_ms: f64,

    song_id: Option<String>,
    load_task: Option<ChartLoadTask>,
    chart: Option<LoadedChart>,
    notes: Vec<Note>,
    scoreboard: Scoreboard,

    track_started: bool,
    track_pending: bool,
    volume: f32,

    on_note_result: Option<NoteResultCallback>,
    on_session_end: Option<SessionEndCallback>,
}

impl GameEngine {
    pub fn new(
        config: EngineConfig,
        surface: Box<dyn Surface>,
        audio: SharedAudio,
        time: Box<dyn TimeProvider>,
    ) -> Self {
        Self {
            judge: Judge::new(config.windows),
            config,
            surface,
            audio,
            time,
            loader: None,
            state: EngineState::Idle,
            resume_to: EngineState::Running,
            clock: SessionClock::new(),
            now_ms: 0.0,
            song_id: None,
            load_task: None,
            chart: None,
            notes: Vec::new(),
            scoreboard: Scoreboard::new(),
            track_started: false,
            track_pending: false,
            volume: 1.0,
            on_note_result: None,
            on_session_end: None,
        }
    }

    pub fn with_loader(mut self, loader: ChartLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Register the judgment hook, replacing any previous one.
    pub fn on_note_result<F: FnMut(&NoteResult) + 'static>(&mut self, callback: F) {
        self.on_note_result = Some(Box::new(callback));
    }

    /// Register the session-end hook, replacing any previous one.
    pub fn on_session_end<F: FnMut(&SessionStats) + 'static>(&mut self, callback: F) {
        self.on_session_end = Some(Box::new(callback));
    }

    /// Start a session, loading the chart of `song_id` in the background.
    /// With no song the session runs without notes or backing track.
    pub fn start(&mut self, song_id: Option<&str>) {
        if !self.can_start() {
            return;
        }
        let difficulty = self.config.difficulty;
        let task = match (song_id, &self.loader) {
            (Some(id), Some(loader)) => ChartLoadTask::spawn(loader.clone(), id, difficulty),
            (Some(id), None) => {
                warn!("No chart loader configured; {id} plays without notes");
                ChartLoadTask::ready(LoadedChart::empty(Some(id), difficulty))
            }
            (None, _) => ChartLoadTask::ready(LoadedChart::empty(None, difficulty)),
        };
        self.begin(song_id, task);
    }

    /// Start a session with a chart that is already loaded.
    pub fn start_preloaded(&mut self, song_id: Option<&str>, chart: LoadedChart) {
        if !self.can_start() {
            return;
        }
        self.begin(song_id, ChartLoadTask::ready(chart));
    }

    fn can_start(&self) -> bool {
        if self.state != EngineState::Idle {
            warn!("start ignored: engine is {:?}", self.state);
            return false;
        }
        true
    }

    fn begin(&mut self, song_id: Option<&str>, task: ChartLoadTask) {
        self.song_id = song_id.map(str::to_string);
        self.load_task = Some(task);
        self.state = EngineState::Loading;
        self.clock.start(self.time.now_us());
        self.now_ms = 0.0;
        info!(
            "Session started ({})",
            self.song_id.as_deref().unwrap_or("instrumental")
        );
        self.play_track();
    }

    fn play_track(&mut self) {
        let Some(song_id) = self.song_id.clone() else {
            return;
        };
        let result = self.audio.borrow_mut().play_track(&song_id);
        match result {
            Ok(()) => {
                info!("MusicPlay song={song_id}");
                self.track_started = true;
                self.track_pending = false;
            }
            Err(e) => {
                warn!("Playback of {song_id} failed, retrying on resume: {e}");
                self.track_pending = true;
            }
        }
    }

    /// Advance one frame.
    pub fn tick(&mut self) {
        match self.state {
            EngineState::Idle | EngineState::Ended => return,
            EngineState::Paused => {
                self.present();
                return;
            }
            EngineState::Loading | EngineState::Running => {}
        }

        self.sample_time();
        if self.state == EngineState::Loading {
            self.poll_load();
        }
        self.update_notes();
        self.present();
        self.poll_track_end();
    }

    fn sample_time(&mut self) -> f64 {
        self.now_ms = self.clock.elapsed_ms(self.time.now_us());
        self.now_ms
    }

    fn poll_load(&mut self) {
        let Some(chart) = self.load_task.as_ref().and_then(ChartLoadTask::take_result) else {
            return;
        };
        self.load_task = None;
        self.notes = notes_from_chart(&chart);
        info!(
            "Chart ready: {} notes ({})",
            self.notes.len(),
            chart.difficulty
        );
        self.chart = Some(chart);
        self.state = EngineState::Running;
    }

    fn update_notes(&mut self) {
        let now = self.now_ms;
        let hit_line = self.config.hit_line_y;
        let miss_line = hit_line + self.config.miss_overshoot_px;

        for i in 0..self.notes.len() {
            let note = &mut self.notes[i];
            if note.is_resolved() {
                continue;
            }
            note.position_px = note.position_at(now, hit_line, self.config.scroll_speed);
            if note.position_px > miss_line && note.resolve() {
                let judgment = Judgment::auto_miss(now - note.scheduled_time_ms);
                debug!("NoteMiss {} at {now:.1}ms", note.id);
                let note = note.clone();
                self.resolve_with(judgment, Some(note));
            }
        }
    }

    fn resolve_with(&mut self, judgment: Judgment, note: Option<Note>) -> NoteResult {
        if note.is_some() {
            self.scoreboard.record_note(&judgment);
        } else {
            self.scoreboard.record_whiff();
        }
        let accuracy = self.accuracy();
        debug!("AccuracyUpdated {accuracy:.2}");

        let result = NoteResult {
            judgment,
            note,
            accuracy,
        };
        if let Some(callback) = self.on_note_result.as_mut() {
            callback(&result);
        }
        result
    }

    fn present(&mut self) {
        let height = self.surface.height();
        let margin = self.config.visible_margin_px;
        let stats = self.stats();
        let frame = Frame {
            time_ms: self.now_ms,
            hit_line_y: self.config.hit_line_y,
            state: self.state,
            notes: self
                .notes
                .iter()
                .filter(|n| is_visible(n, height, margin))
                .collect(),
            stats,
        };
        if let Err(e) = self.surface.present(&frame) {
            warn!("Surface failed to present frame: {e}");
        }
    }

    fn poll_track_end(&mut self) {
        if self.state != EngineState::Running || !self.track_started {
            return;
        }
        let finished = self.audio.borrow().track_finished();
        if finished {
            info!(
                "MusicEnd song={}",
                self.song_id.as_deref().unwrap_or_default()
            );
            self.end_session();
        }
    }

    fn end_session(&mut self) {
        let stats = self.stats();
        self.halt();
        info!(
            "Session ended: score {} accuracy {:.2}%",
            stats.score, stats.accuracy
        );
        if let Some(callback) = self.on_session_end.as_mut() {
            callback(&stats);
        }
    }

    fn halt(&mut self) {
        self.state = EngineState::Ended;
        self.load_task = None;
        self.track_pending = false;
        let result = self.audio.borrow_mut().stop();
        if let Err(e) = result {
            warn!("Failed to stop track: {e}");
        }
    }

    /// Judge a press in `lane` with `input_type` at the current session time.
    ///
    /// Returns `None` when the engine is not accepting input.
    pub fn handle_input(&mut self, lane: Lane, input_type: InputType) -> Option<NoteResult> {
        if !matches!(self.state, EngineState::Loading | EngineState::Running) {
            debug!("Input ignored while {:?}", self.state);
            return None;
        }
        let now = self.sample_time();
        let window = self.config.hit_window_ms;

        // Closest unresolved note in the lane; ties keep the earlier note.
        let candidate = self
            .notes
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.is_resolved() && n.lane == lane)
            .map(|(i, n)| (i, now - n.scheduled_time_ms))
            .filter(|(_, offset)| offset.abs() <= window)
            .fold(None, |best: Option<(usize, f64)>, (i, offset)| match best {
                Some((_, b)) if b.abs() <= offset.abs() => best,
                _ => Some((i, offset)),
            });

        let Some((index, offset)) = candidate else {
            debug!("Whiff in {lane:?} lane at {now:.1}ms");
            return Some(self.resolve_with(Judgment::whiff(), None));
        };

        let note = &mut self.notes[index];
        note.resolve();
        let judgment = self.judge.judge(offset, note.input_type == input_type);
        debug!(
            "{:?} on {} ({offset:+.1}ms, {} pts)",
            judgment.kind, note.id, judgment.score
        );
        let note = note.clone();
        Some(self.resolve_with(judgment, Some(note)))
    }

    pub fn handle_action(&mut self, action: InputAction) -> Option<NoteResult> {
        let (lane, input_type) = action.resolve();
        self.handle_input(lane, input_type)
    }

    pub fn pause(&mut self) {
        if !matches!(self.state, EngineState::Loading | EngineState::Running) {
            return;
        }
        self.resume_to = self.state;
        self.state = EngineState::Paused;
        self.clock.pause(self.time.now_us());
        if self.track_started {
            let result = self.audio.borrow_mut().pause();
            if let Err(e) = result {
                warn!("Failed to pause track: {e}");
            }
        }
    }

    pub fn resume(&mut self) {
        if self.state != EngineState::Paused {
            return;
        }
        self.state = self.resume_to;
        self.clock.resume(self.time.now_us());
        if self.track_pending {
            self.play_track();
        } else if self.track_started {
            let result = self.audio.borrow_mut().resume();
            if let Err(e) = result {
                warn!("Failed to resume track: {e}");
            }
        }
    }

    /// End the session without firing the end hook. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if self.state == EngineState::Ended {
            return;
        }
        info!("Session stopped");
        self.halt();
    }

    /// Set the master volume, clamped to 0.0..=1.0. Non-finite values are ignored.
    pub fn set_volume(&mut self, volume: f32) {
        if !volume.is_finite() {
            warn!("Ignoring non-finite volume {volume}");
            return;
        }
        self.volume = volume.clamp(0.0, 1.0);
        let result = self.audio.borrow_mut().set_master_volume(self.volume);
        if let Err(e) = result {
            warn!("Failed to set volume: {e}");
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn current_time_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn song_id(&self) -> Option<&str> {
        self.song_id.as_deref()
    }

    /// The chart in play, once loaded.
    pub fn chart(&self) -> Option<&LoadedChart> {
        self.chart.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Every note of the session, resolved or not.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Unresolved notes within the surface bounds.
    pub fn active_notes(&self) -> Vec<&Note> {
        let height = self.surface.height();
        let margin = self.config.visible_margin_px;
        self.notes
            .iter()
            .filter(|n| is_visible(n, height, margin))
            .collect()
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    pub fn stats(&self) -> SessionStats {
        self.scoreboard.snapshot(self.notes.len())
    }

    pub fn accuracy(&self) -> f64 {
        self.scoreboard.accuracy(self.notes.len())
    }

    pub fn health(&self) -> f64 {
        self.scoreboard.health()
    }
}

fn is_visible(note: &Note, height: f64, margin: f64) -> bool {
    !note.is_resolved() && note.position_px > -margin && note.position_px < height + margin
}
