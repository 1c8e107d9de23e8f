use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use beatbox_audio::KiraOutput;
use beatbox_chart::{Difficulty, LoadedChart};
use beatbox_play::traits::{Frame, MockAudio, MockTimeProvider, SystemTimeProvider};
use beatbox_play::{
    EngineConfig, EngineState, GameEngine, InputType, Lane, SessionStats, Surface, notes_from_chart,
};
use clap::Args;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::settings::Settings;

/// Time the session keeps running after the last note has auto-resolved.
const TAIL_MS: f64 = 1000.0;

#[derive(Args, Debug)]
pub struct SimulateArgs {
    pub song_id: String,

    #[arg(short, long)]
    pub difficulty: Option<Difficulty>,

    /// Maximum random timing error of each press, in milliseconds.
    #[arg(long, default_value_t = 0.0)]
    pub jitter_ms: f64,

    /// Seed for the press jitter.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Simulated frame length in milliseconds.
    #[arg(long, default_value_t = 16.0)]
    pub frame_ms: f64,

    /// Play the backing track and run in real time.
    #[arg(long)]
    pub audio: bool,

    /// Engine config JSON file overriding the saved settings.
    #[arg(long)]
    pub engine_config: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub song_id: String,
    pub difficulty: Difficulty,
    pub notes: usize,
    pub frames: u64,
    pub duration_ms: f64,
    pub stats: SessionStats,
}

/// One planned autoplay press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Press {
    pub at_ms: f64,
    pub lane: Lane,
    pub input_type: InputType,
}

/// A press for every note, each off by up to `jitter_ms` either way.
pub fn plan_presses<R: Rng>(chart: &LoadedChart, jitter_ms: f64, rng: &mut R) -> Vec<Press> {
    let mut presses: Vec<Press> = notes_from_chart(chart)
        .into_iter()
        .map(|note| {
            let jitter = if jitter_ms > 0.0 {
                rng.gen_range(-jitter_ms..=jitter_ms)
            } else {
                0.0
            };
            Press {
                at_ms: (note.scheduled_time_ms + jitter).max(0.0),
                lane: note.lane,
                input_type: note.input_type,
            }
        })
        .collect();
    presses.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));
    presses
}

/// Session time by which every note has auto-resolved, plus a short tail.
fn session_length_ms(chart: &LoadedChart, config: &EngineConfig) -> f64 {
    let last = chart.moves.last().map_or(0.0, |m| m.ms);
    last + config.miss_after_ms() + TAIL_MS
}

/// Surface that only counts frames.
struct HeadlessSurface {
    height: f64,
    frames: Rc<Cell<u64>>,
}

impl Surface for HeadlessSurface {
    fn height(&self) -> f64 {
        self.height
    }

    fn present(&mut self, frame: &Frame<'_>) -> Result<()> {
        self.frames.set(self.frames.get() + 1);
        if !frame.notes.is_empty() {
            log::trace!("{:.0}ms: {} notes on screen", frame.time_ms, frame.notes.len());
        }
        Ok(())
    }
}

pub fn run(settings: &Settings, args: &SimulateArgs) -> Result<()> {
    let mut config = match &args.engine_config {
        Some(path) => EngineConfig::load(path)?,
        None => settings.engine_config(),
    };
    if let Some(difficulty) = args.difficulty {
        config.difficulty = difficulty;
    }
    config.validate()?;
    if !(args.frame_ms > 0.0) {
        anyhow::bail!("--frame-ms must be positive");
    }

    let loader = super::chart_loader(settings)?;
    let chart = loader.load(&args.song_id, config.difficulty);
    if chart.is_empty() {
        warn!("{} has no playable notes", args.song_id);
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let presses = plan_presses(&chart, args.jitter_ms, &mut rng);

    let report = if args.audio {
        let audio = Rc::new(RefCell::new(KiraOutput::new(&settings.songs_root)?));
        simulate_realtime(&args.song_id, chart, config, presses, args.frame_ms, settings.volume, audio)
    } else {
        simulate_headless(&args.song_id, chart, config, presses, args.frame_ms)
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn ms_to_us(ms: f64) -> i64 {
    (ms * 1000.0).round() as i64
}

/// Run a whole session against a mock clock, as fast as possible.
pub fn simulate_headless(
    song_id: &str,
    chart: LoadedChart,
    config: EngineConfig,
    presses: Vec<Press>,
    frame_ms: f64,
) -> SimulationReport {
    let time = MockTimeProvider::new();
    let audio = Rc::new(RefCell::new(MockAudio::new()));
    let frames = Rc::new(Cell::new(0));
    let length_ms = session_length_ms(&chart, &config);
    let difficulty = chart.difficulty;
    let notes = chart.note_count();

    let mut engine = GameEngine::new(
        config,
        Box::new(HeadlessSurface {
            height: 600.0,
            frames: frames.clone(),
        }),
        audio.clone(),
        Box::new(time.clone()),
    );
    let ended = Rc::new(RefCell::new(None));
    let sink = ended.clone();
    engine.on_session_end(move |stats: &SessionStats| *sink.borrow_mut() = Some(stats.clone()));

    engine.start_preloaded(Some(song_id), chart);
    engine.tick();

    let mut pending = presses.into_iter().peekable();
    let mut now = 0.0;
    while engine.state() != EngineState::Ended {
        let previous = now;
        now += frame_ms;
        while let Some(press) = pending.next_if(|p| p.at_ms <= now) {
            time.set_time(ms_to_us(press.at_ms.max(previous)));
            engine.handle_input(press.lane, press.input_type);
        }
        time.set_time(ms_to_us(now));
        if now >= length_ms {
            audio.borrow_mut().finish_track();
        }
        engine.tick();
    }

    let stats = ended.borrow_mut().take().unwrap_or_else(|| engine.stats());
    SimulationReport {
        song_id: song_id.to_string(),
        difficulty,
        notes,
        frames: frames.get(),
        duration_ms: engine.current_time_ms(),
        stats,
    }
}

/// Run a session on the wall clock with the backing track audible.
fn simulate_realtime(
    song_id: &str,
    chart: LoadedChart,
    config: EngineConfig,
    presses: Vec<Press>,
    frame_ms: f64,
    volume: f32,
    audio: Rc<RefCell<KiraOutput>>,
) -> SimulationReport {
    let frames = Rc::new(Cell::new(0));
    let length_ms = session_length_ms(&chart, &config);
    let difficulty = chart.difficulty;
    let notes = chart.note_count();

    let mut engine = GameEngine::new(
        config,
        Box::new(HeadlessSurface {
            height: 600.0,
            frames: frames.clone(),
        }),
        audio.clone(),
        Box::new(SystemTimeProvider::new()),
    );
    let ended = Rc::new(RefCell::new(None));
    let sink = ended.clone();
    engine.on_session_end(move |stats: &SessionStats| *sink.borrow_mut() = Some(stats.clone()));

    engine.set_volume(volume);
    engine.start_preloaded(Some(song_id), chart);
    info!("Simulating {song_id} in real time");

    let mut pending = presses.into_iter().peekable();
    while engine.state() != EngineState::Ended {
        std::thread::sleep(Duration::from_secs_f64(frame_ms / 1000.0));
        engine.tick();
        let now = engine.current_time_ms();
        while let Some(press) = pending.next_if(|p| p.at_ms <= now) {
            engine.handle_input(press.lane, press.input_type);
        }

        // Without a playing track nothing else ends the session.
        if now >= length_ms && !audio.borrow().has_track() {
            debug!("No backing track playing, stopping at {now:.0}ms");
            engine.stop();
        }
    }

    let stats = ended.borrow_mut().take().unwrap_or_else(|| engine.stats());
    SimulationReport {
        song_id: song_id.to_string(),
        difficulty,
        notes,
        frames: frames.get(),
        duration_ms: engine.current_time_ms(),
        stats,
    }
}
