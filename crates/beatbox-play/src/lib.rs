pub mod clock;
pub mod config;
pub mod engine;
pub mod input;
pub mod judge;
pub mod load_task;
pub mod note;
pub mod score;
pub mod traits;

pub use clock::SessionClock;
pub use config::EngineConfig;
pub use engine::{EngineState, GameEngine, NoteResult};
pub use input::InputAction;
pub use judge::{Judge, JudgeWindows, Judgment, JudgmentKind, TimingDirection};
pub use load_task::{ChartLoadTask, LoadStage};
pub use note::{InputType, Lane, Note, NoteId, notes_from_chart};
pub use score::{Scoreboard, SessionStats};
pub use traits::{AudioOutput, SharedAudio, Surface, TimeProvider};
