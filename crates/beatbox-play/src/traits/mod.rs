pub mod audio;
pub mod surface;
pub mod time;

pub use audio::{AudioOutput, MockAudio, SharedAudio, shared};
pub use surface::{Frame, FrameRecorder, Surface};
pub use time::{MockTimeProvider, SystemTimeProvider, TimeProvider};
