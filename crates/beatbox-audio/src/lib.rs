mod kira_output;

pub use kira_output::{KiraOutput, TRACK_CANDIDATES, resolve_track};
