use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;

/// Abstraction over the backing-track player.
/// Implementations: KiraOutput (beatbox-audio), MockAudio (testing).
pub trait AudioOutput {
    /// Start the backing track of `song_id` from the beginning.
    fn play_track(&mut self, song_id: &str) -> Result<()>;
    fn pause(&mut self) -> Result<()>;
    fn resume(&mut self) -> Result<()>;
    /// Halt the track and rewind it to the start.
    fn stop(&mut self) -> Result<()>;

    /// Set master volume (0.0..=1.0).
    fn set_master_volume(&mut self, volume: f32) -> Result<()>;

    /// Whether a started track has played through to its end.
    fn track_finished(&self) -> bool;
}

/// Audio output shared between the engine and other consumers on the same thread.
pub type SharedAudio = Rc<RefCell<dyn AudioOutput>>;

pub fn shared<A: AudioOutput + 'static>(output: A) -> SharedAudio {
    Rc::new(RefCell::new(output))
}

/// Recording audio output with a manually completed track.
#[derive(Debug, Default)]
pub struct MockAudio {
    pub played: Vec<String>,
    pub pauses: u32,
    pub resumes: u32,
    pub stops: u32,
    pub volume: Option<f32>,
    playing: bool,
    finished: bool,
    reject_next_play: bool,
}

impl MockAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `play_track` fail, as a browser autoplay policy would.
    pub fn reject_next_play(&mut self) {
        self.reject_next_play = true;
    }

    /// Mark the current track as played through.
    pub fn finish_track(&mut self) {
        if self.playing {
            self.playing = false;
            self.finished = true;
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

impl AudioOutput for MockAudio {
    fn play_track(&mut self, song_id: &str) -> Result<()> {
        if std::mem::take(&mut self.reject_next_play) {
            anyhow::bail!("playback of {song_id} rejected");
        }
        self.played.push(song_id.to_string());
        self.playing = true;
        self.finished = false;
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.pauses += 1;
        self.playing = false;
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        self.resumes += 1;
        if !self.played.is_empty() && !self.finished {
            self.playing = true;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.stops += 1;
        self.playing = false;
        Ok(())
    }

    fn set_master_volume(&mut self, volume: f32) -> Result<()> {
        self.volume = Some(volume);
        Ok(())
    }

    fn track_finished(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_requires_a_playing_track() {
        let mut audio = MockAudio::new();
        audio.finish_track();
        assert!(!audio.track_finished());

        audio.play_track("neon").unwrap();
        audio.finish_track();
        assert!(audio.track_finished());
    }

    #[test]
    fn rejected_play_is_one_shot() {
        let mut audio = MockAudio::new();
        audio.reject_next_play();
        assert!(audio.play_track("neon").is_err());
        assert!(audio.play_track("neon").is_ok());
        assert_eq!(audio.played, vec!["neon"]);
    }

    #[test]
    fn shared_handle_coerces() {
        let audio = Rc::new(RefCell::new(MockAudio::new()));
        let handle: SharedAudio = audio.clone();
        handle.borrow_mut().set_master_volume(0.5).unwrap();
        assert_eq!(audio.borrow().volume, Some(0.5));
    }
}
