//! Kira-based backing track player for play sessions.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use beatbox_play::AudioOutput;
use kira::sound::PlaybackState;
use kira::sound::static_sound::{StaticSoundData, StaticSoundHandle};
use kira::{AudioManager, AudioManagerSettings, Decibels, DefaultBackend, Tween};
use log::{debug, info};

/// Track file names tried inside a song folder, in priority order.
pub const TRACK_CANDIDATES: [&str; 3] = ["song.ogg", "song.mp3", "song.wav"];

/// Locate the backing track of `song_id` under `songs_root`.
pub fn resolve_track(songs_root: &Path, song_id: &str) -> Option<PathBuf> {
    let dir = songs_root.join(song_id);
    TRACK_CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

fn amplitude_to_decibels(volume: f32) -> Decibels {
    if volume <= 0.0 {
        Decibels::SILENCE
    } else {
        Decibels(20.0 * volume.log10())
    }
}

/// Plays one backing track at a time through a single kira manager.
pub struct KiraOutput {
    manager: AudioManager<DefaultBackend>,
    songs_root: PathBuf,
    track: Option<StaticSoundHandle>,
    volume: f32,
}

impl KiraOutput {
    pub fn new(songs_root: impl Into<PathBuf>) -> Result<Self> {
        let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
            .map_err(|e| anyhow!("Failed to create audio manager: {e}"))?;
        Ok(Self {
            manager,
            songs_root: songs_root.into(),
            track: None,
            volume: 1.0,
        })
    }

    pub fn songs_root(&self) -> &Path {
        &self.songs_root
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Whether a track was started and not stopped since.
    pub fn has_track(&self) -> bool {
        self.track.is_some()
    }
}

impl AudioOutput for KiraOutput {
    fn play_track(&mut self, song_id: &str) -> Result<()> {
        if let Some(mut previous) = self.track.take() {
            previous.stop(Tween::default());
        }

        let path = resolve_track(&self.songs_root, song_id).ok_or_else(|| {
            anyhow!(
                "No backing track for {song_id} in {}",
                self.songs_root.display()
            )
        })?;
        let data = StaticSoundData::from_file(&path)
            .map_err(|e| anyhow!("Failed to load track {}: {e}", path.display()))?;
        let handle = self
            .manager
            .play(data)
            .map_err(|e| anyhow!("Failed to play track {}: {e}", path.display()))?;

        info!("Playing {}", path.display());
        self.track = Some(handle);
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        if let Some(handle) = self.track.as_mut() {
            handle.pause(Tween::default());
        }
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        if let Some(handle) = self.track.as_mut() {
            handle.resume(Tween::default());
        }
        Ok(())
    }

    /// Halts the track. The next `play_track` starts from the beginning.
    fn stop(&mut self) -> Result<()> {
        if let Some(mut handle) = self.track.take() {
            handle.stop(Tween::default());
            debug!("Track stopped");
        }
        Ok(())
    }

    fn set_master_volume(&mut self, volume: f32) -> Result<()> {
        self.volume = volume.clamp(0.0, 1.0);
        self.manager
            .main_track()
            .set_volume(amplitude_to_decibels(self.volume), Tween::default());
        Ok(())
    }

    fn track_finished(&self) -> bool {
        self.track
            .as_ref()
            .is_some_and(|handle| handle.state() == PlaybackState::Stopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_first_existing_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let song = dir.path().join("neon");
        std::fs::create_dir_all(&song).unwrap();
        std::fs::write(song.join("song.wav"), b"").unwrap();
        std::fs::write(song.join("song.mp3"), b"").unwrap();

        assert_eq!(resolve_track(dir.path(), "neon"), Some(song.join("song.mp3")));
        assert_eq!(resolve_track(dir.path(), "missing"), None);
    }

    #[test]
    fn volume_mapping() {
        assert_eq!(amplitude_to_decibels(0.0), Decibels::SILENCE);
        assert!((amplitude_to_decibels(1.0).0).abs() < 1e-6);
        assert!((amplitude_to_decibels(0.5).0 + 6.0206).abs() < 1e-3);
    }
}
