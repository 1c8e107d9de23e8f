pub const DEFAULT_BPM: f64 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct TempoPoint {
    tick: u64,
    bpm: f64,
    /// Milliseconds from tick 0 to this point, offset excluded.
    ms_at: f64,
}

/// Tick to millisecond conversion built from `[SyncTrack]` tempo events.
#[derive(Debug, Clone)]
pub struct TempoMap {
    resolution: u32,
    offset_ms: f64,
    points: Vec<TempoPoint>,
}

impl TempoMap {
    /// Build a tempo map from `(tick, bpm)` changes.
    ///
    /// Changes are sorted by tick; when several share a tick the last one wins.
    /// A missing tempo at tick 0 defaults to [`DEFAULT_BPM`].
    pub fn new(resolution: u32, offset_s: f64, mut changes: Vec<(u64, f64)>) -> Self {
        let resolution = resolution.max(1);
        changes.sort_by_key(|(tick, _)| *tick);

        let mut points: Vec<TempoPoint> = Vec::with_capacity(changes.len() + 1);
        if changes.first().is_none_or(|(tick, _)| *tick != 0) {
            points.push(TempoPoint {
                tick: 0,
                bpm: DEFAULT_BPM,
                ms_at: 0.0,
            });
        }

        for (tick, bpm) in changes {
            match points.last_mut() {
                Some(last) if last.tick == tick => last.bpm = bpm,
                Some(last) => {
                    let ms_at = last.ms_at + ticks_to_ms(tick - last.tick, resolution, last.bpm);
                    points.push(TempoPoint { tick, bpm, ms_at });
                }
                None => points.push(TempoPoint {
                    tick,
                    bpm,
                    ms_at: 0.0,
                }),
            }
        }

        Self {
            resolution,
            offset_ms: offset_s * 1000.0,
            points,
        }
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Absolute time of `tick` in milliseconds, offset included.
    pub fn tick_to_ms(&self, tick: u64) -> f64 {
        let point = self.point_at(tick);
        self.offset_ms + point.ms_at + ticks_to_ms(tick - point.tick, self.resolution, point.bpm)
    }

    pub fn bpm_at(&self, tick: u64) -> f64 {
        self.point_at(tick).bpm
    }

    fn point_at(&self, tick: u64) -> &TempoPoint {
        // points[0].tick is always 0, so idx >= 1
        let idx = self.points.partition_point(|p| p.tick <= tick);
        &self.points[idx.saturating_sub(1)]
    }
}

fn ticks_to_ms(ticks: u64, resolution: u32, bpm: f64) -> f64 {
    let beats = ticks as f64 / resolution as f64;
    beats * (60_000.0 / bpm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_tempo() {
        let map = TempoMap::new(192, 0.0, vec![(0, 120.0)]);
        // One beat at 120 BPM is 500ms
        assert!((map.tick_to_ms(192) - 500.0).abs() < 1e-9);
        assert!((map.tick_to_ms(768) - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn missing_initial_tempo_defaults() {
        let map = TempoMap::new(192, 0.0, vec![]);
        assert!((map.bpm_at(0) - DEFAULT_BPM).abs() < 1e-9);
        assert!((map.tick_to_ms(192) - 500.0).abs() < 1e-9);
    }

    #[test]
    fn tempo_change_mid_chart() {
        let map = TempoMap::new(192, 0.0, vec![(384, 240.0), (0, 120.0)]);
        // Two beats at 120 BPM, then one beat at 240 BPM
        assert!((map.tick_to_ms(384) - 1000.0).abs() < 1e-9);
        assert!((map.tick_to_ms(576) - 1250.0).abs() < 1e-9);
        assert!((map.bpm_at(500) - 240.0).abs() < 1e-9);
    }

    #[test]
    fn offset_shifts_every_tick() {
        let map = TempoMap::new(192, 0.25, vec![(0, 120.0)]);
        assert!((map.tick_to_ms(0) - 250.0).abs() < 1e-9);
        assert!((map.tick_to_ms(192) - 750.0).abs() < 1e-9);
    }

    #[test]
    fn duplicate_tick_last_wins() {
        let map = TempoMap::new(192, 0.0, vec![(0, 100.0), (0, 60.0)]);
        assert!((map.tick_to_ms(192) - 1000.0).abs() < 1e-9);
    }
}
