use std::sync::{Arc, Mutex, MutexGuard};

use beatbox_chart::{ChartLoader, Difficulty, LoadedChart};
use log::debug;

/// Stage of the background chart load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStage {
    #[default]
    NotStarted,
    Fetching,
    Complete,
}

/// State shared between the frame loop and the worker thread.
#[derive(Default)]
struct LoadTaskState {
    stage: LoadStage,
    result: Option<LoadedChart>,
}

/// Chart load running on a worker thread, polled by the frame loop.
pub struct ChartLoadTask {
    state: Arc<Mutex<LoadTaskState>>,
}

impl ChartLoadTask {
    /// Start loading `song_id` on a new thread.
    pub fn spawn(loader: ChartLoader, song_id: &str, difficulty: Difficulty) -> Self {
        let state = Arc::new(Mutex::new(LoadTaskState {
            stage: LoadStage::Fetching,
            result: None,
        }));

        let state_clone = state.clone();
        let song_id = song_id.to_string();

        std::thread::spawn(move || {
            debug!("Loading chart for {song_id} ({difficulty})");
            // Failures are already folded into an empty chart by the loader.
            let chart = loader.load(&song_id, difficulty);
            let mut s = lock(&state_clone);
            s.stage = LoadStage::Complete;
            s.result = Some(chart);
        });

        Self { state }
    }

    /// A task that is already complete with `chart`.
    pub fn ready(chart: LoadedChart) -> Self {
        Self {
            state: Arc::new(Mutex::new(LoadTaskState {
                stage: LoadStage::Complete,
                result: Some(chart),
            })),
        }
    }

    pub fn stage(&self) -> LoadStage {
        lock(&self.state).stage
    }

    pub fn is_complete(&self) -> bool {
        self.stage() == LoadStage::Complete
    }

    /// Take the loaded chart.
    /// Returns None if loading is not complete or the chart was already taken.
    pub fn take_result(&self) -> Option<LoadedChart> {
        lock(&self.state).result.take()
    }
}

// A panicking loader leaves the slot usable; the chart is simply never delivered.
fn lock(state: &Mutex<LoadTaskState>) -> MutexGuard<'_, LoadTaskState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use beatbox_chart::{ChartError, ChartSource};

    use super::*;

    struct StaticSource(&'static str);

    impl ChartSource for StaticSource {
        fn fetch(&self, _song_id: &str, _file_name: &str) -> Result<String, ChartError> {
            Ok(self.0.to_string())
        }
    }

    fn wait_for(task: &ChartLoadTask) -> LoadedChart {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(chart) = task.take_result() {
                return chart;
            }
            assert!(Instant::now() < deadline, "chart load timed out");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn spawned_task_delivers_chart_once() {
        let source = StaticSource(
            "[Song]\n{\n}\n[SyncTrack]\n{\n  0 = B 120000\n}\n[ExpertSingle]\n{\n  192 = N 0 0\n}\n",
        );
        let task = ChartLoadTask::spawn(ChartLoader::from_source(source), "neon", Difficulty::Expert);
        let chart = wait_for(&task);
        assert_eq!(chart.note_count(), 1);
        assert!(task.is_complete());
        assert!(task.take_result().is_none());
    }

    #[test]
    fn failed_load_delivers_empty_chart() {
        let task = ChartLoadTask::spawn(
            ChartLoader::from_source(StaticSource("not a chart")),
            "neon",
            Difficulty::Expert,
        );
        assert!(wait_for(&task).is_empty());
    }

    #[test]
    fn ready_task_is_complete() {
        let task = ChartLoadTask::ready(LoadedChart::default());
        assert_eq!(task.stage(), LoadStage::Complete);
        assert!(task.take_result().is_some());
    }
}
