/// Session time derived from a monotonic microsecond source.
///
/// Elapsed time excludes every paused interval and stands still while paused.
#[derive(Debug, Clone, Default)]
pub struct SessionClock {
    start_us: Option<i64>,
    paused_at_us: Option<i64>,
    paused_total_us: i64,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, now_us: i64) {
        self.start_us = Some(now_us);
        self.paused_at_us = None;
        self.paused_total_us = 0;
    }

    pub fn is_started(&self) -> bool {
        self.start_us.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at_us.is_some()
    }

    pub fn pause(&mut self, now_us: i64) {
        if self.is_started() && self.paused_at_us.is_none() {
            self.paused_at_us = Some(now_us);
        }
    }

    pub fn resume(&mut self, now_us: i64) {
        if let Some(paused_at) = self.paused_at_us.take() {
            self.paused_total_us += (now_us - paused_at).max(0);
        }
    }

    pub fn elapsed_us(&self, now_us: i64) -> i64 {
        let Some(start) = self.start_us else {
            return 0;
        };
        let effective_now = self.paused_at_us.unwrap_or(now_us);
        (effective_now - start - self.paused_total_us).max(0)
    }

    pub fn elapsed_ms(&self, now_us: i64) -> f64 {
        self.elapsed_us(now_us) as f64 / 1000.0
    }
}
