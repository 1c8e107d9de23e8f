use serde::Serialize;

use crate::judge::{Judgment, JudgmentKind, TimingDirection};

pub const MAX_HEALTH: f64 = 100.0;

/// Running judgment counters of one session.
///
/// Counters only ever grow. `missed` includes whiffs, which are also
/// counted separately so resolved notes can be told apart.
#[derive(Debug, Clone, PartialEq)]
pub struct Scoreboard {
    pub perfect: u32,
    pub great: u32,
    pub good: u32,
    pub missed: u32,
    pub whiffs: u32,
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    pub fast: u32,
    pub slow: u32,
    health: f64,
}

impl Default for Scoreboard {
    fn default() -> Self {
        Self {
            perfect: 0,
            great: 0,
            good: 0,
            missed: 0,
            whiffs: 0,
            score: 0,
            combo: 0,
            max_combo: 0,
            fast: 0,
            slow: 0,
            health: MAX_HEALTH,
        }
    }
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a judgment that resolved a note.
    pub fn record_note(&mut self, judgment: &Judgment) {
        self.count(judgment.kind);
        self.score += u64::from(judgment.score);

        if matches!(judgment.kind, JudgmentKind::Great | JudgmentKind::Good) {
            match judgment.timing() {
                Some(TimingDirection::Fast) => self.fast += 1,
                Some(TimingDirection::Slow) => self.slow += 1,
                _ => {}
            }
        }
    }

    /// Record a press that found no note.
    pub fn record_whiff(&mut self) {
        self.count(JudgmentKind::Miss);
        self.whiffs += 1;
    }

    fn count(&mut self, kind: JudgmentKind) {
        match kind {
            JudgmentKind::Perfect => self.perfect += 1,
            JudgmentKind::Great => self.great += 1,
            JudgmentKind::Good => self.good += 1,
            JudgmentKind::Miss => self.missed += 1,
        }

        if kind.is_hit() {
            self.combo += 1;
            self.max_combo = self.max_combo.max(self.combo);
        } else {
            self.combo = 0;
        }
        self.apply_health(kind);
    }

    // Judgments do not affect health yet.
    fn apply_health(&mut self, _kind: JudgmentKind) {}

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn judged(&self) -> u32 {
        self.perfect + self.great + self.good + self.missed
    }

    /// Notes resolved so far (every judgment except whiffs).
    pub fn resolved_notes(&self) -> u32 {
        self.judged() - self.whiffs
    }

    /// Weighted hit percentage against the chart's note count.
    pub fn accuracy(&self, chart_notes: usize) -> f64 {
        if chart_notes == 0 {
            return 100.0;
        }
        let weighted = self.perfect as f64 * JudgmentKind::Perfect.accuracy_weight()
            + self.great as f64 * JudgmentKind::Great.accuracy_weight()
            + self.good as f64 * JudgmentKind::Good.accuracy_weight();
        weighted / chart_notes as f64 * 100.0
    }

    pub fn snapshot(&self, chart_notes: usize) -> SessionStats {
        SessionStats {
            total_notes: self.judged(),
            perfect_hits: self.perfect,
            great_hits: self.great,
            good_hits: self.good,
            missed_hits: self.missed,
            accuracy: self.accuracy(chart_notes),
            score: self.score,
            max_combo: self.max_combo,
            fast: self.fast,
            slow: self.slow,
            whiffs: self.whiffs,
        }
    }
}

/// Copy of the session counters handed to collaborators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStats {
    /// Sum of the four tier counters, whiffs included.
    pub total_notes: u32,
    pub perfect_hits: u32,
    pub great_hits: u32,
    pub good_hits: u32,
    pub missed_hits: u32,
    pub accuracy: f64,
    pub score: u64,
    pub max_combo: u32,
    pub fast: u32,
    pub slow: u32,
    pub whiffs: u32,
}

impl Default for SessionStats {
    fn default() -> Self {
        Scoreboard::new().snapshot(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(kind: JudgmentKind, offset_ms: f64) -> Judgment {
        Judgment {
            kind,
            score: kind.base_score(),
            offset_ms: Some(offset_ms),
        }
    }

    #[test]
    fn empty_chart_is_perfect_accuracy() {
        assert_eq!(Scoreboard::new().accuracy(0), 100.0);
    }

    #[test]
    fn combo_resets_on_miss() {
        let mut board = Scoreboard::new();
        board.record_note(&hit(JudgmentKind::Perfect, 0.0));
        board.record_note(&hit(JudgmentKind::Great, 30.0));
        board.record_whiff();
        board.record_note(&hit(JudgmentKind::Good, -50.0));
        assert_eq!(board.combo, 1);
        assert_eq!(board.max_combo, 2);
    }

    #[test]
    fn perfect_hits_are_not_fast_or_slow() {
        let mut board = Scoreboard::new();
        board.record_note(&hit(JudgmentKind::Perfect, -15.0));
        board.record_note(&hit(JudgmentKind::Great, -30.0));
        board.record_note(&hit(JudgmentKind::Good, 55.0));
        assert_eq!((board.fast, board.slow), (1, 1));
    }

    #[test]
    fn whiffs_are_not_resolved_notes() {
        let mut board = Scoreboard::new();
        board.record_whiff();
        board.record_note(&Judgment::auto_miss(700.0));
        assert_eq!(board.missed, 2);
        assert_eq!(board.resolved_notes(), 1);
    }

    #[test]
    fn health_is_untouched() {
        let mut board = Scoreboard::new();
        board.record_whiff();
        board.record_note(&Judgment::auto_miss(700.0));
        assert_eq!(board.health(), MAX_HEALTH);
    }

    #[test]
    fn accuracy_weights() {
        let mut board = Scoreboard::new();
        board.record_note(&hit(JudgmentKind::Perfect, 0.0));
        board.record_note(&hit(JudgmentKind::Great, 30.0));
        board.record_note(&hit(JudgmentKind::Good, 50.0));
        board.record_note(&Judgment::auto_miss(700.0));
        // (1.0 + 0.9 + 0.8) / 4
        assert!((board.accuracy(4) - 67.5).abs() < 1e-9);
    }
}
