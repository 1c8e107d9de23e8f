use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Timing direction for FAST/SLOW display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingDirection {
    Fast,
    Exact,
    Slow,
}

impl TimingDirection {
    const EXACT_THRESHOLD_MS: f64 = 1.0;

    /// `offset_ms` is input time minus scheduled time.
    pub fn from_offset(offset_ms: f64) -> Self {
        if offset_ms < -Self::EXACT_THRESHOLD_MS {
            TimingDirection::Fast
        } else if offset_ms > Self::EXACT_THRESHOLD_MS {
            TimingDirection::Slow
        } else {
            TimingDirection::Exact
        }
    }
}

/// Judgment tiers, strictest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JudgmentKind {
    Perfect,
    Great,
    Good,
    Miss,
}

impl JudgmentKind {
    pub fn base_score(self) -> u32 {
        match self {
            Self::Perfect => 100,
            Self::Great => 70,
            Self::Good => 40,
            Self::Miss => 0,
        }
    }

    /// Weight of this tier in the accuracy formula.
    pub fn accuracy_weight(self) -> f64 {
        match self {
            Self::Perfect => 1.0,
            Self::Great => 0.9,
            Self::Good => 0.8,
            Self::Miss => 0.0,
        }
    }

    pub fn is_hit(self) -> bool {
        self != Self::Miss
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Judgment {
    pub kind: JudgmentKind,
    pub score: u32,
    /// Signed timing error of the judged note; `None` for whiffs.
    pub offset_ms: Option<f64>,
}

impl Judgment {
    pub fn whiff() -> Self {
        Self {
            kind: JudgmentKind::Miss,
            score: 0,
            offset_ms: None,
        }
    }

    pub fn auto_miss(offset_ms: f64) -> Self {
        Self {
            kind: JudgmentKind::Miss,
            score: 0,
            offset_ms: Some(offset_ms),
        }
    }

    pub fn timing(&self) -> Option<TimingDirection> {
        self.offset_ms.map(TimingDirection::from_offset)
    }
}

/// Upper bounds (inclusive) of each hit tier in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeWindows {
    pub perfect_ms: f64,
    pub great_ms: f64,
    pub good_ms: f64,
}

impl Default for JudgeWindows {
    fn default() -> Self {
        Self {
            perfect_ms: 20.0,
            great_ms: 40.0,
            good_ms: 60.0,
        }
    }
}

impl JudgeWindows {
    pub fn validate(&self) -> Result<()> {
        if !(0.0 <= self.perfect_ms && self.perfect_ms <= self.great_ms && self.great_ms <= self.good_ms) {
            anyhow::bail!(
                "judge windows must be nested, got {}/{}/{}",
                self.perfect_ms,
                self.great_ms,
                self.good_ms
            );
        }
        Ok(())
    }
}

const TYPE_MATCH_MODIFIER: f64 = 1.5;
const TYPE_MISMATCH_MODIFIER: f64 = 0.8;

#[derive(Debug, Clone, Default)]
pub struct Judge {
    windows: JudgeWindows,
}

impl Judge {
    pub fn new(windows: JudgeWindows) -> Self {
        Self { windows }
    }

    pub fn windows(&self) -> &JudgeWindows {
        &self.windows
    }

    pub fn classify(&self, delta_ms: f64) -> JudgmentKind {
        let delta = delta_ms.abs();
        if delta <= self.windows.perfect_ms {
            JudgmentKind::Perfect
        } else if delta <= self.windows.great_ms {
            JudgmentKind::Great
        } else if delta <= self.windows.good_ms {
            JudgmentKind::Good
        } else {
            JudgmentKind::Miss
        }
    }

    pub fn score_for(kind: JudgmentKind, type_matches: bool) -> u32 {
        if kind == JudgmentKind::Miss {
            return 0;
        }
        let modifier = if type_matches {
            TYPE_MATCH_MODIFIER
        } else {
            TYPE_MISMATCH_MODIFIER
        };
        (kind.base_score() as f64 * modifier).floor() as u32
    }

    /// Judge a press against a note `offset_ms` away from its scheduled time.
    pub fn judge(&self, offset_ms: f64, type_matches: bool) -> Judgment {
        let kind = self.classify(offset_ms);
        Judgment {
            kind,
            score: Self::score_for(kind, type_matches),
            offset_ms: Some(offset_ms),
        }
    }
}
