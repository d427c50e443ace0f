//! Engine scores and ranked candidate lines.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Bound applied to centipawn scores; mate scores collapse onto it.
pub const SCORE_CAP: i32 = 1000;

/// Engine score from the side to move's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Score {
    #[serde(rename = "cp")]
    Centipawns(i32),
    /// Mate in N; negative when the side to move is getting mated.
    Mate(i32),
}

impl Score {
    /// Centipawns clamped to ±1000. Mate in any number of moves becomes ±1000
    /// with the mating side's sign.
    pub fn clamped_cp(self) -> i32 {
        match self {
            Score::Centipawns(cp) => cp.clamp(-SCORE_CAP, SCORE_CAP),
            Score::Mate(m) if m > 0 => SCORE_CAP,
            Score::Mate(_) => -SCORE_CAP,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Centipawns(cp) => write!(f, "{:+.2}", *cp as f64 / 100.0),
            Score::Mate(m) => write!(f, "mate {m}"),
        }
    }
}

/// One ranked engine line for a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationLine {
    /// 1-based, engine preference order
    pub rank: u32,
    pub score: Score,
    /// Principal variation in coordinate notation
    pub pv: Vec<String>,
}

impl EvaluationLine {
    pub fn best_move(&self) -> Option<&str> {
        self.pv.first().map(String::as_str)
    }
}
