//! Per-ply analysis record.

use std::collections::BTreeMap;

use chess_core::Side;
use serde::{Deserialize, Serialize};

use crate::classify::MoveTag;
use crate::score::EvaluationLine;

/// Result of analyzing one ply. Scores are clamped centipawns from the
/// mover's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlyRecord {
    /// 1-based
    pub ply_index: usize,
    pub side_to_move: Side,
    /// Move as written in the game text
    pub move_text: String,
    /// Canonical SAN of the move
    pub san: String,
    /// Coordinate notation of the move
    pub uci: String,
    pub pre_score: i32,
    pub post_score: i32,
    pub loss: i32,
    pub tag: MoveTag,
    /// Ranked lines of the position before the move
    pub candidate_lines: BTreeMap<u32, EvaluationLine>,
}

impl PlyRecord {
    pub fn best_line(&self) -> Option<&EvaluationLine> {
        self.candidate_lines.get(&1)
    }

    pub fn line(&self, rank: u32) -> Option<&EvaluationLine> {
        self.candidate_lines.get(&rank)
    }

    /// True when the played move is the engine's first choice.
    pub fn played_best(&self) -> bool {
        self.best_line()
            .and_then(EvaluationLine::best_move)
            .is_some_and(|m| m == self.uci)
    }
}
