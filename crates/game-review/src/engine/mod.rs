//! Engine session abstraction.
//!
//! The evaluator adapter talks to an engine only through [`EngineSession`]:
//! it sends [`EngineCommand`]s and pulls [`EngineEvent`]s until a search
//! completes. `stockfish` drives a real UCI binary, `scripted` replays
//! canned events for tests and offline runs.

pub mod scripted;
pub mod stockfish;
pub mod uci;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ReviewError;
use crate::score::{EvaluationLine, Score};

/// How long the engine may search a single position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBudget {
    Depth(u32),
    /// Milliseconds
    MoveTime(u64),
    Nodes(u64),
}

impl SearchBudget {
    /// Arguments for the UCI `go` command.
    pub fn go_args(&self) -> String {
        match self {
            SearchBudget::Depth(d) => format!("depth {d}"),
            SearchBudget::MoveTime(ms) => format!("movetime {ms}"),
            SearchBudget::Nodes(n) => format!("nodes {n}"),
        }
    }
}

impl Default for SearchBudget {
    fn default() -> Self {
        SearchBudget::Depth(16)
    }
}

impl fmt::Display for SearchBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.go_args())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    /// Reset engine state before a new game.
    NewGame,
    /// Number of ranked lines reported per search. Takes effect before the
    /// next search starts.
    SetLineCount(u32),
    /// Search `fen`. With `restrict_to`, only that coordinate move is searched.
    Search {
        fen: String,
        budget: SearchBudget,
        restrict_to: Option<String>,
    },
}

/// Intermediate report for one ranked line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineUpdate {
    pub rank: u32,
    pub depth: Option<u32>,
    pub score: Score,
    pub pv: Vec<String>,
}

impl LineUpdate {
    pub fn into_line(self) -> EvaluationLine {
        EvaluationLine {
            rank: self.rank,
            score: self.score,
            pv: self.pv,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Line(LineUpdate),
    /// Terminal event of a search. `best_move` is `None` when the position
    /// has no legal moves.
    SearchComplete { best_move: Option<String> },
}

/// A running engine. Implementations serve one search at a time.
#[async_trait]
pub trait EngineSession: Send {
    async fn send(&mut self, command: EngineCommand) -> Result<(), ReviewError>;

    /// Next event of the search in progress.
    async fn next_event(&mut self) -> Result<EngineEvent, ReviewError>;

    /// Shut the engine down. The default does nothing.
    async fn close(&mut self) {}
}
