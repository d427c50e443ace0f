//! Replay view model: a cursor over ply indices and the board state derived
//! from it.
//!
//! Navigation calls clamp the cursor into `0..=N`, recompute a [`ViewState`]
//! and hand it to the attached [`Renderer`]. At ply `p` the candidate line
//! shown is the one recorded for the position before ply `p`, so the viewer
//! compares the move just played with what the engine preferred.

use chess_core::notation::pv_to_san;
use chess_core::replay::fen_of;
use chess_core::{ChessError, Replayer, Side};
use serde::Serialize;
use shakmaty::{Chess, Position};
use tracing::warn;

use crate::classify::MoveTag;
use crate::error::ReviewError;
use crate::pipeline::GameAnalysis;
use crate::record::PlyRecord;
use crate::score::{EvaluationLine, Score};
use crate::summary::Summaries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplayCursor {
    pub ply: usize,
    pub flipped: bool,
    pub selected_rank: u32,
}

impl Default for ReplayCursor {
    fn default() -> Self {
        Self {
            ply: 0,
            flipped: false,
            selected_rank: 1,
        }
    }
}

/// Origin and destination squares, e.g. "e2" and "e4".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SquarePair {
    pub from: String,
    pub to: String,
}

impl SquarePair {
    fn from_uci(uci: &str) -> Option<Self> {
        Some(Self {
            from: uci.get(0..2)?.to_string(),
            to: uci.get(2..4)?.to_string(),
        })
    }
}

/// The move that led to the displayed position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayedMove {
    pub san: String,
    pub squares: SquarePair,
    /// Present when the game was analyzed
    pub tag: Option<MoveTag>,
    pub loss: Option<i32>,
}

/// Engine suggestion for the position before the displayed ply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateView {
    pub rank: u32,
    pub score: Score,
    /// "+0.35" or "mate 3"
    pub eval_text: String,
    pub best_move: Option<String>,
    pub best_move_san: Option<String>,
    pub pv_san: Vec<String>,
    /// Squares of the suggested move
    pub highlight: Option<SquarePair>,
}

impl CandidateView {
    fn build(before: &Chess, line: &EvaluationLine) -> Self {
        let pv_san = pv_to_san(before, &line.pv);
        Self {
            rank: line.rank,
            score: line.score,
            eval_text: line.score.to_string(),
            best_move: line.best_move().map(str::to_string),
            best_move_san: pv_san.first().cloned(),
            highlight: line.best_move().and_then(SquarePair::from_uci),
            pv_san,
        }
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub ply: usize,
    pub total: usize,
    pub fen: String,
    pub side_to_move: Side,
    pub flipped: bool,
    pub selected_rank: u32,
    pub last_move: Option<PlayedMove>,
    pub candidate: Option<CandidateView>,
    pub summaries: Option<Summaries>,
}

/// Receives the recomputed state after every change.
pub trait Renderer {
    fn render(&mut self, state: &ViewState);
}

impl<F: FnMut(&ViewState)> Renderer for F {
    fn render(&mut self, state: &ViewState) {
        self(state)
    }
}

pub struct ReplayView {
    replayer: Replayer,
    records: Vec<PlyRecord>,
    summaries: Option<Summaries>,
    cursor: ReplayCursor,
    state: ViewState,
    renderer: Option<Box<dyn Renderer>>,
}

impl Default for ReplayView {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplayView {
    /// Empty board at the standard initial position.
    pub fn new() -> Self {
        let replayer = Replayer::default();
        let state = ViewState {
            ply: 0,
            total: 0,
            fen: fen_of(replayer.current()),
            side_to_move: Side::White,
            flipped: false,
            selected_rank: 1,
            last_move: None,
            candidate: None,
            summaries: None,
        };
        Self {
            replayer,
            records: Vec::new(),
            summaries: None,
            cursor: ReplayCursor::default(),
            state,
            renderer: None,
        }
    }

    pub fn from_analysis(analysis: &GameAnalysis) -> Result<Self, ReviewError> {
        let mut view = Self::new();
        view.load_analysis(analysis)?;
        Ok(view)
    }

    /// Board-only replay of raw tokens, without candidate lines.
    pub fn from_moves(start_fen: Option<&str>, tokens: &[String]) -> Result<Self, ChessError> {
        let mut view = Self::new();
        view.load_moves(start_fen, tokens)?;
        Ok(view)
    }

    pub fn set_renderer<R: Renderer + 'static>(&mut self, renderer: R) {
        self.renderer = Some(Box::new(renderer));
        self.refresh();
    }

    /// Replace the displayed game with an analysis result.
    pub fn load_analysis(&mut self, analysis: &GameAnalysis) -> Result<(), ReviewError> {
        let (replayer, rejected) =
            Replayer::replay_prefix(analysis.start_fen.as_deref(), &analysis.move_texts())?;
        if let Some(e) = rejected {
            return Err(e.into());
        }
        self.replayer = replayer;
        self.records = analysis.records.clone();
        self.summaries = Some(analysis.summaries.clone());
        self.reset();
        Ok(())
    }

    /// Replace the displayed game with a raw move list. Tokens after the
    /// first illegal one are dropped; the rejection is returned.
    pub fn load_moves(
        &mut self,
        start_fen: Option<&str>,
        tokens: &[String],
    ) -> Result<Option<ChessError>, ChessError> {
        let (replayer, rejected) = Replayer::replay_prefix(start_fen, tokens)?;
        if let Some(e) = &rejected {
            warn!(error = %e, plies = replayer.len(), "Replay stopped at illegal move");
        }
        self.replayer = replayer;
        self.records.clear();
        self.summaries = None;
        self.reset();
        Ok(rejected)
    }

    /// Number of plies (N).
    pub fn total(&self) -> usize {
        self.replayer.len()
    }

    pub fn cursor(&self) -> ReplayCursor {
        self.cursor
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn records(&self) -> &[PlyRecord] {
        &self.records
    }

    pub fn first(&mut self) -> &ViewState {
        self.move_to(0)
    }

    pub fn last(&mut self) -> &ViewState {
        self.move_to(self.total())
    }

    pub fn prev(&mut self) -> &ViewState {
        self.move_to(self.cursor.ply.saturating_sub(1))
    }

    pub fn next(&mut self) -> &ViewState {
        self.move_to((self.cursor.ply + 1).min(self.total()))
    }

    /// Jump to ply `k`, clamped into `0..=N`.
    pub fn seek(&mut self, k: i64) -> &ViewState {
        let total = i64::try_from(self.total()).unwrap_or(i64::MAX);
        self.move_to(k.clamp(0, total) as usize)
    }

    /// Choose which ranked line to display. Ranks without a line show none.
    pub fn select_candidate_rank(&mut self, rank: u32) -> &ViewState {
        self.cursor.selected_rank = rank;
        self.refresh()
    }

    pub fn toggle_orientation(&mut self) -> &ViewState {
        self.cursor.flipped = !self.cursor.flipped;
        self.refresh()
    }

    fn reset(&mut self) {
        self.cursor = ReplayCursor::default();
        self.refresh();
    }

    fn move_to(&mut self, ply: usize) -> &ViewState {
        self.cursor.ply = ply.min(self.total());
        self.refresh()
    }

    fn refresh(&mut self) -> &ViewState {
        self.state = self.compute();
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.render(&self.state);
        }
        &self.state
    }

    fn compute(&self) -> ViewState {
        let ply = self.cursor.ply;
        let position = self.replayer.seek(ply);
        let record = ply.checked_sub(1).and_then(|i| self.records.get(i));

        let last_move = self.replayer.ply_move(ply).map(|m| PlayedMove {
            san: m.san.clone(),
            squares: SquarePair {
                from: m.from.clone(),
                to: m.to.clone(),
            },
            tag: record.map(|r| r.tag),
            loss: record.map(|r| r.loss),
        });

        let candidate = record
            .and_then(|r| r.line(self.cursor.selected_rank))
            .map(|line| CandidateView::build(self.replayer.seek(ply - 1), line));

        ViewState {
            ply,
            total: self.total(),
            fen: fen_of(position),
            side_to_move: position.turn().into(),
            flipped: self.cursor.flipped,
            selected_rank: self.cursor.selected_rank,
            last_move,
            candidate,
            summaries: self.summaries.clone(),
        }
    }
}
