//! Position replay over the shakmaty rules engine.
//!
//! The replayer keeps the whole position chain: `positions[i]` is the state
//! before ply `i + 1`, the last entry is the current tip. Positions are plain
//! values, so any prefix can be forked without touching the main chain.

use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Move, Position};

use crate::error::ChessError;
use crate::game_data::{Game, Side};
use crate::notation::{self, PlyMove};

#[derive(Debug, Clone)]
pub struct Replayer {
    positions: Vec<Chess>,
    plies: Vec<PlyMove>,
    tokens: Vec<String>,
}

impl Default for Replayer {
    fn default() -> Self {
        Self {
            positions: vec![Chess::default()],
            plies: Vec::new(),
            tokens: Vec::new(),
        }
    }
}

impl Replayer {
    /// Start from `start_fen`, or the standard initial position.
    pub fn new(start_fen: Option<&str>) -> Result<Self, ChessError> {
        let start = match start_fen {
            Some(fen) => parse_fen(fen)?,
            None => Chess::default(),
        };
        Ok(Self {
            positions: vec![start],
            plies: Vec::new(),
            tokens: Vec::new(),
        })
    }

    /// Start position for a tokenized game (honours SetUp/FEN headers).
    pub fn for_game(game: &Game) -> Result<Self, ChessError> {
        Self::new(game.start_fen())
    }

    /// Replay as many tokens as the rules engine accepts. The first rejection
    /// is returned alongside the replayer holding the legal prefix.
    pub fn replay_prefix(
        start_fen: Option<&str>,
        tokens: &[String],
    ) -> Result<(Self, Option<ChessError>), ChessError> {
        let mut replayer = Self::new(start_fen)?;
        for token in tokens {
            if let Err(e) = replayer.apply_next(token) {
                return Ok((replayer, Some(e)));
            }
        }
        Ok((replayer, None))
    }

    /// Number of plies applied so far (N).
    pub fn len(&self) -> usize {
        self.plies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plies.is_empty()
    }

    /// Position[index] for `index` in `0..=len()`.
    pub fn position(&self, index: usize) -> Option<&Chess> {
        self.positions.get(index)
    }

    /// Position at `index`, clamped into `0..=len()`.
    pub fn seek(&self, index: usize) -> &Chess {
        &self.positions[index.min(self.len())]
    }

    /// Independent copy of Position[index] for preview branches.
    pub fn fork(&self, index: usize) -> Option<Chess> {
        self.positions.get(index).cloned()
    }

    pub fn current(&self) -> &Chess {
        self.seek(self.len())
    }

    pub fn fen_at(&self, index: usize) -> Option<String> {
        self.position(index).map(fen_of)
    }

    /// FEN before 1-based `ply` is played.
    pub fn position_before(&self, ply: usize) -> Option<String> {
        ply.checked_sub(1).and_then(|i| self.fen_at(i))
    }

    /// FEN after 1-based `ply` is played.
    pub fn position_after(&self, ply: usize) -> Option<String> {
        if ply == 0 {
            return None;
        }
        self.fen_at(ply)
    }

    pub fn side_to_move(&self, index: usize) -> Option<Side> {
        self.position(index).map(|pos| pos.turn().into())
    }

    /// Metadata of 1-based `ply`.
    pub fn ply_move(&self, ply: usize) -> Option<&PlyMove> {
        ply.checked_sub(1).and_then(|i| self.plies.get(i))
    }

    pub fn plies(&self) -> &[PlyMove] {
        &self.plies
    }

    /// Tokens exactly as they were applied.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Resolve `token` against the tip without advancing.
    pub fn preview(&self, token: &str) -> Result<(Move, PlyMove), ChessError> {
        let pos = self.current();
        let m = notation::resolve_move(pos, token).map_err(|reason| ChessError::IllegalMove {
            ply: self.len() + 1,
            token: token.to_string(),
            reason,
        })?;
        Ok((m, PlyMove::describe(pos, &m)))
    }

    /// Advance by one ply.
    pub fn apply_next(&mut self, token: &str) -> Result<&PlyMove, ChessError> {
        let (m, ply) = self.preview(token)?;
        let mut next = self.current().clone();
        next.play_unchecked(m);

        self.positions.push(next);
        self.tokens.push(token.to_string());
        self.plies.push(ply);
        Ok(&self.plies[self.plies.len() - 1])
    }
}

pub fn parse_fen(fen: &str) -> Result<Chess, ChessError> {
    let invalid = |reason: String| ChessError::InvalidFen {
        fen: fen.to_string(),
        reason,
    };
    let parsed: Fen = fen.trim().parse().map_err(|e| invalid(format!("{e}")))?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|e| invalid(format!("{e}")))
}

/// Canonical position string.
pub fn fen_of(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Legal).to_string()
}
