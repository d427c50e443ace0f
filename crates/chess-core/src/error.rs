//! Errors raised while reading or replaying a game

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChessError {
    /// Nothing playable was found in the supplied text.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    /// The rules engine rejected a token. `ply` is 1-based.
    #[error("Illegal move {token} at ply {ply}: {reason}")]
    IllegalMove {
        ply: usize,
        token: String,
        reason: String,
    },
}

impl ChessError {
    /// Ply index carried by the error, if any.
    pub fn ply(&self) -> Option<usize> {
        match self {
            ChessError::IllegalMove { ply, .. } => Some(*ply),
            _ => None,
        }
    }
}
