//! Review error types

use chess_core::ChessError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Configuration error: {0}")]
    Config(&'static str),

    /// Tokenizer or replay failure, including illegal moves.
    #[error(transparent)]
    Chess(#[from] ChessError),

    /// The engine session could not start or be reconfigured.
    #[error("Evaluator unavailable: {0}")]
    EvaluatorUnavailable(String),

    #[error("Engine error: {0}")]
    Engine(String),
}

impl ReviewError {
    /// True for failures of the engine session rather than of the game.
    pub fn is_evaluator_failure(&self) -> bool {
        matches!(
            self,
            ReviewError::EvaluatorUnavailable(_) | ReviewError::Engine(_)
        )
    }

    /// True when the run never started because the input had no usable moves.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            ReviewError::Chess(ChessError::InvalidInput(_))
                | ReviewError::Chess(ChessError::InvalidFen { .. })
        )
    }
}
