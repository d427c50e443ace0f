//! Chess game plumbing for the review pipeline: PGN tokenizing, loose SAN
//! resolution and position replay on top of shakmaty.

pub mod error;
pub mod game_data;
pub mod notation;
pub mod pgn;
pub mod replay;

pub use error::ChessError;
pub use game_data::{Game, GameHeaders, Side};
pub use notation::PlyMove;
pub use replay::Replayer;

/// Standard initial position.
pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
