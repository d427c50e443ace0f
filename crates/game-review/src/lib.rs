//! Move-quality review of chess games.
//!
//! A game is replayed ply by ply; for every ply the engine ranks the best
//! lines of the position before the move and scores the move actually
//! played. The difference becomes a loss, the loss and lines become a tag,
//! and the tags roll up into per-side accuracy. [`viewer::ReplayView`] steps
//! through the result.

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod score;
pub mod summary;
pub mod viewer;

pub use classify::{ClassifierPolicy, MoveTag};
pub use config::ReviewConfig;
pub use error::ReviewError;
pub use evaluator::Evaluator;
pub use pipeline::{analyze_game, analyze_text, AnalysisOptions, GameAnalysis, Progress};
pub use record::PlyRecord;
pub use score::{EvaluationLine, Score};
pub use summary::{SideSummary, Summaries};
pub use viewer::{ReplayView, ViewState};
