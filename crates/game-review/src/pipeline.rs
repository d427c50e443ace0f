//! Per-ply analysis of one game.

use std::collections::BTreeMap;

use chess_core::{pgn, ChessError, Game, GameHeaders, Replayer, Side};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classify::{self, ClassifierPolicy, MoveContext};
use crate::config::ReviewConfig;
use crate::engine::{EngineSession, SearchBudget};
use crate::error::ReviewError;
use crate::evaluator::Evaluator;
use crate::record::PlyRecord;
use crate::summary::{SideSummary, Summaries};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    pub budget: SearchBudget,
    /// Ranked lines requested for every pre-move position
    pub line_count: u32,
    pub policy: ClassifierPolicy,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            budget: SearchBudget::default(),
            line_count: 3,
            policy: ClassifierPolicy::default(),
        }
    }
}

impl From<&ReviewConfig> for AnalysisOptions {
    fn from(config: &ReviewConfig) -> Self {
        Self {
            budget: config.budget,
            line_count: config.line_count,
            policy: ClassifierPolicy {
                book_max_ply: config.book_max_ply,
            },
        }
    }
}

/// Reported after every completed ply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub ply: usize,
    pub total: usize,
}

/// Outcome of one run. When `halted` is set the records and summaries cover
/// only the plies before the rejected move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameAnalysis {
    pub headers: GameHeaders,
    /// Starting FEN when the game does not begin from the initial position
    pub start_fen: Option<String>,
    pub records: Vec<PlyRecord>,
    pub summaries: Summaries,
    pub total_plies: usize,
    pub halted: Option<ChessError>,
}

impl GameAnalysis {
    pub fn is_complete(&self) -> bool {
        self.halted.is_none()
    }

    pub fn summary(&self, side: Side) -> &SideSummary {
        self.summaries.side(side)
    }

    /// Tokens of the analyzed prefix, as written in the game text.
    pub fn move_texts(&self) -> Vec<String> {
        self.records.iter().map(|r| r.move_text.clone()).collect()
    }
}

/// Tokenize `raw` and analyze the game it holds.
pub async fn analyze_text<S, F>(
    evaluator: &mut Evaluator<S>,
    raw: &str,
    options: &AnalysisOptions,
    on_progress: F,
) -> Result<GameAnalysis, ReviewError>
where
    S: EngineSession,
    F: FnMut(Progress),
{
    let game = pgn::tokenize(raw)?;
    analyze_game(evaluator, &game, options, on_progress).await
}

/// Evaluate every ply of `game` in order.
///
/// An illegal move ends the run early with a partial result. Any evaluator
/// failure aborts the run.
pub async fn analyze_game<S, F>(
    evaluator: &mut Evaluator<S>,
    game: &Game,
    options: &AnalysisOptions,
    mut on_progress: F,
) -> Result<GameAnalysis, ReviewError>
where
    S: EngineSession,
    F: FnMut(Progress),
{
    if game.moves.is_empty() {
        return Err(ChessError::InvalidInput("no moves to analyze".into()).into());
    }

    let mut replayer = Replayer::for_game(game)?;
    let total = game.moves.len();
    let mut records = Vec::with_capacity(total);
    let mut halted = None;

    info!(total, title = %game.headers.title(), "Starting analysis");
    evaluator.new_game().await?;

    for (i, token) in game.moves.iter().enumerate() {
        let ply = i + 1;
        let (_, played) = match replayer.preview(token) {
            Ok(preview) => preview,
            Err(e) => {
                warn!(ply, token = %token, error = %e, "Illegal move, halting analysis");
                halted = Some(e);
                break;
            }
        };

        let fen = replayer.fen_at(i).unwrap_or_default();
        let side_to_move = replayer.side_to_move(i).unwrap_or(Side::White);

        let lines = evaluator
            .top_lines(&fen, &options.budget, options.line_count)
            .await?;
        let pre_score = lines.first().map_or(0, |l| l.score.clamped_cp());

        let post_score = match evaluator
            .forced_line_for(&fen, &played.uci, &options.budget)
            .await?
        {
            Some(line) => line.score.clamped_cp(),
            None => {
                debug!(ply, uci = %played.uci, "No forced line, using pre-move score");
                pre_score
            }
        };

        let context = MoveContext::new(ply, pre_score, post_score, &lines);
        let tag = classify::classify_context(&options.policy, &context);
        debug!(ply, san = %played.san, pre_score, post_score, loss = context.loss, tag = tag.as_str(), "Classified");

        replayer.apply_next(token)?;
        records.push(PlyRecord {
            ply_index: ply,
            side_to_move,
            move_text: token.clone(),
            san: played.san,
            uci: played.uci,
            pre_score: context.pre,
            post_score: context.post,
            loss: context.loss,
            tag,
            candidate_lines: lines.into_iter().map(|l| (l.rank, l)).collect::<BTreeMap<_, _>>(),
        });

        on_progress(Progress { ply, total });
    }

    let summaries = Summaries::from_records(&records);
    info!(
        plies = records.len(),
        total,
        white_accuracy = summaries.white.accuracy_percent,
        black_accuracy = summaries.black.accuracy_percent,
        halted = halted.is_some(),
        "Analysis finished"
    );

    Ok(GameAnalysis {
        headers: game.headers.clone(),
        start_fen: game.start_fen().map(str::to_string),
        records,
        summaries,
        total_plies: total,
        halted,
    })
}
