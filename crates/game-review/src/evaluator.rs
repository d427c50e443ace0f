//! Evaluator adapter: turns a stream of engine events into ranked line
//! snapshots.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::engine::{EngineCommand, EngineEvent, EngineSession, LineUpdate, SearchBudget};
use crate::error::ReviewError;
use crate::score::EvaluationLine;

/// Wraps one engine session. Every request borrows the adapter mutably, so
/// at most one search is outstanding at a time.
pub struct Evaluator<S> {
    session: S,
    line_count: Option<u32>,
}

impl<S: EngineSession> Evaluator<S> {
    pub fn new(session: S) -> Self {
        Self {
            session,
            line_count: None,
        }
    }

    /// Adapter over a session whose engine already runs with `line_count`
    /// ranked lines.
    pub fn with_line_count(session: S, line_count: u32) -> Self {
        Self {
            session,
            line_count: Some(line_count),
        }
    }

    /// Reset engine state before analyzing a new game.
    pub async fn new_game(&mut self) -> Result<(), ReviewError> {
        self.session.send(EngineCommand::NewGame).await
    }

    /// Up to `line_count` best lines for `fen`, ordered by rank.
    ///
    /// Fewer lines come back when the position has fewer legal moves, none
    /// when the game is over.
    pub async fn top_lines(
        &mut self,
        fen: &str,
        budget: &SearchBudget,
        line_count: u32,
    ) -> Result<Vec<EvaluationLine>, ReviewError> {
        let line_count = line_count.max(1);
        self.configure(line_count).await?;
        self.session
            .send(EngineCommand::Search {
                fen: fen.to_string(),
                budget: *budget,
                restrict_to: None,
            })
            .await?;
        self.collect(line_count).await
    }

    /// Evaluation of the position after forcing `coord_move`, from the point
    /// of view of the side that plays it. `None` when the engine reported no
    /// line for the move.
    pub async fn forced_line_for(
        &mut self,
        fen: &str,
        coord_move: &str,
        budget: &SearchBudget,
    ) -> Result<Option<EvaluationLine>, ReviewError> {
        self.session
            .send(EngineCommand::Search {
                fen: fen.to_string(),
                budget: *budget,
                restrict_to: Some(coord_move.to_string()),
            })
            .await?;
        let mut lines = self.collect(1).await?;
        Ok(if lines.is_empty() {
            None
        } else {
            Some(lines.swap_remove(0))
        })
    }

    /// Release the adapter, shutting the engine down.
    pub async fn close(mut self) {
        self.session.close().await;
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Change the ranked line count only when it differs from the active one.
    async fn configure(&mut self, line_count: u32) -> Result<(), ReviewError> {
        if self.line_count == Some(line_count) {
            return Ok(());
        }
        debug!(line_count, "Reconfiguring engine line count");
        self.session
            .send(EngineCommand::SetLineCount(line_count))
            .await
            .map_err(|e| match e {
                ReviewError::EvaluatorUnavailable(_) => e,
                other => ReviewError::EvaluatorUnavailable(other.to_string()),
            })?;
        self.line_count = Some(line_count);
        Ok(())
    }

    /// Drain events until the search completes, keeping the deepest update
    /// per rank. Ranks above `max_rank` are dropped.
    async fn collect(&mut self, max_rank: u32) -> Result<Vec<EvaluationLine>, ReviewError> {
        let mut by_rank: BTreeMap<u32, LineUpdate> = BTreeMap::new();
        loop {
            match self.session.next_event().await? {
                EngineEvent::Line(update) => {
                    if update.rank == 0 || update.rank > max_rank {
                        continue;
                    }
                    let newer = by_rank
                        .get(&update.rank)
                        .map_or(true, |held| update.depth >= held.depth);
                    if newer {
                        by_rank.insert(update.rank, update);
                    }
                }
                EngineEvent::SearchComplete { best_move } => {
                    trace!(?best_move, lines = by_rank.len(), "Search complete");
                    break;
                }
            }
        }
        Ok(by_rank.into_values().map(LineUpdate::into_line).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scripted::ScriptedSession;
    use crate::score::Score;

    const FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn update(rank: u32, depth: u32, cp: i32, pv: &str) -> EngineEvent {
        EngineEvent::Line(LineUpdate {
            rank,
            depth: Some(depth),
            score: Score::Centipawns(cp),
            pv: pv.split_whitespace().map(str::to_string).collect(),
        })
    }

    #[tokio::test]
    async fn test_top_lines_keeps_latest_per_rank() {
        let mut session = ScriptedSession::new();
        session.push_search(vec![
            update(1, 10, 15, "d2d4"),
            update(2, 10, 10, "e2e4"),
            update(1, 12, 30, "e2e4 e7e5"),
            update(3, 12, 5, "g1f3"),
            update(2, 12, 25, "d2d4 d7d5"),
        ]);
        let mut evaluator = Evaluator::new(session);

        let lines = evaluator
            .top_lines(FEN, &SearchBudget::Depth(12), 3)
            .await
            .unwrap();
        let ranks: Vec<u32> = lines.iter().map(|l| l.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert_eq!(lines[0].score, Score::Centipawns(30));
        assert_eq!(lines[0].best_move(), Some("e2e4"));
        assert_eq!(lines[1].score, Score::Centipawns(25));
    }

    #[tokio::test]
    async fn test_top_lines_drops_ranks_above_count() {
        let mut session = ScriptedSession::new();
        session.push_search(vec![
            update(1, 8, 20, "e2e4"),
            update(2, 8, 10, "d2d4"),
            update(3, 8, 0, "c2c4"),
        ]);
        let mut evaluator = Evaluator::new(session);

        let lines = evaluator
            .top_lines(FEN, &SearchBudget::Depth(8), 2)
            .await
            .unwrap();
        assert_eq!(lines.len(), 2);
    }

    #[tokio::test]
    async fn test_fewer_lines_than_requested() {
        let mut session = ScriptedSession::new();
        session.push_score(Score::Mate(1), "d8h4");
        let mut evaluator = Evaluator::new(session);

        let lines = evaluator
            .top_lines(FEN, &SearchBudget::Depth(8), 3)
            .await
            .unwrap();
        assert_eq!(lines.len(), 1);
    }

    #[tokio::test]
    async fn test_line_count_reconfigured_only_on_change() {
        let mut session = ScriptedSession::new();
        session.push_empty().push_empty().push_empty();
        let mut evaluator = Evaluator::new(session);
        let budget = SearchBudget::Depth(4);

        evaluator.top_lines(FEN, &budget, 3).await.unwrap();
        evaluator.top_lines(FEN, &budget, 3).await.unwrap();
        evaluator.top_lines(FEN, &budget, 1).await.unwrap();

        let reconfigs: Vec<&EngineCommand> = evaluator
            .session()
            .sent()
            .iter()
            .filter(|c| matches!(c, EngineCommand::SetLineCount(_)))
            .collect();
        assert_eq!(
            reconfigs,
            vec![&EngineCommand::SetLineCount(3), &EngineCommand::SetLineCount(1)]
        );
    }

    #[tokio::test]
    async fn test_forced_line_restricts_search() {
        let mut session = ScriptedSession::new();
        session.push_score(Score::Centipawns(-40), "g1f3 d7d5");
        let mut evaluator = Evaluator::new(session);

        let line = evaluator
            .forced_line_for(FEN, "g1f3", &SearchBudget::Depth(8))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(line.rank, 1);
        assert_eq!(line.score, Score::Centipawns(-40));

        let sent = evaluator.session().sent();
        assert!(matches!(
            sent.last(),
            Some(EngineCommand::Search { restrict_to: Some(mv), .. }) if mv == "g1f3"
        ));
    }

    #[tokio::test]
    async fn test_line_count_set_at_startup_is_kept() {
        let mut session = ScriptedSession::new();
        session.push_empty().push_empty();
        let mut evaluator = Evaluator::with_line_count(session, 3);
        let budget = SearchBudget::Depth(4);

        evaluator.top_lines(FEN, &budget, 3).await.unwrap();
        evaluator.top_lines(FEN, &budget, 2).await.unwrap();

        let sent = evaluator.session().sent();
        assert!(matches!(sent.first(), Some(EngineCommand::Search { .. })));
        assert_eq!(
            sent.iter()
                .filter(|c| matches!(c, EngineCommand::SetLineCount(_)))
                .collect::<Vec<_>>(),
            vec![&EngineCommand::SetLineCount(2)]
        );
    }

    #[tokio::test]
    async fn test_forced_line_absent() {
        let mut session = ScriptedSession::new();
        session.push_empty();
        let mut evaluator = Evaluator::new(session);

        let line = evaluator
            .forced_line_for(FEN, "e2e4", &SearchBudget::Depth(8))
            .await
            .unwrap();
        assert!(line.is_none());
    }

    #[tokio::test]
    async fn test_reconfigure_failure_is_unavailable() {
        let mut session = ScriptedSession::new();
        session.fail_reconfigure();
        let mut evaluator = Evaluator::new(session);

        let err = evaluator
            .top_lines(FEN, &SearchBudget::Depth(8), 3)
            .await
            .unwrap_err();
        assert!(matches!(err, ReviewError::EvaluatorUnavailable(_)));
    }
}
