//! Engine session that replays canned search results.
//!
//! Each `Search` command consumes the next scripted search in order. When the
//! script runs dry a search completes with no lines, like an engine looking at
//! a finished game.

use std::collections::VecDeque;

use async_trait::async_trait;

use super::{EngineCommand, EngineEvent, EngineSession, LineUpdate};
use crate::error::ReviewError;
use crate::score::Score;

#[derive(Debug, Default)]
pub struct ScriptedSession {
    searches: VecDeque<Vec<EngineEvent>>,
    pending: VecDeque<EngineEvent>,
    sent: Vec<EngineCommand>,
    fail_reconfigure: bool,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the raw events of one search. A terminal event is appended when
    /// missing.
    pub fn push_search(&mut self, mut events: Vec<EngineEvent>) -> &mut Self {
        if !matches!(events.last(), Some(EngineEvent::SearchComplete { .. })) {
            let best_move = events.iter().find_map(|e| match e {
                EngineEvent::Line(update) if update.rank == 1 => update.pv.first().cloned(),
                _ => None,
            });
            events.push(EngineEvent::SearchComplete { best_move });
        }
        self.searches.push_back(events);
        self
    }

    /// Queue one search reporting final lines, ranked in the given order.
    /// Each principal variation is a space separated list of coordinate moves.
    pub fn push_lines(&mut self, lines: &[(Score, &str)]) -> &mut Self {
        let events = lines
            .iter()
            .enumerate()
            .map(|(i, (score, pv))| {
                EngineEvent::Line(LineUpdate {
                    rank: i as u32 + 1,
                    depth: None,
                    score: *score,
                    pv: pv.split_whitespace().map(str::to_string).collect(),
                })
            })
            .collect();
        self.push_search(events)
    }

    /// Queue one search that reports a single line.
    pub fn push_score(&mut self, score: Score, pv: &str) -> &mut Self {
        self.push_lines(&[(score, pv)])
    }

    /// Queue one search that ends without any line.
    pub fn push_empty(&mut self) -> &mut Self {
        self.push_search(vec![EngineEvent::SearchComplete { best_move: None }])
    }

    /// Make every `SetLineCount` fail as if the engine died.
    pub fn fail_reconfigure(&mut self) -> &mut Self {
        self.fail_reconfigure = true;
        self
    }

    /// Commands received so far.
    pub fn sent(&self) -> &[EngineCommand] {
        &self.sent
    }

    /// Scripted searches not consumed yet.
    pub fn remaining(&self) -> usize {
        self.searches.len()
    }
}

#[async_trait]
impl EngineSession for ScriptedSession {
    async fn send(&mut self, command: EngineCommand) -> Result<(), ReviewError> {
        if !self.pending.is_empty() {
            return Err(ReviewError::Engine("search already in progress".into()));
        }
        match &command {
            EngineCommand::SetLineCount(_) if self.fail_reconfigure => {
                return Err(ReviewError::EvaluatorUnavailable(
                    "scripted engine refused reconfiguration".into(),
                ));
            }
            EngineCommand::Search { .. } => {
                let events = self
                    .searches
                    .pop_front()
                    .unwrap_or_else(|| vec![EngineEvent::SearchComplete { best_move: None }]);
                self.pending.extend(events);
            }
            _ => {}
        }
        self.sent.push(command);
        Ok(())
    }

    async fn next_event(&mut self) -> Result<EngineEvent, ReviewError> {
        self.pending
            .pop_front()
            .ok_or_else(|| ReviewError::Engine("no search in progress".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SearchBudget;

    fn search(fen: &str) -> EngineCommand {
        EngineCommand::Search {
            fen: fen.to_string(),
            budget: SearchBudget::Depth(1),
            restrict_to: None,
        }
    }

    #[tokio::test]
    async fn test_replays_searches_in_order() {
        let mut session = ScriptedSession::new();
        session
            .push_score(Score::Centipawns(20), "e2e4")
            .push_empty();

        session.send(search("a")).await.unwrap();
        assert!(matches!(
            session.next_event().await.unwrap(),
            EngineEvent::Line(LineUpdate { rank: 1, .. })
        ));
        assert_eq!(
            session.next_event().await.unwrap(),
            EngineEvent::SearchComplete {
                best_move: Some("e2e4".into())
            }
        );

        session.send(search("b")).await.unwrap();
        assert_eq!(
            session.next_event().await.unwrap(),
            EngineEvent::SearchComplete { best_move: None }
        );
        assert_eq!(session.remaining(), 0);
        assert_eq!(session.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_next_event_without_search_fails() {
        let mut session = ScriptedSession::new();
        assert!(session.next_event().await.is_err());
    }

    #[tokio::test]
    async fn test_failed_reconfigure() {
        let mut session = ScriptedSession::new();
        session.fail_reconfigure();
        let err = session.send(EngineCommand::SetLineCount(3)).await.unwrap_err();
        assert!(err.is_evaluator_failure());
    }
}
