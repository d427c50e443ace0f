//! Stockfish engine session over the UCI protocol (async I/O)

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;
use tracing::{debug, info};

use super::{uci, EngineCommand, EngineEvent, EngineSession};
use crate::config::EngineSettings;
use crate::error::ReviewError;

/// Upper bound for `uciok`/`readyok` handshakes.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Stockfish engine instance
pub struct StockfishSession {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    searching: bool,
}

impl StockfishSession {
    /// Spawn a new Stockfish process and initialize UCI
    pub async fn spawn(settings: &EngineSettings) -> Result<Self, ReviewError> {
        let mut process = Command::new(&settings.path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .spawn()
            .map_err(|e| {
                ReviewError::EvaluatorUnavailable(format!(
                    "Failed to spawn {}: {e}",
                    settings.path
                ))
            })?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| ReviewError::EvaluatorUnavailable("engine stdin unavailable".into()))?;
        let stdout = process
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or_else(|| ReviewError::EvaluatorUnavailable("engine stdout unavailable".into()))?;

        let mut session = Self {
            process,
            stdin,
            stdout,
            searching: false,
        };

        // Initialize UCI
        session.write_line("uci").await?;
        session.handshake("uciok").await?;

        session
            .write_line(&format!("setoption name Threads value {}", settings.threads))
            .await?;
        session
            .write_line(&format!("setoption name Hash value {}", settings.hash_mb))
            .await?;
        session
            .write_line(&format!("setoption name MultiPV value {}", settings.line_count))
            .await?;
        session.write_line("isready").await?;
        session.handshake("readyok").await?;

        info!(
            path = %settings.path,
            threads = settings.threads,
            hash_mb = settings.hash_mb,
            line_count = settings.line_count,
            "Engine ready"
        );
        Ok(session)
    }

    /// Send a command to Stockfish
    async fn write_line(&mut self, cmd: &str) -> Result<(), ReviewError> {
        debug!(cmd, "SF <");
        self.stdin
            .write_all(format!("{cmd}\n").as_bytes())
            .await
            .map_err(|e| ReviewError::Engine(format!("Failed to write to Stockfish: {e}")))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| ReviewError::Engine(format!("Failed to flush stdin: {e}")))?;
        Ok(())
    }

    /// Read one trimmed line; end of stream is an error.
    async fn read_line(&mut self) -> Result<String, ReviewError> {
        let mut line = String::new();
        let read = self
            .stdout
            .read_line(&mut line)
            .await
            .map_err(|e| ReviewError::Engine(format!("Failed to read from Stockfish: {e}")))?;
        if read == 0 {
            return Err(ReviewError::Engine("Stockfish closed its output".into()));
        }
        let trimmed = line.trim().to_string();
        debug!(line = %trimmed, "SF >");
        Ok(trimmed)
    }

    /// Wait for a specific response line
    async fn wait_for(&mut self, expected: &str) -> Result<(), ReviewError> {
        loop {
            if self.read_line().await? == expected {
                return Ok(());
            }
        }
    }

    /// `wait_for` with a deadline; a silent engine counts as unavailable.
    async fn handshake(&mut self, expected: &str) -> Result<(), ReviewError> {
        match timeout(HANDSHAKE_TIMEOUT, self.wait_for(expected)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ReviewError::EvaluatorUnavailable(e.to_string())),
            Err(_) => Err(ReviewError::EvaluatorUnavailable(format!(
                "no {expected} within {}s",
                HANDSHAKE_TIMEOUT.as_secs()
            ))),
        }
    }

    /// Send quit command and wait for process to exit
    pub async fn quit(&mut self) {
        let _ = self.write_line("quit").await;
        let _ = self.process.wait().await;
    }
}

#[async_trait]
impl EngineSession for StockfishSession {
    async fn send(&mut self, command: EngineCommand) -> Result<(), ReviewError> {
        if self.searching {
            return Err(ReviewError::Engine("search already in progress".into()));
        }
        match command {
            EngineCommand::NewGame => {
                self.write_line("ucinewgame").await?;
                self.write_line("isready").await?;
                self.handshake("readyok").await
            }
            EngineCommand::SetLineCount(count) => {
                self.write_line(&format!("setoption name MultiPV value {count}"))
                    .await
                    .map_err(|e| ReviewError::EvaluatorUnavailable(e.to_string()))?;
                self.write_line("isready")
                    .await
                    .map_err(|e| ReviewError::EvaluatorUnavailable(e.to_string()))?;
                self.handshake("readyok").await
            }
            EngineCommand::Search {
                fen,
                budget,
                restrict_to,
            } => {
                self.write_line(&format!("position fen {fen}")).await?;
                let go = match restrict_to {
                    Some(mv) => format!("go {} searchmoves {mv}", budget.go_args()),
                    None => format!("go {}", budget.go_args()),
                };
                self.write_line(&go).await?;
                self.searching = true;
                Ok(())
            }
        }
    }

    async fn next_event(&mut self) -> Result<EngineEvent, ReviewError> {
        if !self.searching {
            return Err(ReviewError::Engine("no search in progress".into()));
        }
        loop {
            let line = self.read_line().await?;
            if let Some(update) = uci::parse_info(&line) {
                return Ok(EngineEvent::Line(update));
            }
            if let Some(best_move) = uci::parse_bestmove(&line) {
                self.searching = false;
                return Ok(EngineEvent::SearchComplete { best_move });
            }
        }
    }

    async fn close(&mut self) {
        self.quit().await;
    }
}

impl Drop for StockfishSession {
    fn drop(&mut self) {
        // Best-effort synchronous kill in drop
        let _ = self.process.start_kill();
    }
}
