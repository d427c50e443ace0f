//! Review configuration from environment variables

use std::env;

use crate::engine::SearchBudget;
use crate::error::ReviewError;

const DEFAULT_STOCKFISH_PATH: &str = "/usr/local/bin/stockfish";
const DEFAULT_DEPTH: u32 = 16;
const DEFAULT_LINE_COUNT: u32 = 3;
const MAX_LINE_COUNT: u32 = 5;
const DEFAULT_BOOK_MAX_PLY: usize = 10;

/// How to start the engine process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineSettings {
    /// Path to Stockfish binary
    pub path: String,
    pub threads: u32,
    pub hash_mb: u32,
    /// MultiPV set during the handshake
    pub line_count: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            path: DEFAULT_STOCKFISH_PATH.to_string(),
            threads: 1,
            hash_mb: 32,
            line_count: DEFAULT_LINE_COUNT,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ReviewConfig {
    pub engine: EngineSettings,

    /// Search budget per position
    pub budget: SearchBudget,

    /// Ranked lines per pre-move position (MultiPV)
    pub line_count: u32,

    /// Last ply eligible for the book tag
    pub book_max_ply: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            engine: EngineSettings::default(),
            budget: SearchBudget::Depth(DEFAULT_DEPTH),
            line_count: DEFAULT_LINE_COUNT,
            book_max_ply: DEFAULT_BOOK_MAX_PLY,
        }
    }
}

impl ReviewConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ReviewError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable numbers fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ReviewError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let number = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        let path = lookup("STOCKFISH_PATH").unwrap_or_else(|| DEFAULT_STOCKFISH_PATH.to_string());
        let threads = number("ENGINE_THREADS").map_or(1, |v| v as u32).max(1);
        let hash_mb = number("ENGINE_HASH_MB").map_or(32, |v| v as u32).max(1);

        // Movetime wins over nodes, nodes over depth
        let budget = match (
            number("ANALYSIS_MOVETIME_MS").filter(|v| *v > 0),
            number("ANALYSIS_NODES").filter(|v| *v > 0),
        ) {
            (Some(ms), _) => SearchBudget::MoveTime(ms),
            (None, Some(nodes)) => SearchBudget::Nodes(nodes),
            (None, None) => SearchBudget::Depth(
                number("ANALYSIS_DEPTH")
                    .filter(|v| *v > 0)
                    .map_or(DEFAULT_DEPTH, |v| v as u32),
            ),
        };

        let line_count = number("ANALYSIS_MULTIPV").unwrap_or(u64::from(DEFAULT_LINE_COUNT));
        if !(1..=u64::from(MAX_LINE_COUNT)).contains(&line_count) {
            return Err(ReviewError::Config("ANALYSIS_MULTIPV must be between 1 and 5"));
        }
        let line_count = line_count as u32;

        let book_max_ply = number("BOOK_MAX_PLY").map_or(DEFAULT_BOOK_MAX_PLY, |v| v as usize);

        Ok(Self {
            engine: EngineSettings {
                path,
                threads,
                hash_mb,
                line_count,
            },
            budget,
            line_count,
            book_max_ply,
        })
    }
}
