#![allow(dead_code)]

use game_review::engine::scripted::ScriptedSession;
use game_review::{AnalysisOptions, ClassifierPolicy, Score};

/// Twenty plies of a Breyer Ruy Lopez.
pub const BREYER: &str =
    "e4 e5 Nf3 Nc6 Bb5 a6 Ba4 Nf6 O-O Be7 Re1 b5 Bb3 d6 c3 O-O h3 Nb8 d4 Nbd7";

pub fn tokens(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Script one pre-move search (single line) and one forced search per ply.
pub fn scripted_evals(evals: &[(i32, i32)]) -> ScriptedSession {
    let mut session = ScriptedSession::new();
    for (pre, post) in evals {
        session
            .push_score(Score::Centipawns(*pre), "a2a3")
            .push_score(Score::Centipawns(*post), "a2a3");
    }
    session
}

/// Options with the book rule switched off so only engine scores matter.
pub fn options_without_book() -> AnalysisOptions {
    AnalysisOptions {
        policy: ClassifierPolicy { book_max_ply: 0 },
        ..AnalysisOptions::default()
    }
}
