//! Integration tests: PGN tokenizing, re-synthesis and replay.

mod common;

use chess_core::pgn::{split_games, tokenize, write_pgn};
use chess_core::{ChessError, Replayer};

const ANNOTATED: &str = r#"[Event "Casual Game"]
[Site "?"]
[White "Anderssen"]
[Black "Kieseritzky"]
[Result "1-0"]
[ECO "C33"]

1. e4 {King's Gambit} e5 2. f4 exf4 3. Bc4 Qh4+ $6 (3... d5 4. Bxd5 (4. exd5 Qh4+) Nf6)
4. Kf1 b5?! 5. Bxb5 Nf6 6. Nf3 ; eyeing the queen
Qh6 7. d3 Nh5 8. Nh4 {[%clk 0:01:02]} Qg5 9. Nf5 c6 10. g4 Nf6 11. Rg1 cxb5
12. h4 Qg6 13. h5 Qg5 14. Qf3 Ng8 15. Bxf4 Qf6 16. Nc3 Bc5 17. Nd5 Qxb2
18. Bd6 Bxg1 19. e5 Qxa1+ 20. Ke2 Na6 21. Nxg7+ Kd8 22. Qf6+ Nxf6 23. Be7# 1-0"#;

#[test]
fn test_annotated_game_tokens() {
    let game = tokenize(ANNOTATED).unwrap();
    assert_eq!(game.moves.len(), 45);
    assert_eq!(&game.moves[..6], &common::tokens("e4 e5 f4 exf4 Bc4 Qh4+")[..]);
    assert_eq!(game.moves.last().map(String::as_str), Some("Be7#"));
    assert_eq!(game.headers.get("ECO"), Some("C33"));

    let (replayer, rejected) = Replayer::replay_prefix(None, &game.moves).unwrap();
    assert!(rejected.is_none());
    assert_eq!(replayer.len(), 45);
}

#[test]
fn test_resynthesized_pgn_is_idempotent() {
    let game = tokenize(ANNOTATED).unwrap();
    let written = write_pgn(&game.headers, &game.moves);
    assert!(written.starts_with("[Event \"Casual Game\"]\n[Site \"?\"]\n[Date \"?\"]"));
    assert!(written.lines().all(|l| l.len() <= 80));

    let again = tokenize(&written).unwrap();
    assert_eq!(again.moves, game.moves);
    assert_eq!(again.headers.get("White"), Some("Anderssen"));

    assert_eq!(write_pgn(&again.headers, &again.moves), written);
}

#[test]
fn test_setup_position_round_trip() {
    let pgn = r#"[SetUp "1"]
[FEN "4k3/8/8/8/8/8/4P3/4K3 b - - 0 40"]

40... Kd7 41. e4 Ke6 *"#;
    let game = tokenize(pgn).unwrap();
    assert_eq!(game.moves, common::tokens("Kd7 e4 Ke6"));

    let written = write_pgn(&game.headers, &game.moves);
    assert!(written.contains("40... Kd7 41. e4 Ke6 *"));

    let replayer = Replayer::for_game(&game).unwrap();
    assert_eq!(replayer.side_to_move(0), Some(chess_core::Side::Black));
}

#[test]
fn test_split_archive() {
    let archive = format!("{ANNOTATED}\n\n[Event \"Second\"]\n\n1. d4 d5 1/2-1/2\n");
    let games = split_games(&archive);
    assert_eq!(games.len(), 2);
    let second = tokenize(&games[1]).unwrap();
    assert_eq!(second.moves, common::tokens("d4 d5"));
    assert_eq!(second.headers.get("Event"), Some("Second"));
}

#[test]
fn test_headers_only_is_invalid_input() {
    let err = tokenize("[Event \"Empty\"]\n\n*").unwrap_err();
    assert!(matches!(err, ChessError::InvalidInput(_)));
}

#[test]
fn test_unicode_annotations_replay() {
    let text = "[Event \"Arena [Blitz]\"]\n\n1. e4 1… e5 2. Nf3‼ … Nc6 3. Bb5⁉ a6 *";
    let game = tokenize(text).unwrap();
    assert_eq!(game.headers.get("Event"), Some("Arena [Blitz]"));
    assert_eq!(game.moves.len(), 6);

    let (replayer, rejected) = Replayer::replay_prefix(None, &game.moves).unwrap();
    assert!(rejected.is_none());
    assert_eq!(replayer.len(), 6);
}

#[test]
fn test_foreign_glyph_halts_replay() {
    let moves = common::tokens("e4 e5 Nf3★ Nc6");
    let (replayer, rejected) = Replayer::replay_prefix(None, &moves).unwrap();
    assert_eq!(replayer.len(), 2);
    assert!(matches!(rejected, Some(ChessError::IllegalMove { ply: 3, .. })));
}
