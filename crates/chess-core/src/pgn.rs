//! Lightweight regex-based PGN tokenizer.
//!
//! Turns raw game text into header tags and an ordered list of SAN tokens,
//! dropping comments, NAGs, variations and move numbers.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ChessError;
use crate::game_data::{Game, GameHeaders};

const RESULT_TOKENS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

/// Tags written first, in this order, by [`write_pgn`].
const SEVEN_TAG_ROSTER: [&str; 7] = ["Event", "Site", "Date", "Round", "White", "Black", "Result"];

const MOVETEXT_WIDTH: usize = 80;

static HEADER_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*\[([A-Za-z0-9_]+)\s+"([^"]*)"\][ \t]*$"#).expect("header regex")
});
static BRACKET_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\[[^\]\n]*\][ \t]*$").expect("bracket regex"));
static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]*\}").expect("comment regex"));
static LINE_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r";[^\n]*").expect("line comment regex"));
static NAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\d+").expect("nag regex"));
static VARIATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^()]*\)").expect("variation regex"));
static MOVE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.|\.\.\.|…)$").expect("move number regex"));
static GLUED_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.+|…)(\S+)$").expect("glued number regex"));
static BLANK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("blank run regex"));

/// Parse raw game text into headers and SAN tokens.
///
/// Fails with [`ChessError::InvalidInput`] when no move tokens survive cleanup.
pub fn tokenize(raw: &str) -> Result<Game, ChessError> {
    let text = normalize(raw);
    let headers = parse_headers(&text);

    // Tag values may contain ']', so quoted tag lines go first
    let body = HEADER_LINE_RE.replace_all(&text, "");
    let body = BRACKET_LINE_RE.replace_all(&body, "");
    let body = COMMENT_RE.replace_all(&body, " ");
    let body = LINE_COMMENT_RE.replace_all(&body, " ");
    let mut body = NAG_RE.replace_all(&body, " ").into_owned();

    // Innermost variations first, until nested ones are gone too
    while VARIATION_RE.is_match(&body) {
        body = VARIATION_RE.replace_all(&body, " ").into_owned();
    }

    let moves = extract_tokens(&body);
    if moves.is_empty() {
        return Err(ChessError::InvalidInput(
            "no moves found in game text".to_string(),
        ));
    }

    Ok(Game { headers, moves })
}

/// Header tags only; later duplicates win.
pub fn parse_headers(text: &str) -> GameHeaders {
    let mut headers = GameHeaders::default();
    for cap in HEADER_LINE_RE.captures_iter(text) {
        headers.insert(cap[1].to_string(), cap[2].to_string());
    }
    headers
}

/// Line endings, HTML non-breaking spaces, zero-width characters and long
/// blank runs are normalized before anything else looks at the text.
pub fn normalize(raw: &str) -> String {
    let text = raw
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace("&nbsp;", " ")
        .replace('\u{00a0}', " ")
        .replace(['\u{200b}', '\u{200c}', '\u{200d}', '\u{feff}'], "");
    BLANK_RUN_RE.replace_all(&text, "\n\n").trim().to_string()
}

fn extract_tokens(body: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for word in body.split_whitespace() {
        if RESULT_TOKENS.contains(&word) {
            break;
        }
        if MOVE_NUMBER_RE.is_match(word) || word.chars().all(|c| c == '.' || c == '…') {
            continue;
        }
        // "12.Nf3" and "12...Nf6" written without a space
        if let Some(cap) = GLUED_NUMBER_RE.captures(word) {
            let mv = &cap[1];
            if RESULT_TOKENS.contains(&mv) {
                break;
            }
            tokens.push(mv.to_string());
            continue;
        }
        tokens.push(word.to_string());
    }
    tokens
}

/// Split a multi-game dump (e.g. a monthly archive) into single games at each
/// `[Event "` tag. Text without any Event tag is returned as one game.
pub fn split_games(text: &str) -> Vec<String> {
    let text = normalize(text);
    let mut games = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        if line.trim_start().starts_with("[Event \"") && has_movetext(&current) {
            games.push(current.trim().to_string());
            current.clear();
        }
        current.push_str(line);
        current.push('\n');
    }
    if !current.trim().is_empty() {
        games.push(current.trim().to_string());
    }
    games
}

fn has_movetext(chunk: &str) -> bool {
    chunk
        .lines()
        .any(|l| !l.trim().is_empty() && !l.trim_start().starts_with('['))
}

/// Write a minimal PGN: the seven-tag roster, the remaining tags, then the
/// numbered movetext wrapped to 80 columns and terminated by the result.
pub fn write_pgn(headers: &GameHeaders, moves: &[String]) -> String {
    let mut out = String::new();
    for name in SEVEN_TAG_ROSTER {
        let default = match name {
            "Result" => "*",
            _ => "?",
        };
        let value = headers.get(name).unwrap_or(default);
        out.push_str(&format!("[{name} \"{value}\"]\n"));
    }
    for (name, value) in headers.iter() {
        if !SEVEN_TAG_ROSTER.contains(&name) {
            out.push_str(&format!("[{name} \"{value}\"]\n"));
        }
    }
    out.push('\n');

    let (mut number, mut white_to_move) = headers
        .start_fen()
        .map(move_counters)
        .unwrap_or((1, true));

    let mut movetext = Vec::with_capacity(moves.len() + moves.len() / 2 + 1);
    for (i, mv) in moves.iter().enumerate() {
        if white_to_move {
            movetext.push(format!("{number}."));
        } else if i == 0 {
            movetext.push(format!("{number}..."));
        }
        movetext.push(mv.clone());
        if !white_to_move {
            number += 1;
        }
        white_to_move = !white_to_move;
    }
    movetext.push(headers.get("Result").unwrap_or("*").to_string());

    out.push_str(&wrap_to_width(&movetext.join(" "), MOVETEXT_WIDTH));
    out.push('\n');
    out
}

/// Fullmove number and side to move from a FEN, defaulting to move 1, white.
pub fn move_counters(fen: &str) -> (u32, bool) {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    let white = fields.get(1).map(|s| *s != "b").unwrap_or(true);
    let number = fields
        .get(5)
        .and_then(|s| s.parse().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1);
    (number, white)
}

/// Greedy word wrap; words longer than `width` get their own line.
pub fn wrap_to_width(text: &str, width: usize) -> String {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
        } else if line.len() + 1 + word.len() <= width {
            line.push(' ');
            line.push_str(word);
        } else {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines.join("\n")
}
