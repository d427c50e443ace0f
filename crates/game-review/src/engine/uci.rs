//! Parsing of UCI engine output lines.

use super::LineUpdate;
use crate::score::Score;

/// Parse an `info ... pv ...` line into a ranked line update.
///
/// Lines without a score or without a principal variation are ignored.
/// A missing `multipv` field means rank 1.
pub fn parse_info(line: &str) -> Option<LineUpdate> {
    if !line.starts_with("info") || !line.contains(" pv ") {
        return None;
    }

    let score = match (parse_mate(line), parse_cp(line)) {
        (Some(mate), _) => Score::Mate(mate),
        (None, Some(cp)) => Score::Centipawns(cp),
        (None, None) => return None,
    };
    let pv = parse_pv(line);
    if pv.is_empty() {
        return None;
    }

    Some(LineUpdate {
        rank: parse_multipv_index(line).unwrap_or(1),
        depth: parse_field(line, "depth"),
        score,
        pv,
    })
}

/// Parse a `bestmove` line. The outer `None` means the line is something
/// else, the inner one that the engine had no move to report.
pub fn parse_bestmove(line: &str) -> Option<Option<String>> {
    let mut parts = line.split_whitespace();
    if parts.next()? != "bestmove" {
        return None;
    }
    match parts.next() {
        Some("(none)") | Some("0000") | None => Some(None),
        Some(mv) => Some(Some(mv.to_string())),
    }
}

/// Value following `key` in a whitespace separated line
fn parse_field<T: std::str::FromStr>(line: &str, key: &str) -> Option<T> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    for (i, part) in parts.iter().enumerate() {
        if *part == key && i + 1 < parts.len() {
            return parts[i + 1].parse().ok();
        }
    }
    None
}

/// Parse centipawn score from info line
fn parse_cp(line: &str) -> Option<i32> {
    parse_field(line, "cp")
}

/// Parse mate score from info line
fn parse_mate(line: &str) -> Option<i32> {
    parse_field(line, "mate")
}

/// Parse multipv index from info line
fn parse_multipv_index(line: &str) -> Option<u32> {
    parse_field(line, "multipv")
}

/// Parse PV moves from info line
fn parse_pv(line: &str) -> Vec<String> {
    let mut in_pv = false;
    let mut moves = Vec::new();

    for part in line.split_whitespace() {
        if part == "pv" {
            in_pv = true;
            continue;
        }
        if in_pv {
            // PV ends at next keyword or end of line
            if part.starts_with("bmc") || part == "string" {
                break;
            }
            moves.push(part.to_string());
        }
    }

    moves
}
