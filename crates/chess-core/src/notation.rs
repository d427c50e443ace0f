//! Move notation helpers: loose SAN resolution, coordinate formatting and
//! PV conversion.

use serde::{Deserialize, Serialize};
use shakmaty::san::San;
use shakmaty::uci::UciMove;
use shakmaty::{Chess, File, Move, Position, Role, Square};

/// Move metadata reported for every replayed ply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlyMove {
    /// Canonical SAN as produced by the rules engine
    pub san: String,
    /// Coordinate notation, e.g. "e7e8q"; castling as the king's two-square step
    pub uci: String,
    pub from: String,
    pub to: String,
    pub promotion: Option<char>,
}

impl PlyMove {
    pub fn describe(pos: &Chess, m: &Move) -> Self {
        let (from, to) = move_squares(m);
        Self {
            san: San::from_move(pos, *m).to_string(),
            uci: uci_string(m),
            from: from.to_string(),
            to: to.to_string(),
            promotion: m.promotion().map(promotion_char),
        }
    }
}

/// Origin and destination as a viewer sees them (king squares for castling).
pub fn move_squares(m: &Move) -> (Square, Square) {
    match m {
        Move::Normal { from, to, .. } => (*from, *to),
        Move::EnPassant { from, to } => (*from, *to),
        Move::Castle { king, rook } => {
            let to_file = if rook.file() > king.file() { File::G } else { File::C };
            (*king, Square::from_coords(to_file, king.rank()))
        }
        Move::Put { to, .. } => (*to, *to),
    }
}

pub fn uci_string(m: &Move) -> String {
    let (from, to) = move_squares(m);
    match m.promotion() {
        Some(role) => format!("{from}{to}{}", promotion_char(role)),
        None => format!("{from}{to}"),
    }
}

fn promotion_char(role: Role) -> char {
    match role {
        Role::Queen => 'q',
        Role::Rook => 'r',
        Role::Bishop => 'b',
        Role::Knight => 'n',
        Role::King => 'k',
        Role::Pawn => 'p',
    }
}

/// Resolve a move token against a position.
///
/// Strict SAN is tried first, then coordinate notation, then a loose matcher
/// that ignores capture/check markers and, when a disambiguator is missing,
/// takes the first legal candidate in generation order.
pub fn resolve_move(pos: &Chess, token: &str) -> Result<Move, String> {
    let clean = clean_token(token);
    if clean.is_empty() {
        return Err("empty move".to_string());
    }
    if !clean.is_ascii() {
        return Err(format!("unexpected characters in move '{clean}'"));
    }

    if let Ok(san) = clean.parse::<San>() {
        if let Ok(m) = san.to_move(pos) {
            return Ok(m);
        }
    }

    if let Ok(uci) = clean.to_ascii_lowercase().parse::<UciMove>() {
        if let Ok(m) = uci.to_move(pos) {
            return Ok(m);
        }
    }

    loose_match(pos, &clean)
}

const TRAILING_MARKS: &[char] = &['+', '#', '!', '?', '‼', '⁇', '⁉', '⁈', '□'];

/// Strip check/mate markers, annotation glyphs and zero-castling spellings.
fn clean_token(token: &str) -> String {
    let trimmed = token.trim().trim_end_matches(TRAILING_MARKS);
    let trimmed = trimmed.strip_suffix("e.p.").unwrap_or(trimmed).trim();
    match trimmed {
        "0-0" | "o-o" => "O-O".to_string(),
        "0-0-0" | "o-o-o" => "O-O-O".to_string(),
        other => other.to_string(),
    }
}

fn loose_match(pos: &Chess, clean: &str) -> Result<Move, String> {
    let legal = pos.legal_moves();

    if clean == "O-O" || clean == "O-O-O" {
        let kingside = clean == "O-O";
        return legal
            .iter()
            .find(|m| match m {
                Move::Castle { king, rook } => (rook.file() > king.file()) == kingside,
                _ => false,
            })
            .copied()
            .ok_or_else(|| format!("no castling move for {clean}"));
    }

    let (role, rest) = match clean.chars().next() {
        Some(c) if c.is_ascii_uppercase() => match piece_role(c) {
            Some(role) => (role, &clean[1..]),
            None => return Err(format!("unknown piece {c}")),
        },
        _ => (Role::Pawn, clean),
    };

    let (rest, promotion) = match rest.find('=') {
        Some(eq) => (&rest[..eq], rest[eq + 1..].chars().next().and_then(piece_role)),
        None => match rest.chars().last() {
            // "e8Q" without the '='
            Some(c) if role == Role::Pawn && c.is_ascii_alphabetic() && rest.len() > 2 => {
                (&rest[..rest.len() - 1], piece_role(c.to_ascii_uppercase()))
            }
            _ => (rest, None),
        },
    };

    let rest: String = rest.chars().filter(|c| *c != 'x' && *c != '-' && *c != ':').collect();
    if rest.len() < 2 {
        return Err(format!("move too short: {clean}"));
    }
    let dest: Square = rest[rest.len() - 2..]
        .parse()
        .map_err(|_| format!("invalid destination in {clean}"))?;
    let disambig = &rest[..rest.len() - 2];

    let mut candidates: Vec<&Move> = legal
        .iter()
        .filter(|m| m.role() == role && move_squares(m).1 == dest && !m.is_castle())
        .filter(|m| match promotion {
            Some(p) => m.promotion() == Some(p),
            None => m.promotion().is_none() || m.promotion() == Some(Role::Queen),
        })
        .filter(|m| {
            let Some(from) = m.from() else {
                return false;
            };
            let from = from.to_string();
            disambig.chars().all(|c| from.contains(c))
        })
        .collect();

    if candidates.len() > 1 {
        tracing::debug!(token = clean, count = candidates.len(), "ambiguous move, taking first");
    }
    if candidates.is_empty() {
        return Err(format!("no legal move matches {clean}"));
    }
    Ok(*candidates.swap_remove(0))
}

fn piece_role(c: char) -> Option<Role> {
    match c {
        'K' => Some(Role::King),
        'Q' => Some(Role::Queen),
        'R' => Some(Role::Rook),
        'B' => Some(Role::Bishop),
        'N' => Some(Role::Knight),
        'P' => Some(Role::Pawn),
        _ => None,
    }
}

/// Convert a coordinate-move line to SAN, stopping at the first move that is
/// not legal in the running position.
pub fn pv_to_san(pos: &Chess, pv: &[String]) -> Vec<String> {
    let mut pos = pos.clone();
    let mut sans = Vec::with_capacity(pv.len());
    for uci_str in pv {
        let Ok(uci) = uci_str.parse::<UciMove>() else {
            break;
        };
        let Ok(m) = uci.to_move(&pos) else {
            break;
        };
        sans.push(San::from_move(&pos, m).to_string());
        pos.play_unchecked(m);
    }
    sans
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::fen::Fen;
    use shakmaty::{CastlingMode, EnPassantMode};

    fn position(fen: &str) -> Chess {
        fen.parse::<Fen>()
            .unwrap()
            .into_position(CastlingMode::Standard)
            .unwrap()
    }

    fn fen_of(pos: &Chess) -> String {
        Fen::from_position(pos, EnPassantMode::Legal).to_string()
    }

    #[test]
    fn test_resolve_strict_san() {
        let pos = Chess::default();
        let m = resolve_move(&pos, "Nf3").unwrap();
        assert_eq!(uci_string(&m), "g1f3");
    }

    #[test]
    fn test_resolve_coordinate_move() {
        let pos = Chess::default();
        let m = resolve_move(&pos, "e2e4").unwrap();
        assert_eq!(uci_string(&m), "e2e4");
    }

    #[test]
    fn test_resolve_ignores_markers() {
        let pos = Chess::default();
        assert_eq!(uci_string(&resolve_move(&pos, "e4!?").unwrap()), "e2e4");
        assert_eq!(uci_string(&resolve_move(&pos, "Pe4").unwrap()), "e2e4");
    }

    #[test]
    fn test_resolve_missing_disambiguator() {
        // Knights on b1 and f3 can both reach d2
        let pos = position("rnbqkbnr/pppppppp/8/8/3P4/5N2/PPP1PPPP/RNBQKB1R w KQkq - 0 1");
        let m = resolve_move(&pos, "Nd2").unwrap();
        assert_eq!(move_squares(&m).1.to_string(), "d2");
        assert_eq!(m.role(), Role::Knight);

        let m = resolve_move(&pos, "Nfd2").unwrap();
        assert_eq!(uci_string(&m), "f3d2");
    }

    #[test]
    fn test_resolve_castling_spellings() {
        let pos = position("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert_eq!(uci_string(&resolve_move(&pos, "O-O").unwrap()), "e1g1");
        assert_eq!(uci_string(&resolve_move(&pos, "0-0-0").unwrap()), "e1c1");
    }

    #[test]
    fn test_resolve_promotion_without_equals() {
        let pos = position("8/4P3/8/8/8/8/k7/4K3 w - - 0 1");
        assert_eq!(uci_string(&resolve_move(&pos, "e8=N").unwrap()), "e7e8n");
        assert_eq!(uci_string(&resolve_move(&pos, "e8Q").unwrap()), "e7e8q");
    }

    #[test]
    fn test_resolve_rejects_illegal() {
        let pos = Chess::default();
        assert!(resolve_move(&pos, "Ke2").is_err());
        assert!(resolve_move(&pos, "").is_err());
        assert!(resolve_move(&pos, "Zz9").is_err());
    }

    #[test]
    fn test_resolve_unicode_glyphs() {
        let pos = Chess::default();
        assert_eq!(uci_string(&resolve_move(&pos, "Nf3‼").unwrap()), "g1f3");
        assert_eq!(uci_string(&resolve_move(&pos, "e4⁉").unwrap()), "e2e4");
        assert!(resolve_move(&pos, "Nf3★").is_err());
        assert!(resolve_move(&pos, "…").is_err());
        assert!(resolve_move(&pos, "Ké4").is_err());
    }

    #[test]
    fn test_describe_castle() {
        let pos = position("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let m = resolve_move(&pos, "O-O").unwrap();
        let ply = PlyMove::describe(&pos, &m);
        assert_eq!(ply.san, "O-O");
        assert_eq!((ply.from.as_str(), ply.to.as_str()), ("e1", "g1"));
        assert_eq!(ply.promotion, None);
        assert_eq!(fen_of(&pos), "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    }

    #[test]
    fn test_pv_to_san_stops_on_illegal() {
        let pos = Chess::default();
        let pv: Vec<String> = ["e2e4", "e7e5", "g1f3", "a1a8"].iter().map(|s| s.to_string()).collect();
        assert_eq!(pv_to_san(&pos, &pv), vec!["e4", "e5", "Nf3"]);
    }
}
