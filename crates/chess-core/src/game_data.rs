use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// PGN tag pairs, keyed by tag name. Immutable once parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameHeaders {
    tags: BTreeMap<String, String>,
}

impl GameHeaders {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            tags: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Custom start position, only honoured when `SetUp` is "1".
    pub fn start_fen(&self) -> Option<&str> {
        match (self.get("SetUp"), self.get("FEN")) {
            (Some("1"), Some(fen)) if !fen.trim().is_empty() => Some(fen.trim()),
            _ => None,
        }
    }

    /// "White vs Black (1-0)" style title, skipping missing parts.
    pub fn title(&self) -> String {
        let mut parts = vec![self.get("Event").unwrap_or("Game").to_string()];
        if let (Some(w), Some(b)) = (self.get("White"), self.get("Black")) {
            parts.push(format!("{w} vs {b}"));
        }
        if let Some(result) = self.get("Result") {
            parts.push(format!("({result})"));
        }
        parts.join(" ")
    }

    pub(crate) fn insert(&mut self, name: String, value: String) {
        self.tags.insert(name, value);
    }
}

/// A tokenized game: headers plus SAN tokens, one per ply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub headers: GameHeaders,
    pub moves: Vec<String>,
}

impl Game {
    pub fn start_fen(&self) -> Option<&str> {
        self.headers.start_fen()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn label(self) -> &'static str {
        match self {
            Side::White => "White",
            Side::Black => "Black",
        }
    }
}

impl From<shakmaty::Color> for Side {
    fn from(color: shakmaty::Color) -> Self {
        match color {
            shakmaty::Color::White => Side::White,
            shakmaty::Color::Black => Side::Black,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_fen_requires_setup() {
        let fen = "8/8/8/8/8/8/4K3/4k3 w - - 0 1";
        let headers = GameHeaders::from_pairs([("FEN", fen)]);
        assert_eq!(headers.start_fen(), None);

        let headers = GameHeaders::from_pairs([("SetUp", "1"), ("FEN", fen)]);
        assert_eq!(headers.start_fen(), Some(fen));
    }

    #[test]
    fn test_title() {
        let headers = GameHeaders::from_pairs([
            ("Event", "Live Chess"),
            ("White", "alice"),
            ("Black", "bob"),
            ("Result", "1-0"),
        ]);
        assert_eq!(headers.title(), "Live Chess alice vs bob (1-0)");
        assert_eq!(GameHeaders::default().title(), "Game");
    }

    #[test]
    fn test_headers_serialize_as_map() {
        let headers = GameHeaders::from_pairs([("White", "alice")]);
        let json = serde_json::to_value(&headers).unwrap();
        assert_eq!(json, serde_json::json!({ "White": "alice" }));
    }
}
