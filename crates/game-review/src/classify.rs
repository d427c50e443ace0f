//! Move quality classification. Pure functions only.
//!
//! A move's tag comes from an ordered decision table: the first rule whose
//! predicate holds wins. The last rule always holds, so every move gets
//! exactly one tag.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::score::{EvaluationLine, SCORE_CAP};

/// Maximum centipawn loss charged for a single move
pub const LOSS_CAP: i32 = 1000;

/// Book window: plies and evaluation band
const BOOK_MAX_PLY: usize = 10;
const BOOK_MAX_SCORE: i32 = 30;

/// Great move: only move that keeps a large edge over the runner-up
const GREAT_MAX_LOSS: i32 = 20;
const GREAT_MIN_BEST_GAP: i32 = 120;
const GREAT_MAX_PLAYED_GAP: i32 = 20;

/// Miss: a large gain was available but not taken
const MISS_MAX_LOSS: i32 = 35;
const MISS_MIN_GAIN_GAP: i32 = 150;

/// Ladder thresholds (centipawn loss)
const THRESHOLD_BLUNDER: i32 = 300;
const THRESHOLD_MISTAKE: i32 = 150;
const THRESHOLD_INACCURACY: i32 = 75;
const THRESHOLD_BEST: i32 = 10;
const THRESHOLD_EXCELLENT: i32 = 30;

/// Quality tag of a single move. Declaration order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveTag {
    Best,
    Excellent,
    Great,
    Good,
    Book,
    Miss,
    Inaccuracy,
    Mistake,
    Blunder,
}

impl MoveTag {
    pub const ALL: [MoveTag; 9] = [
        MoveTag::Best,
        MoveTag::Excellent,
        MoveTag::Great,
        MoveTag::Good,
        MoveTag::Book,
        MoveTag::Miss,
        MoveTag::Inaccuracy,
        MoveTag::Mistake,
        MoveTag::Blunder,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MoveTag::Best => "best",
            MoveTag::Excellent => "excellent",
            MoveTag::Great => "great",
            MoveTag::Good => "good",
            MoveTag::Book => "book",
            MoveTag::Miss => "miss",
            MoveTag::Inaccuracy => "inaccuracy",
            MoveTag::Mistake => "mistake",
            MoveTag::Blunder => "blunder",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MoveTag::Best => "Best",
            MoveTag::Excellent => "Excellent",
            MoveTag::Great => "Great",
            MoveTag::Good => "Good",
            MoveTag::Book => "Book",
            MoveTag::Miss => "Miss",
            MoveTag::Inaccuracy => "Inaccuracy",
            MoveTag::Mistake => "Mistake",
            MoveTag::Blunder => "Blunder",
        }
    }
}

impl fmt::Display for MoveTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Tunable parts of the decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierPolicy {
    /// Last ply index eligible for the book tag; 0 disables it.
    pub book_max_ply: usize,
}

impl Default for ClassifierPolicy {
    fn default() -> Self {
        Self {
            book_max_ply: BOOK_MAX_PLY,
        }
    }
}

/// Inputs of one classification, all in clamped centipawns from the mover's
/// point of view.
#[derive(Debug, Clone)]
pub struct MoveContext {
    pub ply_index: usize,
    pub pre: i32,
    pub post: i32,
    pub loss: i32,
    /// Candidate line scores in rank order
    pub line_scores: Vec<i32>,
}

impl MoveContext {
    pub fn new(ply_index: usize, pre: i32, post: i32, lines: &[EvaluationLine]) -> Self {
        let pre = pre.clamp(-SCORE_CAP, SCORE_CAP);
        let post = post.clamp(-SCORE_CAP, SCORE_CAP);
        let mut ranked: Vec<&EvaluationLine> = lines.iter().collect();
        ranked.sort_by_key(|l| l.rank);
        Self {
            ply_index,
            pre,
            post,
            loss: loss(pre, post),
            line_scores: ranked.iter().map(|l| l.score.clamped_cp()).collect(),
        }
    }

    /// Scores of the two best lines, when at least two exist.
    fn top_two(&self) -> Option<(i32, i32)> {
        match self.line_scores.as_slice() {
            [first, second, ..] => Some((*first, *second)),
            _ => None,
        }
    }
}

struct Rule {
    tag: MoveTag,
    applies: fn(&MoveContext, &ClassifierPolicy) -> bool,
}

/// First match wins.
const RULES: [Rule; 9] = [
    Rule { tag: MoveTag::Book, applies: is_book },
    Rule { tag: MoveTag::Great, applies: is_great },
    Rule { tag: MoveTag::Miss, applies: is_miss },
    Rule { tag: MoveTag::Blunder, applies: |c, _| c.loss >= THRESHOLD_BLUNDER },
    Rule { tag: MoveTag::Mistake, applies: |c, _| c.loss >= THRESHOLD_MISTAKE },
    Rule { tag: MoveTag::Inaccuracy, applies: |c, _| c.loss >= THRESHOLD_INACCURACY },
    Rule { tag: MoveTag::Best, applies: |c, _| c.loss <= THRESHOLD_BEST },
    Rule { tag: MoveTag::Excellent, applies: |c, _| c.loss <= THRESHOLD_EXCELLENT },
    Rule { tag: MoveTag::Good, applies: |_, _| true },
];

fn is_book(c: &MoveContext, policy: &ClassifierPolicy) -> bool {
    c.ply_index <= policy.book_max_ply
        && c.pre.abs() <= BOOK_MAX_SCORE
        && c.post.abs() <= BOOK_MAX_SCORE
}

fn is_great(c: &MoveContext, _: &ClassifierPolicy) -> bool {
    let Some((line1, line2)) = c.top_two() else {
        return false;
    };
    let best_gap = line1 - line2;
    let played_gap = (c.post - line1).abs();
    c.loss <= GREAT_MAX_LOSS && best_gap >= GREAT_MIN_BEST_GAP && played_gap <= GREAT_MAX_PLAYED_GAP
}

fn is_miss(c: &MoveContext, _: &ClassifierPolicy) -> bool {
    let Some((line1, _)) = c.top_two() else {
        return false;
    };
    let best_gain = line1 - c.pre;
    let played_gain = c.post - c.pre;
    c.loss <= MISS_MAX_LOSS && best_gain - played_gain >= MISS_MIN_GAIN_GAP
}

/// Centipawns lost by a move, never negative and capped.
pub fn loss(pre: i32, post: i32) -> i32 {
    (pre - post).clamp(0, LOSS_CAP)
}

/// Tag a move using the default policy.
pub fn classify(ply_index: usize, pre: i32, post: i32, lines: &[EvaluationLine]) -> MoveTag {
    classify_with(&ClassifierPolicy::default(), ply_index, pre, post, lines)
}

pub fn classify_with(
    policy: &ClassifierPolicy,
    ply_index: usize,
    pre: i32,
    post: i32,
    lines: &[EvaluationLine],
) -> MoveTag {
    classify_context(policy, &MoveContext::new(ply_index, pre, post, lines))
}

pub fn classify_context(policy: &ClassifierPolicy, context: &MoveContext) -> MoveTag {
    RULES
        .iter()
        .find(|rule| (rule.applies)(context, policy))
        .map_or(MoveTag::Good, |rule| rule.tag)
}
