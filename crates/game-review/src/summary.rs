//! Per-side summary statistics over analyzed plies.

use std::collections::BTreeMap;

use chess_core::Side;
use serde::{Deserialize, Serialize};

use crate::classify::MoveTag;
use crate::record::PlyRecord;

/// Accuracy points lost per centipawn of average loss
const ACCURACY_SLOPE: f64 = 0.22;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideSummary {
    pub move_count: u32,
    pub average_loss: f64,
    pub accuracy_percent: u32,
    /// Tags seen at least once, in display order
    pub tag_histogram: BTreeMap<MoveTag, u32>,
}

impl SideSummary {
    pub fn count(&self, tag: MoveTag) -> u32 {
        self.tag_histogram.get(&tag).copied().unwrap_or(0)
    }

    /// Average loss rounded for display.
    pub fn rounded_average_loss(&self) -> i64 {
        self.average_loss.round() as i64
    }
}

/// Both sides of one game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summaries {
    pub white: SideSummary,
    pub black: SideSummary,
}

impl Summaries {
    pub fn from_records(records: &[PlyRecord]) -> Self {
        Self {
            white: summarize_side(records, Side::White),
            black: summarize_side(records, Side::Black),
        }
    }

    pub fn side(&self, side: Side) -> &SideSummary {
        match side {
            Side::White => &self.white,
            Side::Black => &self.black,
        }
    }
}

/// `clamp(round(100 - 0.22 * average_loss), 0, 100)`
pub fn accuracy_percent(average_loss: f64) -> u32 {
    (100.0 - ACCURACY_SLOPE * average_loss).round().clamp(0.0, 100.0) as u32
}

/// Summary of the given records, which should all belong to one side.
pub fn summarize<'a, I>(records: I) -> SideSummary
where
    I: IntoIterator<Item = &'a PlyRecord>,
{
    let mut move_count = 0u32;
    let mut total_loss = 0i64;
    let mut tag_histogram = BTreeMap::new();

    for record in records {
        move_count += 1;
        total_loss += i64::from(record.loss);
        *tag_histogram.entry(record.tag).or_insert(0) += 1;
    }

    let average_loss = if move_count == 0 {
        0.0
    } else {
        total_loss as f64 / f64::from(move_count)
    };

    SideSummary {
        move_count,
        average_loss,
        accuracy_percent: accuracy_percent(average_loss),
        tag_histogram,
    }
}

pub fn summarize_side(records: &[PlyRecord], side: Side) -> SideSummary {
    summarize(records.iter().filter(|r| r.side_to_move == side))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::fixtures::record;

    #[test]
    fn test_accuracy_percent() {
        assert_eq!(accuracy_percent(0.0), 100);
        assert_eq!(accuracy_percent(10.0), 98);
        assert_eq!(accuracy_percent(100.0), 78);
        assert_eq!(accuracy_percent(454.0), 0);
        assert_eq!(accuracy_percent(1000.0), 0);
    }

    #[test]
    fn test_accuracy_monotone() {
        let mut previous = accuracy_percent(0.0);
        for loss in 1..=1000 {
            let current = accuracy_percent(f64::from(loss));
            assert!(current <= previous, "accuracy rose at loss {loss}");
            previous = current;
        }
        assert_eq!(previous, 0);
    }

    #[test]
    fn test_empty_side() {
        let summary = summarize(std::iter::empty());
        assert_eq!(summary.move_count, 0);
        assert_eq!(summary.average_loss, 0.0);
        assert_eq!(summary.accuracy_percent, 100);
        assert!(summary.tag_histogram.is_empty());
    }

    #[test]
    fn test_summarize_by_side() {
        let records = vec![
            record(1, 0, MoveTag::Book),
            record(2, 5, MoveTag::Book),
            record(3, 320, MoveTag::Blunder),
            record(4, 0, MoveTag::Best),
            record(5, 160, MoveTag::Mistake),
        ];
        let summaries = Summaries::from_records(&records);

        assert_eq!(summaries.white.move_count, 3);
        assert_eq!(summaries.white.average_loss, 160.0);
        assert_eq!(summaries.white.accuracy_percent, 65);
        assert_eq!(summaries.white.count(MoveTag::Blunder), 1);
        assert_eq!(summaries.white.count(MoveTag::Best), 0);
        assert!(!summaries.white.tag_histogram.contains_key(&MoveTag::Best));

        assert_eq!(summaries.black.move_count, 2);
        assert_eq!(summaries.black.rounded_average_loss(), 3);
        assert_eq!(summaries.side(Side::Black).accuracy_percent, 99);
    }
}
