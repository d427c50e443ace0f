//! Move list rows and plain-text report of an analysis.

use std::fmt::Write;

use chess_core::pgn::move_counters;
use chess_core::Side;
use serde::Serialize;

use crate::classify::MoveTag;
use crate::pipeline::GameAnalysis;
use crate::record::PlyRecord;
use crate::summary::SideSummary;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowEntry {
    pub ply_index: usize,
    pub san: String,
    pub tag: MoveTag,
    pub loss: i32,
}

impl From<&PlyRecord> for RowEntry {
    fn from(record: &PlyRecord) -> Self {
        Self {
            ply_index: record.ply_index,
            san: record.san.clone(),
            tag: record.tag,
            loss: record.loss,
        }
    }
}

/// One full move: `12. Nf3 Nc6`. A game starting with Black has an empty
/// white half in its first row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveRow {
    pub number: u32,
    pub white: Option<RowEntry>,
    pub black: Option<RowEntry>,
}

/// Pair records into full-move rows, numbering from `first_move_number`.
pub fn move_rows(records: &[PlyRecord], first_move_number: u32) -> Vec<MoveRow> {
    let mut rows: Vec<MoveRow> = Vec::with_capacity(records.len() / 2 + 1);
    let mut number = first_move_number;

    for record in records {
        let entry = RowEntry::from(record);
        match record.side_to_move {
            Side::White => {
                rows.push(MoveRow {
                    number,
                    white: Some(entry),
                    black: None,
                });
            }
            Side::Black => {
                let open_row = rows
                    .last_mut()
                    .filter(|row| row.white.is_some() && row.black.is_none());
                match open_row {
                    Some(row) => row.black = Some(entry),
                    None => rows.push(MoveRow {
                        number,
                        white: None,
                        black: Some(entry),
                    }),
                }
                number += 1;
            }
        }
    }
    rows
}

/// Rows for an analysis, numbered from its start position.
pub fn analysis_rows(analysis: &GameAnalysis) -> Vec<MoveRow> {
    let first = analysis
        .start_fen
        .as_deref()
        .map_or(1, |fen| move_counters(fen).0);
    move_rows(&analysis.records, first)
}

fn write_side(out: &mut String, name: &str, summary: &SideSummary) {
    let _ = writeln!(
        out,
        "{name}: accuracy {}%, average loss {} over {} moves",
        summary.accuracy_percent,
        summary.rounded_average_loss(),
        summary.move_count
    );
    let counts: Vec<String> = summary
        .tag_histogram
        .iter()
        .map(|(tag, count)| format!("{} {count}", tag.as_str()))
        .collect();
    if !counts.is_empty() {
        let _ = writeln!(out, "  {}", counts.join(", "));
    }
}

fn cell(entry: Option<&RowEntry>) -> String {
    match entry {
        Some(e) => format!("{} ({}, -{})", e.san, e.tag.as_str(), e.loss),
        None => "...".to_string(),
    }
}

/// Human-readable report: headline, per-side summaries, then the move list.
pub fn render_text(analysis: &GameAnalysis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", analysis.headers.title());
    if let Some(e) = &analysis.halted {
        let _ = writeln!(
            out,
            "Analysis stopped after {} of {} plies: {e}",
            analysis.records.len(),
            analysis.total_plies
        );
    }
    out.push('\n');

    let white_name = analysis.headers.get("White").unwrap_or(Side::White.label());
    let black_name = analysis.headers.get("Black").unwrap_or(Side::Black.label());
    write_side(&mut out, white_name, analysis.summary(Side::White));
    write_side(&mut out, black_name, analysis.summary(Side::Black));
    out.push('\n');

    for row in analysis_rows(analysis) {
        let black = row
            .black
            .as_ref()
            .map(|e| cell(Some(e)))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{:>3}. {:<28} {}",
            row.number,
            cell(row.white.as_ref()),
            black
        );
    }
    out
}
