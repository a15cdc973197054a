//! Line importer: turns a raw batch of games into staged lines.
//!
//! Staging is pure. Every segment is parsed and replayed before anything is written, so a
//! batch either commits completely or not at all (see [`crate::library::TrapLibrary::import_batch`]).

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::core::{PositionKey, Side};
use crate::pgn::{parse_games, split_batch, PgnError};
use crate::rules::RulesEngine;
use crate::store::StagedLine;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImportError {
    #[error("line name must not be empty")]
    MissingLineName,
    #[error("unknown source {0:?}")]
    UnknownSource(String),
    #[error("malformed input in PGN #{}: {reason}", .segment + 1)]
    MalformedInput { segment: usize, reason: PgnError },
    #[error("no valid PGN data found in input")]
    EmptyBatch,
    #[error("invalid move {notation:?} in PGN #{}", .segment + 1)]
    IllegalMove { notation: String, segment: usize },
}

/// A write request as it arrives from a caller: the source is still an unchecked tag.
#[derive(Debug, Clone, Copy)]
pub struct ImportRequest<'a> {
    pub line_name: &'a str,
    pub intended_side: Side,
    pub source: &'a str,
    pub pgn: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub segments_saved: usize,
    pub records_written: usize,
    pub records_replaced: usize,
    pub line_names: Vec<String>,
    pub message: String,
}

impl ImportReport {
    pub(crate) fn new(base: &str, lines: &[StagedLine], replaced: usize) -> Self {
        let segments_saved = lines.len();
        let message = if segments_saved > 1 {
            format!("Batch of {segments_saved} variations for '{base}' saved successfully.")
        } else {
            format!("Trap '{base}' saved successfully.")
        };
        Self {
            segments_saved,
            records_written: lines.iter().map(|l| l.plies.len()).sum(),
            records_replaced: replaced,
            line_names: lines.iter().map(|l| l.name.clone()).collect(),
            message,
        }
    }
}

/// Name stored for segment `index` of a batch of `batch_len` segments.
///
/// A single segment keeps the base name; siblings get a 1-based suffix.
pub fn effective_line_name(base: &str, index: usize, batch_len: usize) -> String {
    if batch_len == 1 {
        base.to_string()
    } else {
        format!("{base} {}", index + 1)
    }
}

/// Line name for a game file: `vienna-gambit-trap.pgn` becomes `Vienna Gambit Trap`.
pub fn line_name_from_file_stem(stem: &str) -> String {
    let mut out = String::with_capacity(stem.len());
    let mut at_word_start = true;
    for c in stem.chars() {
        let c = if c == '-' { ' ' } else { c };
        let word_char = c.is_alphanumeric() || c == '_';
        if word_char && at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !word_char;
    }
    out
}

/// Parse and replay every segment of `raw`.
///
/// Fails on the first segment that does not parse or contains a move the rules engine
/// rejects; nothing is returned for any segment in that case.
pub fn stage_batch<R: RulesEngine>(
    rules: &R,
    base_name: &str,
    side: Side,
    raw: &str,
) -> Result<Vec<StagedLine>, ImportError> {
    let base = base_name.trim();
    if base.is_empty() {
        return Err(ImportError::MissingLineName);
    }

    let segments = split_batch(raw);
    if segments.is_empty() {
        return Err(ImportError::EmptyBatch);
    }

    let n = segments.len();
    segments
        .iter()
        .enumerate()
        .map(|(i, seg)| {
            let games = parse_games(seg).map_err(|reason| ImportError::MalformedInput {
                segment: i,
                reason,
            })?;
            let plies = replay_segment(rules, &games, i)?;
            Ok(StagedLine {
                name: effective_line_name(base, i, n),
                intended_side: side,
                plies,
            })
        })
        .collect()
}

/// Replay every game of one segment from the starting position.
///
/// A `(position, move)` pair reached twice (repetitions, or two games sharing a prefix) is
/// recorded once.
fn replay_segment<R: RulesEngine>(
    rules: &R,
    games: &[Vec<String>],
    segment: usize,
) -> Result<Vec<(PositionKey, String)>, ImportError> {
    let mut seen: FxHashSet<(PositionKey, String)> = FxHashSet::default();
    let mut plies = Vec::new();
    for game in games {
        let mut board = rules.starting_position();
        for notation in game {
            let key = rules.position_key(&board);
            let applied =
                rules
                    .apply_move(&board, notation)
                    .map_err(|e| ImportError::IllegalMove {
                        notation: e.notation,
                        segment,
                    })?;
            board = applied.board;
            if seen.insert((key.clone(), applied.notation.clone())) {
                plies.push((key, applied.notation));
            }
        }
    }
    Ok(plies)
}
