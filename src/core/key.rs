use std::fmt;

use serde::{Deserialize, Serialize};
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, EnPassantMode};

/// Number of leading FEN fields that make up a key.
///
/// Placement, side to move, castling rights and en-passant square. The half-move clock and
/// full-move number are dropped: two move orders reaching the same board must share a key.
const KEY_FIELDS: usize = 4;

/// Canonical string identifying a board position independent of move order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionKey(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("invalid FEN {fen:?}: {reason}")]
    InvalidFen { fen: String, reason: String },
}

impl PositionKey {
    /// Encode a position. Total and deterministic.
    ///
    /// The en-passant square is only written when a legal en-passant capture exists, so a
    /// double pawn push that cannot be taken does not split the bucket.
    pub fn encode(pos: &Chess) -> Self {
        let fen = Fen::from_position(pos.clone(), EnPassantMode::Legal).to_string();
        Self::from_fen_fields(&fen)
    }

    /// Key of the standard starting position.
    pub fn starting() -> Self {
        Self::encode(&Chess::default())
    }

    /// Normalize an externally produced FEN (full or key-only) into a key.
    pub fn from_fen(text: &str) -> Result<Self, KeyError> {
        let invalid = |reason: String| KeyError::InvalidFen {
            fen: text.to_string(),
            reason,
        };
        let fen: Fen = text.trim().parse().map_err(|e| invalid(format!("{e}")))?;
        let pos: Chess = fen
            .into_position(CastlingMode::Standard)
            .map_err(|e| invalid(format!("{e}")))?;
        Ok(Self::encode(&pos))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_fen_fields(fen: &str) -> Self {
        Self(
            fen.split_whitespace()
                .take(KEY_FIELDS)
                .collect::<Vec<_>>()
                .join(" "),
        )
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
