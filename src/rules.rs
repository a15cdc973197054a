//! Seam to the chess rules engine.
//!
//! Nothing outside this module interprets move notation; importers and explorers only ask
//! the engine to apply a move and to key the resulting board.

use std::fmt;

use shakmaty::san::SanPlus;
use shakmaty::Chess;

use crate::core::PositionKey;

/// A move the rules engine rejected (unparseable or illegal in the position).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("illegal move {notation:?}")]
pub struct IllegalMove {
    pub notation: String,
}

/// Result of a successfully applied move.
#[derive(Debug, Clone)]
pub struct Applied<B> {
    pub board: B,
    /// The move in the engine's canonical notation.
    pub notation: String,
}

pub trait RulesEngine {
    type Board: Clone + fmt::Debug;

    fn starting_position(&self) -> Self::Board;

    fn apply_move(&self, board: &Self::Board, notation: &str)
        -> Result<Applied<Self::Board>, IllegalMove>;

    fn position_key(&self, board: &Self::Board) -> PositionKey;
}

/// Standard chess rules, SAN notation.
///
/// Accepted input is any SAN the engine can resolve (`Ng1f3`, `e8=Q+`, `O-O`); the canonical
/// output is minimal SAN with check / mate suffix.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardChess;

impl RulesEngine for StandardChess {
    type Board = Chess;

    fn starting_position(&self) -> Chess {
        Chess::default()
    }

    fn apply_move(&self, board: &Chess, notation: &str) -> Result<Applied<Chess>, IllegalMove> {
        let illegal = || IllegalMove {
            notation: notation.to_string(),
        };
        let san: SanPlus = notation.trim().parse().map_err(|_| illegal())?;
        let mv = san.san.to_move(board).map_err(|_| illegal())?;

        let mut next = board.clone();
        let canonical = SanPlus::from_move_and_play_unchecked(&mut next, &mv);
        Ok(Applied {
            board: next,
            notation: canonical.to_string(),
        })
    }

    fn position_key(&self, board: &Chess) -> PositionKey {
        PositionKey::encode(board)
    }
}
