//! Explorer session: walks a live board and suggests the next known move.
//!
//! The session owns its move history as an explicit stack, so undo does not depend on the
//! rules engine keeping one. Every transition ends in [`ExplorerSession::refresh`], which
//! re-queries the lookup at the current position and re-derives the suggestion:
//!
//! - the candidate of the preferred line, if one is set and present,
//! - otherwise the first candidate in index order,
//! - otherwise nothing.

use std::sync::Arc;

use crate::core::PositionKey;
use crate::index::{LineDetails, PositionIndex};
use crate::record::{LineId, MoveRecord};
use crate::rules::RulesEngine;

/// Anything that can answer "which moves are known from this position".
pub trait MoveLookup {
    fn moves_at(&self, key: &PositionKey) -> Vec<MoveRecord>;
}

impl MoveLookup for PositionIndex {
    fn moves_at(&self, key: &PositionKey) -> Vec<MoveRecord> {
        PositionIndex::moves_at(self, key).to_vec()
    }
}

impl MoveLookup for LineDetails {
    fn moves_at(&self, key: &PositionKey) -> Vec<MoveRecord> {
        self.get(key).cloned().unwrap_or_default()
    }
}

impl<T: MoveLookup + ?Sized> MoveLookup for &T {
    fn moves_at(&self, key: &PositionKey) -> Vec<MoveRecord> {
        (**self).moves_at(key)
    }
}

impl<T: MoveLookup + ?Sized> MoveLookup for Arc<T> {
    fn moves_at(&self, key: &PositionKey) -> Vec<MoveRecord> {
        (**self).moves_at(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExplorerError {
    #[error("illegal move {0:?}")]
    IllegalMove(String),
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("no candidate #{0} at this position")]
    UnknownCandidate(usize),
}

#[derive(Debug, Clone)]
struct Ply<B> {
    notation: String,
    before: B,
}

/// Replay of one preloaded line (see [`crate::library::TrapLibrary::line_session`]).
pub type LineReplay<R> = ExplorerSession<R, LineDetails>;

#[derive(Debug)]
pub struct ExplorerSession<R: RulesEngine, L> {
    rules: R,
    lookup: L,
    board: R::Board,
    history: Vec<Ply<R::Board>>,
    current: PositionKey,
    preferred: Option<LineId>,
    candidates: Vec<MoveRecord>,
    suggested: Option<String>,
}

impl<R: RulesEngine, L: MoveLookup> ExplorerSession<R, L> {
    /// Start at the standard starting position with no preferred line.
    pub fn new(rules: R, lookup: L) -> Self {
        let board = rules.starting_position();
        let current = rules.position_key(&board);
        let mut session = Self {
            rules,
            lookup,
            board,
            history: Vec::new(),
            current,
            preferred: None,
            candidates: Vec::new(),
            suggested: None,
        };
        session.refresh();
        session
    }

    pub fn board(&self) -> &R::Board {
        &self.board
    }

    pub fn current_key(&self) -> &PositionKey {
        &self.current
    }

    pub fn candidates(&self) -> &[MoveRecord] {
        &self.candidates
    }

    pub fn suggested_move(&self) -> Option<&str> {
        self.suggested.as_deref()
    }

    pub fn preferred_line(&self) -> Option<&LineId> {
        self.preferred.as_ref()
    }

    /// Moves played so far, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &str> + '_ {
        self.history.iter().map(|p| p.notation.as_str())
    }

    pub fn ply_count(&self) -> usize {
        self.history.len()
    }

    /// Play a move of the user's own. Leaves any preferred line.
    ///
    /// Returns the move in canonical notation. An illegal move leaves the session unchanged.
    pub fn play(&mut self, notation: &str) -> Result<String, ExplorerError> {
        let played = self.apply(notation)?;
        self.preferred = None;
        self.refresh();
        Ok(played)
    }

    /// Follow candidate `idx`: its line becomes the preferred line and its move is played.
    pub fn select(&mut self, idx: usize) -> Result<String, ExplorerError> {
        let candidate = self
            .candidates
            .get(idx)
            .cloned()
            .ok_or(ExplorerError::UnknownCandidate(idx))?;
        let played = self.apply(&candidate.mv)?;
        self.preferred = Some(candidate.line_id());
        self.refresh();
        Ok(played)
    }

    /// Play the suggested move, if any. `Ok(None)` when there is nothing to play.
    pub fn auto_advance(&mut self) -> Result<Option<String>, ExplorerError> {
        let Some(mv) = self.suggested.clone() else {
            return Ok(None);
        };
        let played = self.apply(&mv)?;
        self.refresh();
        Ok(Some(played))
    }

    /// Take back the last move. Leaves any preferred line.
    pub fn undo(&mut self) -> Result<String, ExplorerError> {
        let ply = self.history.pop().ok_or(ExplorerError::NothingToUndo)?;
        self.board = ply.before;
        self.preferred = None;
        self.refresh();
        Ok(ply.notation)
    }

    /// Back to the starting position, no preferred line.
    pub fn reset(&mut self) {
        self.board = self.rules.starting_position();
        self.history.clear();
        self.preferred = None;
        self.refresh();
    }

    /// Re-query the lookup at the current position and re-derive the suggestion.
    ///
    /// Called by every transition; call it directly after the underlying data changed.
    pub fn refresh(&mut self) {
        self.current = self.rules.position_key(&self.board);
        self.candidates = self.lookup.moves_at(&self.current);

        let preferred = self
            .preferred
            .as_ref()
            .and_then(|line| self.candidates.iter().find(|c| c.belongs_to(line)));
        self.suggested = preferred
            .or_else(|| self.candidates.first())
            .map(|c| c.mv.clone());
    }

    fn apply(&mut self, notation: &str) -> Result<String, ExplorerError> {
        let applied = self
            .rules
            .apply_move(&self.board, notation)
            .map_err(|e| ExplorerError::IllegalMove(e.notation))?;
        let before = std::mem::replace(&mut self.board, applied.board);
        self.history.push(Ply {
            notation: applied.notation.clone(),
            before,
        });
        Ok(applied.notation)
    }
}
