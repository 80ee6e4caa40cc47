//! Per-position possibility state.

use crate::position::Position;
use bitvec::prelude::*;
use rand::Rng;
use thiserror::Error;
use wfc_rules::TileId;

/// Errors raised by a single cell.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CellError {
    /// The cell has no candidate tiles left.
    #[error("Contradiction at {0}: no possible tiles remain")]
    Contradiction(Position),
}

/// Either the set of still-possible tiles or the committed tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellState {
    /// Candidate tiles, one bit per tile of the alphabet.
    /// An empty set is a contradiction.
    Undetermined(BitVec),
    /// Committed to a single tile.
    Collapsed(TileId),
}

/// One grid position and its possibility state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    position: Position,
    state: CellState,
}

impl Cell {
    /// Creates a cell; a singleton `possibilities` set is committed immediately.
    pub fn new(position: Position, possibilities: BitVec) -> Self {
        let state = match single_tile(&possibilities) {
            Some(tile) => CellState::Collapsed(tile),
            None => CellState::Undetermined(possibilities),
        };
        Self { position, state }
    }

    /// Grid position of the cell.
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Current possibility state.
    pub const fn state(&self) -> &CellState {
        &self.state
    }

    /// True once a tile has been committed.
    pub const fn is_collapsed(&self) -> bool {
        matches!(self.state, CellState::Collapsed(_))
    }

    /// The committed tile, if collapsed.
    pub const fn value(&self) -> Option<TileId> {
        match self.state {
            CellState::Collapsed(tile) => Some(tile),
            CellState::Undetermined(_) => None,
        }
    }

    /// Remaining candidates, if not yet collapsed.
    pub fn possibilities(&self) -> Option<&BitSlice> {
        match &self.state {
            CellState::Undetermined(set) => Some(set.as_bitslice()),
            CellState::Collapsed(_) => None,
        }
    }

    /// Number of candidates while undetermined, `0` once collapsed.
    ///
    /// Only meaningful as a comparison key.
    pub fn entropy(&self) -> usize {
        self.possibilities().map_or(0, BitSlice::count_ones)
    }

    /// True for an undetermined cell with no candidates left.
    pub fn is_contradiction(&self) -> bool {
        self.possibilities().is_some_and(BitSlice::not_any)
    }

    /// Commits the cell to one of its candidates, chosen uniformly at random.
    ///
    /// Does nothing if the cell is already collapsed. A single remaining
    /// candidate is committed without drawing from `rng`.
    ///
    /// # Errors
    ///
    /// Returns `CellError::Contradiction` if no candidates remain.
    pub fn collapse<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<TileId, CellError> {
        let set = match &self.state {
            CellState::Collapsed(tile) => return Ok(*tile),
            CellState::Undetermined(set) => set,
        };

        let count = set.count_ones();
        let chosen = match count {
            0 => return Err(CellError::Contradiction(self.position)),
            1 => set.first_one(),
            _ => set.iter_ones().nth(rng.gen_range(0..count)),
        }
        .ok_or(CellError::Contradiction(self.position))?;

        self.state = CellState::Collapsed(TileId(chosen));
        Ok(TileId(chosen))
    }

    /// Replaces the candidate set.
    ///
    /// A singleton set commits the cell immediately. Collapsed cells are left
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns `CellError::Contradiction` if `possibilities` is empty. The
    /// empty set is still stored so the grid reflects the contradiction.
    pub fn set_possibilities(&mut self, possibilities: BitVec) -> Result<(), CellError> {
        if self.is_collapsed() {
            return Ok(());
        }
        if possibilities.not_any() {
            self.state = CellState::Undetermined(possibilities);
            return Err(CellError::Contradiction(self.position));
        }
        self.state = match single_tile(&possibilities) {
            Some(tile) => CellState::Collapsed(tile),
            None => CellState::Undetermined(possibilities),
        };
        Ok(())
    }
}

fn single_tile(set: &BitSlice) -> Option<TileId> {
    if set.count_ones() == 1 {
        set.first_one().map(TileId)
    } else {
        None
    }
}
