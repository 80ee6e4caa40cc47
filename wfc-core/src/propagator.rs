//! Constraint propagation logic and traits.

use crate::cell::CellError;
use crate::grid::CellGrid;
use crate::position::Position;
use std::fmt::Debug;
use thiserror::Error;
use wfc_rules::AdjacencyRules;

/// CPU propagator and propagation modes.
pub mod cpu;
pub use cpu::{CpuConstraintPropagator, PropagationMode};

/// Errors that can occur during the constraint propagation phase of WFC.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PropagationError {
    /// Indicates that a cell's possibility set became empty during propagation,
    /// meaning no tile can satisfy the constraints at this location.
    #[error("Contradiction detected during propagation at {0}")]
    Contradiction(Position),
    /// Propagation was started from a cell that has not been collapsed.
    #[error("Cannot propagate from uncollapsed cell at {0}")]
    SourceNotCollapsed(Position),
    /// The source position is not part of the grid.
    #[error("Propagation source {0} is outside the grid")]
    SourceOutOfBounds(Position),
    /// The rule table has no entry for a tile id found in the grid.
    #[error("Internal propagation error: {0}")]
    InternalError(String),
}

impl From<CellError> for PropagationError {
    fn from(error: CellError) -> Self {
        match error {
            CellError::Contradiction(position) => Self::Contradiction(position),
        }
    }
}

/// Trait defining the interface for a constraint propagation algorithm.
///
/// Implementors update the neighbors of a freshly collapsed cell according
/// to the `AdjacencyRules`.
pub trait ConstraintPropagator: Send + Sync + Debug {
    /// Propagates the constraint of the collapsed cell at `source`.
    ///
    /// # Returns
    ///
    /// * `Ok(positions)` with every cell that auto-collapsed as a result.
    /// * `Err(PropagationError)` if a contradiction is found or the source is invalid.
    fn propagate(
        &mut self,
        grid: &mut CellGrid,
        source: Position,
        rules: &AdjacencyRules,
    ) -> Result<Vec<Position>, PropagationError>;
}
