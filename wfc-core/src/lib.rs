//! Core library for the 2D Wave Function Collapse algorithm.
//! Defines cells, the grid engine and the run loop.

use std::time::Duration;
use thiserror::Error;
use wfc_rules::TileSetError;

/// Per-position possibility state.
pub mod cell;
/// The grid engine: owns the cells, selects, collapses and propagates.
pub mod engine;
/// Entropy calculation logic and traits.
pub mod entropy;
/// Generic 2D grid storage.
pub mod grid;
/// Grid coordinates and neighbor arithmetic.
pub mod position;
/// Constraint propagation logic and traits.
pub mod propagator;
/// The WFC run loop.
pub mod runner;

pub use crate::cell::{Cell, CellError, CellState};
pub use crate::engine::{GridStatus, StepOutcome, WfcEngine};
pub use crate::entropy::{CpuEntropyCalculator, EntropyCalculator};
pub use crate::grid::{CellGrid, EntropyGrid, Grid};
pub use crate::position::Position;
pub use crate::propagator::{
    ConstraintPropagator, CpuConstraintPropagator, PropagationError, PropagationMode,
};
pub use crate::runner::{run, ProgressCallback, RunStats, WfcConfig};
pub use wfc_rules::{AdjacencyRules, Direction, TileId, TileLabel, TileRule, TileSet};

/// Errors that can occur during the Wave Function Collapse algorithm.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WfcError {
    /// A cell was left with no possible tiles.
    #[error("Contradiction found at {0}")]
    Contradiction(Position),
    /// An error occurred during the constraint propagation phase.
    #[error("Propagation error: {0}")]
    PropagationError(PropagationError),
    /// An error related to grid dimensions or accessing grid data.
    #[error("Grid error: {0}")]
    GridError(String),
    /// An error related to invalid configuration (grid size, rule table).
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    /// An error occurred validating the TileSet or rule table.
    #[error("TileSet configuration error: {0}")]
    TileSetError(#[from] TileSetError),
    /// WFC exceeded the configured maximum number of iterations.
    #[error("Maximum iterations ({0}) reached")]
    MaxIterationsReached(u64),
    /// The progress callback asked the run to stop.
    #[error("Progress callback failed: {0}")]
    Callback(String),
}

impl From<PropagationError> for WfcError {
    fn from(error: PropagationError) -> Self {
        match error {
            PropagationError::Contradiction(position) => Self::Contradiction(position),
            other => Self::PropagationError(other),
        }
    }
}

impl From<CellError> for WfcError {
    fn from(error: CellError) -> Self {
        match error {
            CellError::Contradiction(position) => Self::Contradiction(position),
        }
    }
}

/// Information about the current state of the WFC algorithm execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressInfo {
    /// The total number of cells that have been collapsed.
    pub collapsed_cells: usize,
    /// The total number of cells in the grid.
    pub total_cells: usize,
    /// Time elapsed since the WFC run started.
    pub elapsed_time: Duration,
    /// The number of iterations completed so far.
    pub iterations: u64,
}

impl ProgressInfo {
    /// Collapsed share of the grid in percent.
    pub fn percentage(&self) -> f32 {
        if self.total_cells == 0 {
            100.0
        } else {
            (self.collapsed_cells as f32 / self.total_cells as f32) * 100.0
        }
    }
}
