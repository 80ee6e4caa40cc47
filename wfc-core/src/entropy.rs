//! Entropy calculation logic and traits.

use crate::grid::{CellGrid, EntropyGrid};
use crate::position::Position;
use std::fmt::Debug;

/// Rayon-backed entropy calculator.
pub mod cpu;
pub use cpu::CpuEntropyCalculator;

/// Chooses the next cell to collapse.
pub trait EntropyCalculator: Send + Sync + Debug {
    /// Entropy of every cell; collapsed cells map to `None`.
    #[must_use]
    fn calculate_entropy(&self, grid: &CellGrid) -> EntropyGrid;

    /// The uncollapsed cell with the lowest entropy, or `None` if every cell
    /// is collapsed. Ties go to the cell that comes first in row-major order.
    #[must_use]
    fn select_lowest_entropy_cell(&self, entropy_grid: &EntropyGrid) -> Option<Position>;

    /// Convenience for `calculate_entropy` followed by `select_lowest_entropy_cell`.
    #[must_use]
    fn find_lowest_entropy(&self, grid: &CellGrid) -> Option<Position> {
        self.select_lowest_entropy_cell(&self.calculate_entropy(grid))
    }
}
