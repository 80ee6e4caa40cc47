use crate::entropy::EntropyCalculator;
use crate::grid::{CellGrid, EntropyGrid};
use crate::position::Position;
use rayon::prelude::*;

/// CPU implementation of the EntropyCalculator trait.
///
/// Entropy is the number of remaining candidates. The per-cell pass runs in
/// parallel; it only reads the grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuEntropyCalculator;

impl CpuEntropyCalculator {
    /// Creates the calculator.
    pub fn new() -> Self {
        Self
    }
}

impl EntropyCalculator for CpuEntropyCalculator {
    fn calculate_entropy(&self, grid: &CellGrid) -> EntropyGrid {
        let mut entropy_grid = EntropyGrid::new(grid.width, grid.height);

        entropy_grid
            .data
            .par_iter_mut()
            .zip(grid.data.par_iter())
            .for_each(|(entropy_cell, cell)| {
                *entropy_cell = (!cell.is_collapsed()).then(|| cell.entropy());
            });

        entropy_grid
    }

    fn select_lowest_entropy_cell(&self, entropy_grid: &EntropyGrid) -> Option<Position> {
        // rayon's min_by_key keeps the first of several equal minima,
        // which preserves the row-major tie-break.
        entropy_grid
            .data
            .par_iter()
            .enumerate()
            .filter_map(|(index, entropy)| entropy.map(|value| (index, value)))
            .min_by_key(|&(_, value)| value)
            .map(|(index, _)| entropy_grid.position_of(index))
    }
}
