use crate::grid::CellGrid;
use crate::position::Position;
use crate::propagator::{ConstraintPropagator, PropagationError};
use wfc_rules::{AdjacencyRules, Direction};

/// How far a single `propagate` call reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PropagationMode {
    /// Only the four direct neighbors of the source are narrowed.
    #[default]
    SingleHop,
    /// Neighbors that auto-collapse are propagated from in the same call.
    Eager,
}

/// CPU constraint propagator.
#[derive(Debug, Clone, Default)]
pub struct CpuConstraintPropagator {
    mode: PropagationMode,
}

impl CpuConstraintPropagator {
    /// Propagator that narrows neighbors according to `mode`.
    pub fn new(mode: PropagationMode) -> Self {
        Self { mode }
    }

    /// Narrows the in-bounds, uncollapsed neighbors of `source`.
    ///
    /// Returns the neighbors that became collapsed.
    fn narrow_neighbors(
        grid: &mut CellGrid,
        source: Position,
        rules: &AdjacencyRules,
    ) -> Result<Vec<Position>, PropagationError> {
        let source_cell = grid
            .get_at(source)
            .ok_or(PropagationError::SourceOutOfBounds(source))?;
        let tile = source_cell
            .value()
            .ok_or(PropagationError::SourceNotCollapsed(source))?;

        let mut collapsed = Vec::new();
        for direction in Direction::ALL {
            let neighbor_pos = source.neighbor(direction);
            // Out-of-grid positions have no cell.
            let Some(neighbor) = grid.get_at_mut(neighbor_pos) else {
                continue;
            };
            let Some(current) = neighbor.possibilities() else {
                continue;
            };

            let permitted = rules.allowed(tile, direction).ok_or_else(|| {
                PropagationError::InternalError(format!(
                    "No rule for tile {} ({direction}) at {source}",
                    tile.0
                ))
            })?;

            let mut narrowed = current.to_bitvec();
            narrowed &= permitted;
            log::trace!(
                "Narrowing {} from {} to {} candidates",
                neighbor_pos,
                current.count_ones(),
                narrowed.count_ones()
            );
            neighbor.set_possibilities(narrowed)?;
            if neighbor.is_collapsed() {
                collapsed.push(neighbor_pos);
            }
        }
        Ok(collapsed)
    }
}

impl ConstraintPropagator for CpuConstraintPropagator {
    fn propagate(
        &mut self,
        grid: &mut CellGrid,
        source: Position,
        rules: &AdjacencyRules,
    ) -> Result<Vec<Position>, PropagationError> {
        match self.mode {
            PropagationMode::SingleHop => Self::narrow_neighbors(grid, source, rules),
            PropagationMode::Eager => {
                let mut collapsed = Vec::new();
                let mut stack = vec![source];
                while let Some(position) = stack.pop() {
                    let newly_collapsed = Self::narrow_neighbors(grid, position, rules)?;
                    collapsed.extend_from_slice(&newly_collapsed);
                    stack.extend(newly_collapsed);
                }
                Ok(collapsed)
            }
        }
    }
}
