use crate::cell::Cell;
use crate::entropy::{CpuEntropyCalculator, EntropyCalculator};
use crate::grid::CellGrid;
use crate::position::Position;
use crate::propagator::{ConstraintPropagator, CpuConstraintPropagator, PropagationMode};
use crate::WfcError;
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::Arc;
use wfc_rules::{AdjacencyRules, TileId, TileLabel, TileRule, TileSet};

/// Result of a single select/collapse/propagate step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// `position` was committed to `tile`; `forced` lists the neighbors that
    /// auto-collapsed during propagation.
    Collapsed {
        position: Position,
        tile: TileId,
        forced: Vec<Position>,
    },
    /// Every cell was already collapsed.
    Complete,
}

/// Overall state of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridStatus {
    /// Uncollapsed cells remain and none is contradictory.
    Running,
    /// Every cell is collapsed.
    Done,
    /// The first (row-major) cell left without candidates.
    Stuck(Position),
}

/// Owns a `size x size` grid of cells and drives selection, collapse and
/// propagation over it.
///
/// Cells are only reachable through the engine; neighbor lookups go through
/// positions, never through references into the grid.
#[derive(Debug)]
pub struct WfcEngine<R = StdRng> {
    size: usize,
    tileset: Arc<TileSet>,
    rules: Arc<AdjacencyRules>,
    grid: CellGrid,
    rng: R,
    propagator: Box<dyn ConstraintPropagator>,
    entropy_calculator: Box<dyn EntropyCalculator>,
}

impl WfcEngine<StdRng> {
    /// Engine with a `StdRng` seeded from `seed`; runs are reproducible.
    pub fn seeded(
        size: usize,
        tileset: Arc<TileSet>,
        rules: Arc<AdjacencyRules>,
        seed: u64,
    ) -> Result<Self, WfcError> {
        Self::new(size, tileset, rules, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> WfcEngine<R> {
    /// Creates an engine whose cells all start with the full alphabet.
    ///
    /// # Errors
    ///
    /// Returns `WfcError::ConfigurationError` if `size` is zero or the rule
    /// table was compiled for a different alphabet than `tileset`.
    pub fn new(
        size: usize,
        tileset: Arc<TileSet>,
        rules: Arc<AdjacencyRules>,
        rng: R,
    ) -> Result<Self, WfcError> {
        if size == 0 {
            return Err(WfcError::ConfigurationError(
                "Grid size must be positive".to_owned(),
            ));
        }
        if rules.labels() != tileset.labels() {
            return Err(WfcError::ConfigurationError(format!(
                "Rule table was compiled for tiles {:?} but the tile set is {:?}",
                label_names(rules.labels()),
                label_names(tileset.labels())
            )));
        }
        let grid = Self::build_grid(size, &tileset);
        Ok(Self {
            size,
            tileset,
            rules,
            grid,
            rng,
            propagator: Box::new(CpuConstraintPropagator::default()),
            entropy_calculator: Box::new(CpuEntropyCalculator::new()),
        })
    }

    /// Compiles `rules` for `tileset` and creates the engine.
    ///
    /// # Errors
    ///
    /// Returns `WfcError::TileSetError` if a label of `tileset` has no rule.
    pub fn from_rule_map(
        size: usize,
        tileset: TileSet,
        rules: &HashMap<TileLabel, TileRule>,
        rng: R,
    ) -> Result<Self, WfcError> {
        let compiled = AdjacencyRules::from_rules(&tileset, rules)?;
        Self::new(size, Arc::new(tileset), Arc::new(compiled), rng)
    }

    /// Replaces the propagator.
    #[must_use]
    pub fn with_propagator(mut self, propagator: Box<dyn ConstraintPropagator>) -> Self {
        self.propagator = propagator;
        self
    }

    /// Shortcut for a `CpuConstraintPropagator` in `mode`.
    #[must_use]
    pub fn with_propagation_mode(self, mode: PropagationMode) -> Self {
        self.with_propagator(Box::new(CpuConstraintPropagator::new(mode)))
    }

    fn build_grid(size: usize, tileset: &TileSet) -> CellGrid {
        CellGrid::from_fn(size, size, |x, y| {
            Cell::new(Position::from((x, y)), tileset.full_set())
        })
    }

    /// Side length of the square grid.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of cells, `size * size`.
    pub fn total_cells(&self) -> usize {
        self.grid.len()
    }

    /// The alphabet every cell draws from.
    pub fn tileset(&self) -> &TileSet {
        &self.tileset
    }

    /// The compiled adjacency rules.
    pub fn rules(&self) -> &AdjacencyRules {
        &self.rules
    }

    /// Read-only view of all cells.
    pub fn grid(&self) -> &CellGrid {
        &self.grid
    }

    /// The cell at `(x, y)`, or `None` if out of range.
    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        self.grid.get(x, y)
    }

    /// The committed label at `(x, y)`, or `None` if undetermined or out of range.
    pub fn label_at(&self, x: usize, y: usize) -> Option<&TileLabel> {
        self.cell(x, y)
            .and_then(Cell::value)
            .and_then(|tile| self.tileset.label(tile))
    }

    /// Number of cells committed to a tile.
    pub fn collapsed_count(&self) -> usize {
        self.grid.iter().filter(|cell| cell.is_collapsed()).count()
    }

    /// Inspects the grid for completion or a contradiction.
    pub fn status(&self) -> GridStatus {
        if let Some(cell) = self.grid.iter().find(|cell| cell.is_contradiction()) {
            return GridStatus::Stuck(cell.position());
        }
        if self.grid.iter().all(Cell::is_collapsed) {
            GridStatus::Done
        } else {
            GridStatus::Running
        }
    }

    /// The uncollapsed cell with the fewest candidates; ties go to the
    /// earliest cell in row-major order.
    pub fn find_min_entropy_cell(&self) -> Option<Position> {
        self.entropy_calculator.find_lowest_entropy(&self.grid)
    }

    /// Collapses the cell at `position` using the engine's RNG.
    ///
    /// # Errors
    ///
    /// `WfcError::Contradiction` if the cell has no candidates,
    /// `WfcError::GridError` if `position` is outside the grid.
    pub fn collapse_cell(&mut self, position: Position) -> Result<TileId, WfcError> {
        let cell = self
            .grid
            .get_at_mut(position)
            .ok_or_else(|| WfcError::GridError(format!("Cell {position} is outside the grid")))?;
        Ok(cell.collapse(&mut self.rng)?)
    }

    /// Applies the rule of the collapsed cell at `position` to its neighbors.
    ///
    /// Returns the neighbors that auto-collapsed.
    pub fn propagate(&mut self, position: Position) -> Result<Vec<Position>, WfcError> {
        Ok(self
            .propagator
            .propagate(&mut self.grid, position, &self.rules)?)
    }

    /// Collapses `position` and propagates from it.
    pub fn collapse_and_propagate(&mut self, position: Position) -> Result<StepOutcome, WfcError> {
        let tile = self.collapse_cell(position)?;
        trace!(
            "Collapsed {} to '{}'",
            position,
            self.tileset.label(tile).map_or("?", TileLabel::as_str)
        );
        let forced = self.propagate(position)?;
        if !forced.is_empty() {
            debug!("Collapse at {} forced {} neighbor(s)", position, forced.len());
        }
        Ok(StepOutcome::Collapsed {
            position,
            tile,
            forced,
        })
    }

    /// Performs one iteration: select the minimum-entropy cell, collapse it
    /// and propagate from it.
    pub fn collapse_next(&mut self) -> Result<StepOutcome, WfcError> {
        match self.find_min_entropy_cell() {
            Some(position) => self.collapse_and_propagate(position),
            None => Ok(StepOutcome::Complete),
        }
    }

    /// Returns every cell to the full alphabet, keeping size and rules.
    pub fn reset(&mut self) {
        self.grid = Self::build_grid(self.size, &self.tileset);
    }
}

fn label_names(labels: &[TileLabel]) -> Vec<&str> {
    labels.iter().map(TileLabel::as_str).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagator::PropagationError;
    use bitvec::prelude::*;

    fn ab_engine(size: usize, seed: u64) -> WfcEngine {
        let tileset = TileSet::new(["A", "B"]).unwrap();
        let rules: HashMap<TileLabel, TileRule> = [
            (TileLabel::from("A"), TileRule::uniform(["A", "B"])),
            (TileLabel::from("B"), TileRule::uniform(["A"])),
        ]
        .into_iter()
        .collect();
        WfcEngine::from_rule_map(size, tileset, &rules, StdRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn test_new_grid_is_maximally_uncertain() {
        let engine = ab_engine(3, 0);
        assert_eq!(engine.total_cells(), 9);
        assert_eq!(engine.collapsed_count(), 0);
        assert!(engine.grid().iter().all(|cell| cell.entropy() == 2));
        assert_eq!(engine.status(), GridStatus::Running);
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let tileset = Arc::new(TileSet::new(["A"]).unwrap());
        let rules = Arc::new(AdjacencyRules::unconstrained(&tileset));
        assert!(matches!(
            WfcEngine::seeded(0, tileset, rules, 1),
            Err(WfcError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_mismatched_rules_are_rejected() {
        let tileset = Arc::new(TileSet::new(["A", "B"]).unwrap());
        let other = TileSet::new(["A"]).unwrap();
        let rules = Arc::new(AdjacencyRules::unconstrained(&other));
        assert!(matches!(
            WfcEngine::seeded(2, tileset, rules, 1),
            Err(WfcError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_rules_for_another_alphabet_of_same_size_are_rejected() {
        let other = TileSet::new(["X", "Y"]).unwrap();
        let rules: HashMap<TileLabel, TileRule> = [
            (TileLabel::from("X"), TileRule::uniform(["Y"])),
            (TileLabel::from("Y"), TileRule::uniform(["X"])),
        ]
        .into_iter()
        .collect();
        let compiled = Arc::new(AdjacencyRules::from_rules(&other, &rules).unwrap());
        let tileset = Arc::new(TileSet::new(["A", "B"]).unwrap());

        let result = WfcEngine::seeded(3, tileset, compiled, 1);
        assert!(matches!(
            result,
            Err(WfcError::ConfigurationError(ref msg)) if msg.contains("\"X\"")
        ));
    }

    #[test]
    fn test_rules_for_same_labels_in_other_order_are_rejected() {
        let tileset = Arc::new(TileSet::new(["A", "B"]).unwrap());
        let swapped = TileSet::new(["B", "A"]).unwrap();
        let rules = Arc::new(AdjacencyRules::unconstrained(&swapped));
        assert!(matches!(
            WfcEngine::seeded(2, tileset, rules, 1),
            Err(WfcError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_missing_rule_fails_at_construction() {
        let tileset = TileSet::new(["A", "B"]).unwrap();
        let rules: HashMap<TileLabel, TileRule> =
            [(TileLabel::from("A"), TileRule::uniform(["A"]))]
                .into_iter()
                .collect();
        let result = WfcEngine::from_rule_map(2, tileset, &rules, StdRng::seed_from_u64(0));
        assert!(matches!(result, Err(WfcError::TileSetError(_))));
    }

    #[test]
    fn test_first_step_takes_first_cell() {
        let mut engine = ab_engine(2, 3);
        match engine.collapse_next().unwrap() {
            StepOutcome::Collapsed { position, .. } => assert_eq!(position, Position::new(0, 0)),
            StepOutcome::Complete => panic!("Expected a collapse"),
        }
        assert!(engine.cell(0, 0).unwrap().is_collapsed());
    }

    #[test]
    fn test_collapse_next_reports_complete() {
        let mut engine = ab_engine(2, 11);
        let mut steps = 0;
        while let StepOutcome::Collapsed { .. } = engine.collapse_next().unwrap() {
            steps += 1;
            assert!(steps <= 4);
        }
        assert_eq!(engine.status(), GridStatus::Done);
        assert_eq!(engine.collapse_next().unwrap(), StepOutcome::Complete);
        for y in 0..2 {
            for x in 0..2 {
                assert!(engine.label_at(x, y).is_some());
            }
        }
    }

    #[test]
    fn test_reset_restores_uncertainty() {
        let mut engine = ab_engine(2, 5);
        engine.collapse_next().unwrap();
        assert!(engine.collapsed_count() > 0);
        engine.reset();
        assert_eq!(engine.collapsed_count(), 0);
        assert_eq!(engine.status(), GridStatus::Running);
    }

    #[test]
    fn test_stuck_status_and_contradiction_on_collapse() {
        let mut engine = ab_engine(2, 0);
        let _ = engine.grid.get_mut(1, 1).unwrap().set_possibilities(bitvec![0, 0]);
        assert_eq!(engine.status(), GridStatus::Stuck(Position::new(1, 1)));
        assert_eq!(engine.find_min_entropy_cell(), Some(Position::new(1, 1)));
        assert_eq!(
            engine.collapse_next(),
            Err(WfcError::Contradiction(Position::new(1, 1)))
        );
    }

    #[test]
    fn test_propagating_from_uncollapsed_cell_is_an_error() {
        let mut engine = ab_engine(2, 0);
        assert_eq!(
            engine.propagate(Position::new(0, 0)),
            Err(WfcError::PropagationError(
                PropagationError::SourceNotCollapsed(Position::new(0, 0))
            ))
        );
    }

    #[test]
    fn test_same_seed_same_grid() {
        let fill = |seed| {
            let tileset = Arc::new(TileSet::new(["A", "B", "C", "D"]).unwrap());
            let rules = Arc::new(AdjacencyRules::unconstrained(&tileset));
            let mut engine = WfcEngine::seeded(4, tileset, rules, seed).unwrap();
            while let StepOutcome::Collapsed { .. } = engine.collapse_next().unwrap() {}
            engine
                .grid()
                .iter()
                .map(|cell| cell.value())
                .collect::<Vec<_>>()
        };
        assert_eq!(fill(99), fill(99));
    }
}
