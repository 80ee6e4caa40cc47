use crate::engine::{GridStatus, StepOutcome, WfcEngine};
use crate::{ProgressInfo, WfcError};
use log::{debug, error, info};
use rand::Rng;
use std::time::{Duration, Instant};

/// Alias for the progress callback function type.
pub type ProgressCallback = Box<dyn Fn(&ProgressInfo) -> Result<(), WfcError> + Send + Sync>;

/// Configuration options for the WFC runner.
#[derive(Default)]
pub struct WfcConfig {
    /// Called after every iteration.
    pub progress_callback: Option<ProgressCallback>,
    /// Stop with an error after this many iterations.
    pub max_iterations: Option<u64>,
}

impl WfcConfig {
    /// Creates a new builder for `WfcConfig`.
    pub fn builder() -> WfcConfigBuilder {
        WfcConfigBuilder::default()
    }
}

impl std::fmt::Debug for WfcConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WfcConfig")
            .field("progress_callback", &self.progress_callback.is_some())
            .field("max_iterations", &self.max_iterations)
            .finish()
    }
}

/// Builder for `WfcConfig`.
#[derive(Default)]
pub struct WfcConfigBuilder {
    progress_callback: Option<ProgressCallback>,
    max_iterations: Option<u64>,
}

impl WfcConfigBuilder {
    /// Sets the progress callback function.
    pub fn progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Sets the maximum number of iterations allowed.
    pub fn max_iterations(mut self, max: u64) -> Self {
        self.max_iterations = Some(max);
        self
    }

    /// Builds the `WfcConfig` instance.
    pub fn build(self) -> WfcConfig {
        WfcConfig {
            progress_callback: self.progress_callback,
            max_iterations: self.max_iterations,
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// Number of select/collapse/propagate iterations performed.
    pub iterations: u64,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

/// Runs the Wave Function Collapse loop until the grid is fully collapsed.
///
/// Each iteration:
/// 1. **Observation**: selects the uncollapsed cell with the lowest entropy.
/// 2. **Collapse**: commits it to one of its candidates, chosen uniformly.
/// 3. **Propagation**: narrows its neighbors with the engine's propagator.
///
/// The loop ends successfully once no uncollapsed cell remains.
///
/// # Errors
///
/// * `WfcError::Contradiction` if a cell is (or becomes) empty. The run stops
///   at that point; there is no backtracking.
/// * `WfcError::MaxIterationsReached` if `config.max_iterations` is exceeded.
/// * Any error returned by the progress callback.
pub fn run<R: Rng>(engine: &mut WfcEngine<R>, config: &WfcConfig) -> Result<RunStats, WfcError> {
    let total_cells = engine.total_cells();
    info!(
        "Starting WFC run on {0}x{0} grid with {1} tiles...",
        engine.size(),
        engine.tileset().len()
    );
    let start_time = Instant::now();
    let mut iterations: u64 = 0;

    if let GridStatus::Stuck(position) = engine.status() {
        error!("Initial contradiction found at {}", position);
        return Err(WfcError::Contradiction(position));
    }

    let report = |iterations: u64, collapsed_cells: usize| -> Result<(), WfcError> {
        if let Some(ref callback) = config.progress_callback {
            callback(&ProgressInfo {
                collapsed_cells,
                total_cells,
                elapsed_time: start_time.elapsed(),
                iterations,
            })?;
        }
        Ok(())
    };

    while let Some(position) = engine.find_min_entropy_cell() {
        if let Some(limit) = config.max_iterations {
            if iterations >= limit {
                error!(
                    "Maximum iterations ({}) reached with {} cells uncollapsed.",
                    limit,
                    total_cells - engine.collapsed_count()
                );
                return Err(WfcError::MaxIterationsReached(limit));
            }
        }
        iterations += 1;

        match engine.collapse_and_propagate(position) {
            Ok(StepOutcome::Collapsed { tile, forced, .. }) => {
                debug!(
                    "Iter {}: collapsed {} to tile {}, {} neighbor(s) forced",
                    iterations,
                    position,
                    tile.0,
                    forced.len()
                );
            }
            Ok(StepOutcome::Complete) => break,
            Err(e) => {
                error!("Iter {}: {}", iterations, e);
                return Err(e);
            }
        }

        report(iterations, engine.collapsed_count())?;
    }

    info!(
        "WFC run finished in {:?} after {} iterations.",
        start_time.elapsed(),
        iterations
    );
    Ok(RunStats {
        iterations,
        elapsed: start_time.elapsed(),
    })
}
