//! Handles the core execution logic of a generation run.

use crate::{
    config::{Settings, VisualizationMode},
    error::AppError,
    output,
    progress::{self, LogProgressReporter, ProgressReporter},
    visualization::{Palette, TerminalVisualizer, Visualizer},
};
use log::{error, info};
use std::sync::{Arc, Mutex};
use wfc_core::{
    runner::{self, WfcConfig},
    WfcEngine,
};
use wfc_rules::{default_rules, loader::load_from_file, AdjacencyRules, TileSet};

/// Loads the configured rule file, or the built-in tile set if none is set.
pub fn load_rules(settings: &Settings) -> Result<(TileSet, AdjacencyRules), AppError> {
    let (tileset, rules) = match &settings.rule_file {
        Some(path) => {
            info!("Loading rules from: {:?}", path);
            load_from_file(path)?
        }
        None => {
            info!("No rule file given, using the built-in tile set");
            default_rules()?
        }
    };
    info!(
        "Rules loaded: {} tiles ({})",
        tileset.len(),
        tileset
            .labels()
            .iter()
            .map(|label| label.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok((tileset, rules))
}

/// Fills one grid according to `settings`, then displays and saves it.
///
/// The grid is displayed and saved even when the run stops on a
/// contradiction; the contradiction is returned afterwards.
pub fn run_standard_mode(settings: &Settings) -> Result<(), AppError> {
    log::info!("Running WFC standard mode...");

    let (tileset, rules) = load_rules(settings)?;
    let palette = Palette::from_names(&settings.palette)?;

    let seed = settings.seed.unwrap_or_else(rand::random);
    info!("Using seed {}", seed);

    let mut engine = WfcEngine::seeded(settings.size, Arc::new(tileset), Arc::new(rules), seed)?
        .with_propagation_mode(settings.propagation.into());

    // --- Progress Reporting Setup ---
    let reporter = settings.report_progress_interval.map(|interval| {
        Arc::new(Mutex::new(LogProgressReporter::new(
            interval,
            settings.progress_log_level,
        )))
    });

    let mut builder = WfcConfig::builder();
    if let Some(reporter) = &reporter {
        builder = builder.progress_callback(progress::into_callback(Arc::clone(reporter)));
    }
    if let Some(max_iterations) = settings.max_iterations {
        builder = builder.max_iterations(max_iterations);
    }
    let wfc_config = builder.build();

    // --- Run WFC using the runner ---
    info!(
        "Starting WFC on a {0}x{0} grid ({1:?} propagation)...",
        settings.size, settings.propagation
    );
    let wfc_run_result = runner::run(&mut engine, &wfc_config);

    if let Some(reporter) = &reporter {
        let mut reporter = reporter
            .lock()
            .map_err(|_| anyhow::anyhow!("Progress reporter mutex poisoned"))?;
        match &wfc_run_result {
            Ok(_) => reporter.finish()?,
            Err(e) => reporter.fail(e)?,
        }
    }

    // --- Process Result ---
    match &wfc_run_result {
        Ok(stats) => info!(
            "WFC completed successfully after {} iterations in {:?}.",
            stats.iterations, stats.elapsed
        ),
        Err(e) => error!("WFC failed: {}", e),
    }

    if settings.visualization_mode == VisualizationMode::Terminal {
        let mut visualizer = TerminalVisualizer::new(palette);
        visualizer
            .display_state(engine.grid(), engine.tileset())
            .map_err(|e| AppError::Visualization(e.to_string()))?;
    }

    if let Some(path) = &settings.output_path {
        info!("Saving final grid to: {}", path.display());
        output::save_grid_to_file(engine.grid(), engine.tileset(), path)?;
    }

    if let Some(path) = &settings.image_output {
        let assets_dir = settings.tile_assets_dir().ok_or_else(|| {
            AppError::Config("Image output needs --assets-dir or a rule file".to_owned())
        })?;
        info!(
            "Saving grid image to: {} (tiles from {})",
            path.display(),
            assets_dir.display()
        );
        output::save_grid_image(
            engine.grid(),
            engine.tileset(),
            assets_dir,
            settings.tile_resolution,
            path,
        )?;
    }

    wfc_run_result?;
    Ok(())
}
