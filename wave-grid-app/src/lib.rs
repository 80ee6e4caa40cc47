//! Wave Grid Application Library
//!
//! Configuration, logging, progress reporting and presentation around the
//! `wfc-core` engine.

/// Command-line flags and layered settings.
pub mod config;
/// Application error type.
pub mod error;
/// Logger setup.
pub mod logging;
/// Text and image export of the grid.
pub mod output;
/// Progress reporting during a run.
pub mod progress;
/// Run orchestration.
pub mod setup;
/// Terminal display of the grid.
pub mod visualization;

pub use config::{AppConfig, Settings};
pub use error::AppError;

use clap::Parser;

/// Parses the command line, resolves settings and runs one generation.
pub fn main() -> anyhow::Result<()> {
    let cli = AppConfig::parse();
    let settings = Settings::load(&cli)?;

    logging::init_logger(&settings);
    log::info!("Wave Grid App Starting");
    log::debug!("Resolved settings: {:?}", settings);

    setup::execution::run_standard_mode(&settings)?;

    log::info!("Wave Grid App Finished.");
    Ok(())
}
