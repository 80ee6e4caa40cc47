//! Logging setup for the application.

use crate::config::Settings;
use env_logger::{Builder, Env};
use log::LevelFilter;

/// Module whose records are filtered by the progress log level.
pub const PROGRESS_MODULE: &str = "wave_grid_app::progress";

/// Initializes the logger with the appropriate configuration based on the application settings.
///
/// - Progress reports use the level in `settings.progress_log_level`.
/// - Everything else uses `settings.global_log_level`, unless `RUST_LOG` is
///   set, in which case `RUST_LOG` wins.
pub fn init_logger(settings: &Settings) {
    let progress_level = LevelFilter::from(settings.progress_log_level);
    let global_level = LevelFilter::from(settings.global_log_level);

    let env = Env::default().filter("RUST_LOG");
    let mut builder = Builder::from_env(env);

    if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(global_level);
    }
    builder.filter_module(PROGRESS_MODULE, progress_level);

    if let Err(e) = builder.try_init() {
        eprintln!("Logger already initialized: {e}");
        return;
    }

    log::debug!(
        "Logger initialized with global log level: {:?}, progress log level: {:?}",
        settings.global_log_level,
        settings.progress_log_level
    );
}
