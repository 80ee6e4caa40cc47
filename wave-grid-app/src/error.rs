use thiserror::Error;
use wfc_core::WfcError;
use wfc_rules::LoadError;

/// Errors surfaced by the application layer.
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid or inconsistent settings.
    #[error("Configuration Error: {0}")]
    Config(String),

    /// A configuration layer could not be read or typed.
    #[error("Configuration Error: {0}")]
    Figment(#[from] figment::Error),

    /// The rule file could not be loaded.
    #[error("Rule Loading Error: {0}")]
    Rules(#[from] LoadError),

    /// The run stopped on an engine error.
    #[error("WFC Core Error: {0}")]
    WfcCore(#[from] WfcError),

    /// Writing the terminal view failed.
    #[error("Visualization Error: {0}")]
    Visualization(String),

    /// Other failures, such as writing an output file.
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
