//! Tile alphabets and adjacency rules for 2D wave function collapse,
//! plus loaders for rule files.

use thiserror::Error;

/// Rule-file formats and parsers.
pub mod formats;
/// Loading rules from files or strings.
pub mod loader;
/// Tile sets and adjacency rules.
pub mod types;

pub use loader::{load_from_file, load_from_str, RuleFormat};
pub use types::{AdjacencyRules, Direction, TileId, TileLabel, TileRule, TileSet, TileSetError};

/// The three-tile set used when no rule file is given.
pub const DEFAULT_RULES_RON: &str = include_str!("../rules/default.ron");

/// Loads [`DEFAULT_RULES_RON`].
pub fn default_rules() -> Result<(TileSet, AdjacencyRules), LoadError> {
    load_from_str(DEFAULT_RULES_RON, RuleFormat::Ron)
}

/// Errors that can occur while loading rules.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The rule file could not be read.
    #[error("I/O error reading file: {0}")]
    Io(#[from] std::io::Error),
    /// The content is not valid RON or JSON for the rule schema.
    #[error("Failed to parse rules format (e.g., RON/JSON): {0}")]
    ParseError(String),
    /// The rules parsed but are inconsistent.
    #[error("Invalid rule data: {0}")]
    InvalidData(String),
    /// The alphabet or rule table could not be built.
    #[error("TileSet error: {0}")]
    TileSet(#[from] TileSetError),
    /// The file extension names no known format.
    #[error("Unsupported rule file format: {0}")]
    UnsupportedFormat(String),
}
