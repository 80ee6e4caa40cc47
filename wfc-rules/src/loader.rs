use crate::formats::json_format::JsonFormatParser;
use crate::formats::ron_format::RonFormatParser;
use crate::formats::FormatParser;
use crate::{AdjacencyRules, LoadError, TileSet};
use std::path::Path;

/// Supported rule file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFormat {
    Ron,
    Json,
}

impl RuleFormat {
    /// Determines the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("ron") => Ok(Self::Ron),
            Some("json") => Ok(Self::Json),
            _ => Err(LoadError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn parser(self) -> Box<dyn FormatParser> {
        match self {
            Self::Ron => Box::new(RonFormatParser::new()),
            Self::Json => Box::new(JsonFormatParser::new()),
        }
    }
}

/// Parses rule content that is already in memory.
pub fn load_from_str(
    content: &str,
    format: RuleFormat,
) -> Result<(TileSet, AdjacencyRules), LoadError> {
    let parser = format.parser();
    log::debug!("Parsing rules as {}", parser.format_name());
    let (tileset, rules) = parser.parse(content)?;
    if !rules.is_symmetric() {
        log::debug!("Loaded adjacency rules are not symmetric");
    }
    Ok((tileset, rules))
}

/// Loads the tile set and adjacency rules from a specified file.
///
/// The format is chosen from the file extension (`.ron` or `.json`).
///
/// # Arguments
///
/// * `path` - The path to the rule definition file.
///
/// # Returns
///
/// A `Result` containing the loaded `TileSet` and `AdjacencyRules` on success,
/// or a `LoadError` on failure.
pub fn load_from_file(path: &Path) -> Result<(TileSet, AdjacencyRules), LoadError> {
    let format = RuleFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    let (tileset, rules) = load_from_str(&content, format)?;
    log::info!(
        "Loaded {} tiles from {}",
        tileset.len(),
        path.display()
    );
    Ok((tileset, rules))
}
