//! Module defining parsers for different rule file formats.

use crate::types::{AdjacencyRules, TileLabel, TileRule, TileSet};
use crate::LoadError;
use serde::Deserialize;
use std::collections::HashMap;

// Export the core parser trait
/// The `FormatParser` trait.
pub mod parser;
pub use parser::FormatParser;

// Format-specific implementations
/// JSON rule files.
pub mod json_format;
/// RON rule files.
pub mod ron_format;

/// One tile entry of a rule file.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RuleFileTile {
    /// The label used to reference this tile in rule lists.
    name: TileLabel,
    #[serde(default)]
    up: Vec<TileLabel>,
    #[serde(default)]
    down: Vec<TileLabel>,
    #[serde(default)]
    left: Vec<TileLabel>,
    #[serde(default)]
    right: Vec<TileLabel>,
}

/// Top-level structure shared by all rule file formats.
///
/// The order of `tiles` defines the alphabet order.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RuleFile {
    tiles: Vec<RuleFileTile>,
}

impl RuleFile {
    /// Validates the parsed file and compiles it into a tile set and rule table.
    pub(crate) fn into_rules(self) -> Result<(TileSet, AdjacencyRules), LoadError> {
        if self.tiles.is_empty() {
            return Err(LoadError::InvalidData("No tiles defined.".to_owned()));
        }

        let tileset = TileSet::new(self.tiles.iter().map(|tile| tile.name.clone()))?;

        let mut rules = HashMap::with_capacity(self.tiles.len());
        for tile in self.tiles {
            let rule = TileRule {
                up: tile.up,
                down: tile.down,
                left: tile.left,
                right: tile.right,
            };
            for direction in crate::Direction::ALL {
                if let Some(unknown) = rule
                    .permitted(direction)
                    .iter()
                    .find(|label| tileset.id_of(label).is_none())
                {
                    return Err(LoadError::InvalidData(format!(
                        "Unknown tile: {unknown} (in '{}' rule, direction {direction})",
                        tile.name
                    )));
                }
            }
            rules.insert(tile.name, rule);
        }

        let adjacency = AdjacencyRules::from_rules(&tileset, &rules)?;
        Ok((tileset, adjacency))
    }
}
