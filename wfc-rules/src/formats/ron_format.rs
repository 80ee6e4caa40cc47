use crate::formats::{FormatParser, RuleFile};
use crate::types::{AdjacencyRules, TileSet};
use crate::LoadError;

/// A parser implementation for RON (Rusty Object Notation) format rules.
///
/// ```ron
/// (
///     tiles: [
///         (name: "A", up: ["A", "B"], down: ["A"], left: ["A"], right: ["A", "B"]),
///         (name: "B", up: ["A"], down: ["A"], left: ["A"], right: ["A"]),
///     ],
/// )
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct RonFormatParser;

impl RonFormatParser {
    /// Creates a new RON format parser
    pub fn new() -> Self {
        Self
    }
}

impl FormatParser for RonFormatParser {
    fn format_name(&self) -> &'static str {
        "Rusty Object Notation (RON)"
    }

    fn parse(&self, ron_content: &str) -> Result<(TileSet, AdjacencyRules), LoadError> {
        let rule_file: RuleFile = ron::from_str(ron_content)
            .map_err(|e| LoadError::ParseError(format!("RON deserialization failed: {e}")))?;
        rule_file.into_rules()
    }
}
