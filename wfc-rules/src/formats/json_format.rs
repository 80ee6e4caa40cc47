use crate::formats::{FormatParser, RuleFile};
use crate::types::{AdjacencyRules, TileSet};
use crate::LoadError;

/// A parser for rules stored as JSON, using the same layout as the RON format.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFormatParser;

impl JsonFormatParser {
    /// Creates a new JSON format parser
    pub fn new() -> Self {
        Self
    }
}

impl FormatParser for JsonFormatParser {
    fn format_name(&self) -> &'static str {
        "JSON"
    }

    fn parse(&self, json_content: &str) -> Result<(TileSet, AdjacencyRules), LoadError> {
        let rule_file: RuleFile = serde_json::from_str(json_content)
            .map_err(|e| LoadError::ParseError(format!("JSON deserialization failed: {e}")))?;
        rule_file.into_rules()
    }
}
