use crate::error::AppError;
use colored::{Color, Colorize};
use std::collections::{BTreeMap, HashMap};
use std::io::{self, Stdout, Write};
use wfc_core::{Cell, CellGrid, TileLabel, TileSet};

/// Drawn for every collapsed cell, in the tile's color.
pub const COLLAPSED_GLYPH: &str = "■";
/// Drawn for every cell that is still undetermined.
pub const UNDETERMINED_GLYPH: &str = "?";

// Used for tiles the palette does not name, by tile index.
const FALLBACK_COLORS: [Color; 6] = [
    Color::Green,
    Color::Magenta,
    Color::Cyan,
    Color::BrightRed,
    Color::BrightBlue,
    Color::BrightYellow,
];

/// Maps tile labels to terminal colors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Palette {
    colors: HashMap<TileLabel, Color>,
}

impl Palette {
    /// Parses color names such as `"red"` or `"bright blue"`.
    pub fn from_names(names: &BTreeMap<String, String>) -> Result<Self, AppError> {
        let colors = names
            .iter()
            .map(|(label, name)| {
                let color = name.parse::<Color>().map_err(|_| {
                    AppError::Config(format!("Unknown color '{name}' for tile '{label}'"))
                })?;
                Ok((TileLabel::from(label.as_str()), color))
            })
            .collect::<Result<HashMap<_, _>, AppError>>()?;
        Ok(Self { colors })
    }

    /// Color of `label`; unnamed tiles get a fallback picked by `tile_index`.
    pub fn color_for(&self, label: &TileLabel, tile_index: usize) -> Color {
        self.colors
            .get(label)
            .copied()
            .unwrap_or_else(|| fallback_color(tile_index))
    }
}

fn fallback_color(tile_index: usize) -> Color {
    FALLBACK_COLORS[tile_index % FALLBACK_COLORS.len()]
}

/// Trait for types that can visualize the state of the cell grid.
///
/// Implementors of this trait define how the grid's state is presented to
/// the user.
pub trait Visualizer {
    /// Displays the current state of `grid`, whose tile ids index into `tileset`.
    fn display_state(&mut self, grid: &CellGrid, tileset: &TileSet) -> Result<(), anyhow::Error>;
}

/// Prints the grid as colored glyphs, one text line per row.
///
/// Row `y = 0` is printed first, matching the text and image outputs.
#[derive(Debug)]
pub struct TerminalVisualizer<W: Write = Stdout> {
    writer: W,
    palette: Palette,
}

impl TerminalVisualizer<Stdout> {
    /// Visualizer writing to stdout.
    pub fn new(palette: Palette) -> Self {
        Self::with_writer(io::stdout(), palette)
    }
}

impl<W: Write> TerminalVisualizer<W> {
    /// Visualizer writing to `writer`.
    pub fn with_writer(writer: W, palette: Palette) -> Self {
        Self { writer, palette }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// The text [`Visualizer::display_state`] writes.
    pub fn render(&self, grid: &CellGrid, tileset: &TileSet) -> String {
        let mut out = String::new();
        for y in 0..grid.height {
            for x in 0..grid.width {
                match grid.get(x, y).and_then(Cell::value) {
                    Some(tile) => {
                        let color = tileset.label(tile).map_or_else(
                            || fallback_color(tile.0),
                            |label| self.palette.color_for(label, tile.0),
                        );
                        out.push_str(&COLLAPSED_GLYPH.color(color).to_string());
                    }
                    None => out.push_str(UNDETERMINED_GLYPH),
                }
                out.push(' ');
            }
            out.push('\n');
        }
        out
    }
}

impl<W: Write> Visualizer for TerminalVisualizer<W> {
    fn display_state(&mut self, grid: &CellGrid, tileset: &TileSet) -> Result<(), anyhow::Error> {
        let frame = self.render(grid, tileset);
        self.writer.write_all(frame.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}
