use std::fmt;
use wfc_rules::{Direction, TileSetError};

/// Grid-relative cell coordinates.
///
/// Coordinates are signed so that neighbors of edge cells can be computed
/// without bounds checks; use [`Position::out_of_grid`] before indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    /// Column, increasing to the right.
    pub x: isize,
    /// Row, increasing upwards.
    pub y: isize,
}

impl Position {
    /// Position at `(x, y)`.
    pub const fn new(x: isize, y: isize) -> Self {
        Self { x, y }
    }

    /// The adjacent position in `direction`. Not bounds-checked.
    pub const fn neighbor(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Like [`Position::neighbor`], but takes the direction by name.
    ///
    /// # Errors
    ///
    /// Returns `TileSetError::InvalidDirection` for anything other than
    /// `up`, `down`, `left` or `right`.
    pub fn neighbor_named(self, direction: &str) -> Result<Self, TileSetError> {
        Ok(self.neighbor(direction.parse()?))
    }

    /// True if the position lies outside `[0, size)` on either axis.
    pub const fn out_of_grid(self, size: usize) -> bool {
        !(self.x >= 0 && self.y >= 0 && (self.x as usize) < size && (self.y as usize) < size)
    }

    /// Converts to unsigned coordinates, or `None` if either is negative.
    pub fn to_usize(self) -> Option<(usize, usize)> {
        Some((usize::try_from(self.x).ok()?, usize::try_from(self.y).ok()?))
    }
}

impl From<(usize, usize)> for Position {
    fn from((x, y): (usize, usize)) -> Self {
        Self::new(x as isize, y as isize)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
