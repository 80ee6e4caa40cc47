use crate::cell::Cell;
use crate::position::Position;

/// Row-major 2D storage addressed by `(x, y)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
    pub(crate) data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    /// Creates a new grid with the given dimensions, initialized with default values.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T> Grid<T> {
    /// Creates a grid whose element at `(x, y)` is `f(x, y)`.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let data = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Self {
            width,
            height,
            data,
        }
    }

    /// Returns an immutable reference to the element at the given coordinates,
    /// or None if the coordinates are out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        self.index(x, y).and_then(|idx| self.data.get(idx))
    }

    /// Returns a mutable reference to the element at the given coordinates,
    /// or None if the coordinates are out of bounds.
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        self.index(x, y).and_then(move |idx| self.data.get_mut(idx))
    }

    /// Like [`Grid::get`], for signed positions.
    pub fn get_at(&self, position: Position) -> Option<&T> {
        let (x, y) = position.to_usize()?;
        self.get(x, y)
    }

    /// Like [`Grid::get_mut`], for signed positions.
    pub fn get_at_mut(&mut self, position: Position) -> Option<&mut T> {
        let (x, y) = position.to_usize()?;
        self.get_mut(x, y)
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the grid has no items.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Elements in row-major order (all of row `y = 0` first).
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    /// Converts a row-major index back to a position.
    pub fn position_of(&self, index: usize) -> Position {
        Position::from((index % self.width, index / self.width))
    }

    /// Calculates the 1D index for the given coordinates.
    /// Returns None if the coordinates are out of bounds.
    fn index(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }
}

/// Grid of WFC cells owned by the engine.
pub type CellGrid = Grid<Cell>;

/// Entropy per cell; `None` marks a collapsed cell.
pub type EntropyGrid = Grid<Option<usize>>;
