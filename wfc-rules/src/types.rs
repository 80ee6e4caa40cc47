use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Represents a unique identifier for a tile.
///
/// The index of the tile's label inside its [`TileSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub usize);

/// Opaque name of one tile type, e.g. `"A"` or `"grass"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileLabel(String);

impl TileLabel {
    /// Creates a label from any string-like name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The label text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TileLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TileLabel {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TileLabel {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// The four grid directions rules are defined for.
///
/// `Up` points towards increasing `y`, `Right` towards increasing `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All directions, in the order propagation visits them.
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Index used to address per-direction rule storage.
    pub const fn index(self) -> usize {
        match self {
            Self::Up => 0,
            Self::Down => 1,
            Self::Left => 2,
            Self::Right => 3,
        }
    }

    /// The direction pointing back from the neighbor.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Unit offset `(dx, dy)` of the neighbor in this direction.
    pub const fn offset(self) -> (isize, isize) {
        match self {
            Self::Up => (0, 1),
            Self::Down => (0, -1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Lowercase name as used in rule files.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = TileSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(TileSetError::InvalidDirection(other.to_owned())),
        }
    }
}

/// Errors that can occur during TileSet or AdjacencyRules creation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TileSetError {
    /// The label alphabet was empty.
    #[error("TileSet must contain at least one tile label.")]
    EmptyAlphabet,
    /// The same label appeared twice in the alphabet.
    #[error("Duplicate tile label: {0}")]
    DuplicateLabel(String),
    /// A label of the alphabet has no rule entry.
    #[error("No adjacency rule defined for tile label: {0}")]
    MissingRule(String),
    /// A direction name outside `up`, `down`, `left`, `right`.
    #[error("Invalid direction: {0}")]
    InvalidDirection(String),
}

/// The fixed alphabet of tile labels a grid is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSet {
    labels: Vec<TileLabel>,
    ids: HashMap<TileLabel, TileId>,
}

impl TileSet {
    /// Creates a new `TileSet` from labels in the given order.
    ///
    /// # Errors
    ///
    /// Returns `TileSetError::EmptyAlphabet` if `labels` is empty.
    /// Returns `TileSetError::DuplicateLabel` if a label occurs more than once.
    pub fn new<I, L>(labels: I) -> Result<Self, TileSetError>
    where
        I: IntoIterator<Item = L>,
        L: Into<TileLabel>,
    {
        let labels: Vec<TileLabel> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(TileSetError::EmptyAlphabet);
        }
        let mut ids = HashMap::with_capacity(labels.len());
        for (index, label) in labels.iter().enumerate() {
            if ids.insert(label.clone(), TileId(index)).is_some() {
                return Err(TileSetError::DuplicateLabel(label.to_string()));
            }
        }
        Ok(Self { labels, ids })
    }

    /// Number of labels in the alphabet.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false for a constructed set; kept for `len` symmetry.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Id of `label`, or `None` if it is not part of the alphabet.
    pub fn id_of(&self, label: &TileLabel) -> Option<TileId> {
        self.ids.get(label).copied()
    }

    /// Label of `tile_id`, or `None` if out of range.
    pub fn label(&self, tile_id: TileId) -> Option<&TileLabel> {
        self.labels.get(tile_id.0)
    }

    /// All labels in alphabet order.
    pub fn labels(&self) -> &[TileLabel] {
        &self.labels
    }

    /// Bitset with every tile of the alphabet set.
    pub fn full_set(&self) -> BitVec {
        bitvec![1; self.labels.len()]
    }

    /// Converts labels to a bitset; labels outside the alphabet are skipped.
    pub fn to_bitset<'a, I>(&self, labels: I) -> BitVec
    where
        I: IntoIterator<Item = &'a TileLabel>,
    {
        let mut set = bitvec![0; self.labels.len()];
        for label in labels {
            if let Some(TileId(index)) = self.id_of(label) {
                set.set(index, true);
            }
        }
        set
    }

    /// Converts a bitset back into labels, in alphabet order.
    pub fn to_labels(&self, set: &BitSlice) -> Vec<TileLabel> {
        set.iter_ones()
            .filter_map(|index| self.labels.get(index).cloned())
            .collect()
    }
}

/// Permitted neighbor labels of one tile, per direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileRule {
    /// Labels allowed at `y + 1`.
    pub up: Vec<TileLabel>,
    /// Labels allowed at `y - 1`.
    pub down: Vec<TileLabel>,
    /// Labels allowed at `x - 1`.
    pub left: Vec<TileLabel>,
    /// Labels allowed at `x + 1`.
    pub right: Vec<TileLabel>,
}

impl TileRule {
    /// A rule permitting the same labels in every direction.
    pub fn uniform<I, L>(labels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<TileLabel>,
    {
        let labels: Vec<TileLabel> = labels.into_iter().map(Into::into).collect();
        Self {
            up: labels.clone(),
            down: labels.clone(),
            left: labels.clone(),
            right: labels,
        }
    }

    /// Permitted labels in `direction`.
    pub fn permitted(&self, direction: Direction) -> &[TileLabel] {
        match direction {
            Direction::Up => &self.up,
            Direction::Down => &self.down,
            Direction::Left => &self.left,
            Direction::Right => &self.right,
        }
    }
}

/// Represents adjacency rules between tiles for the four directions.
///
/// Rules are compiled into one bitmask per `(direction, tile)` pair so that
/// propagation is a single bitset intersection.
/// Indexing: `direction.index() * num_tiles + tile.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyRules {
    labels: Vec<TileLabel>,
    num_tiles: usize,
    allowed: Vec<BitVec>,
}

impl AdjacencyRules {
    /// Compiles a rule table for `tileset`.
    ///
    /// Every label of the alphabet must have an entry in `rules`. Permitted
    /// labels that are not part of the alphabet are dropped, since no cell
    /// can ever hold them.
    ///
    /// # Errors
    ///
    /// Returns `TileSetError::MissingRule` for the first label without an entry.
    pub fn from_rules(
        tileset: &TileSet,
        rules: &HashMap<TileLabel, TileRule>,
    ) -> Result<Self, TileSetError> {
        let num_tiles = tileset.len();
        let mut allowed = vec![bitvec![0; num_tiles]; Direction::ALL.len() * num_tiles];

        for (index, label) in tileset.labels().iter().enumerate() {
            let rule = rules
                .get(label)
                .ok_or_else(|| TileSetError::MissingRule(label.to_string()))?;
            for direction in Direction::ALL {
                let permitted = rule.permitted(direction);
                let dropped = permitted
                    .iter()
                    .filter(|neighbor| tileset.id_of(neighbor).is_none())
                    .count();
                if dropped > 0 {
                    log::warn!(
                        "Rule for '{}' ({}) references {} label(s) outside the alphabet",
                        label,
                        direction,
                        dropped
                    );
                }
                allowed[direction.index() * num_tiles + index] = tileset.to_bitset(permitted);
            }
        }

        Ok(Self {
            labels: tileset.labels().to_vec(),
            num_tiles,
            allowed,
        })
    }

    /// Rules permitting every tile next to every other tile.
    pub fn unconstrained(tileset: &TileSet) -> Self {
        let num_tiles = tileset.len();
        Self {
            labels: tileset.labels().to_vec(),
            num_tiles,
            allowed: vec![tileset.full_set(); Direction::ALL.len() * num_tiles],
        }
    }

    /// Gets the number of different tile types these rules apply to.
    pub fn num_tiles(&self) -> usize {
        self.num_tiles
    }

    /// The alphabet these rules were compiled for, in tile id order.
    pub fn labels(&self) -> &[TileLabel] {
        &self.labels
    }

    /// Tiles permitted next to `tile` in `direction`, or `None` if `tile` is out of range.
    #[inline]
    pub fn allowed(&self, tile: TileId, direction: Direction) -> Option<&BitSlice> {
        if tile.0 >= self.num_tiles {
            return None;
        }
        self.allowed
            .get(direction.index() * self.num_tiles + tile.0)
            .map(BitVec::as_bitslice)
    }

    /// Checks if `tile2` may be placed next to `tile1` in `direction`.
    ///
    /// Out-of-range ids are treated as disallowed.
    #[inline]
    pub fn check(&self, tile1: TileId, tile2: TileId, direction: Direction) -> bool {
        self.allowed(tile1, direction)
            .and_then(|set| set.get(tile2.0).map(|bit| *bit))
            .unwrap_or(false)
    }

    /// True if every permitted pair also holds in the opposite direction.
    ///
    /// Asymmetric tables are valid; this is only used for diagnostics.
    pub fn is_symmetric(&self) -> bool {
        (0..self.num_tiles).all(|t1| {
            (0..self.num_tiles).all(|t2| {
                Direction::ALL.iter().all(|&direction| {
                    self.check(TileId(t1), TileId(t2), direction)
                        == self.check(TileId(t2), TileId(t1), direction.opposite())
                })
            })
        })
    }
}
