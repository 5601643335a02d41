//! Board storage.
//!
//! The board is a dense row-major arena addressed by 1-based `Coord`s. The keyed
//! string form used on disk lives in the persistence module.

use serde::{Serialize, Deserialize};

use crate::game::types::{Coord, Resource, Terrain};

/// No tile may carry more rails than this.
pub const MAX_RAILS_PER_TILE: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    #[serde(default)]
    pub resource: Option<Resource>,
    #[serde(default)]
    pub terrain: Option<Terrain>,
    #[serde(default)]
    pub zone: Option<String>,
    /// Player tags, in the order the rails were placed.
    #[serde(default)]
    pub rails: Vec<String>,
}

impl Tile {
    pub fn is_river(&self) -> bool {
        self.terrain == Some(Terrain::River)
    }

    /// No resource and no terrain.
    pub fn is_bare(&self) -> bool {
        self.resource.is_none() && self.terrain.is_none()
    }

    pub fn has_rail(&self, tag: &str) -> bool {
        self.rails.iter().any(|t| t == tag)
    }

    /// The first rail on this tile that does not belong to `tag`.
    pub fn other_rail(&self, tag: &str) -> Option<&str> {
        self.rails.iter().map(String::as_str).find(|t| *t != tag)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Board {
    /// An empty board of `width` columns and `height` rows.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::default(); width * height],
        }
    }

    /// Build a board from row-major tiles. Returns `None` if the count does not match.
    pub fn from_tiles(width: usize, height: usize, tiles: Vec<Tile>) -> Option<Self> {
        (tiles.len() == width * height).then_some(Self { width, height, tiles })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, c: Coord) -> bool {
        c.row >= 1 && c.col >= 1 && c.row as usize <= self.height && c.col as usize <= self.width
    }

    fn index(&self, c: Coord) -> Option<usize> {
        self.in_bounds(c)
            .then(|| (c.row as usize - 1) * self.width + (c.col as usize - 1))
    }

    pub fn get(&self, c: Coord) -> Option<&Tile> {
        self.index(c).map(|i| &self.tiles[i])
    }

    pub fn get_mut(&mut self, c: Coord) -> Option<&mut Tile> {
        self.index(c).map(move |i| &mut self.tiles[i])
    }

    /// All coordinates, row by row.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + use<> {
        let (width, height) = (self.width as i32, self.height as i32);
        (1..=height).flat_map(move |row| (1..=width).map(move |col| Coord::new(row, col)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Tile)> {
        self.coords().zip(self.tiles.iter())
    }

    /// Coordinates inside the square window of `radius` around `center`, clipped to the board.
    pub fn window(&self, center: Coord, radius: i32) -> impl Iterator<Item = Coord> + use<> {
        let (width, height) = (self.width as i32, self.height as i32);
        let rows = (center.row - radius).max(1)..=(center.row + radius).min(height);
        let cols = (center.col - radius).max(1)..=(center.col + radius).min(width);
        rows.flat_map(move |row| cols.clone().map(move |col| Coord::new(row, col)))
    }

    /// Adds `tag` to the tile's rails. Refuses when the tile is full or off the board.
    pub fn add_rail(&mut self, c: Coord, tag: &str) -> bool {
        match self.get_mut(c) {
            Some(tile) if tile.rails.len() < MAX_RAILS_PER_TILE => {
                tile.rails.push(tag.to_string());
                true
            }
            _ => false,
        }
    }

    /// Removes the most recent rail of `tag` from the tile.
    pub fn remove_rail(&mut self, c: Coord, tag: &str) -> bool {
        let Some(tile) = self.get_mut(c) else {
            return false;
        };
        match tile.rails.iter().rposition(|t| t == tag) {
            Some(pos) => {
                tile.rails.remove(pos);
                true
            }
            None => false,
        }
    }

    /// True if `resource` lies within Chebyshev distance `< spread` of `c`.
    pub fn near_resource(&self, c: Coord, resource: Resource, spread: i32) -> bool {
        if spread <= 0 {
            return false;
        }
        self.window(c, spread - 1)
            .any(|n| self.get(n).is_some_and(|t| t.resource == Some(resource)))
    }

    /// True if one of the four orthogonal neighbours holds `resource`.
    pub fn next_to_resource(&self, c: Coord, resource: Resource) -> bool {
        c.neighbors()
            .iter()
            .any(|n| self.get(*n).is_some_and(|t| t.resource == Some(resource)))
    }
}
