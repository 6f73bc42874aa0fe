//! Static dungeon layout served through [`game_core::MapOracle`].
use std::collections::BTreeSet;

use thiserror::Error;

use game_core::{MapDimensions, MapOracle, Position, StaticTile, TerrainKind};

/// Smallest room that still has a floor tile inside its walls.
const MIN_ROOM_SIDE: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("map has no rows")]
    Empty,

    #[error("row {row} is {found} tiles wide, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown tile glyph {glyph:?} at {position}")]
    UnknownGlyph { glyph: char, position: Position },

    #[error("a {width}x{height} room has no floor")]
    TooSmall { width: u32, height: u32 },
}

/// Grid of static tiles plus the set of tiles the player has seen.
///
/// Tiles never change during play. The explored set only grows, and only the
/// runtime writes to it (after each advance), so the core can keep borrowing
/// the map immutably.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridMap {
    dimensions: MapDimensions,
    tiles: Vec<StaticTile>,
    explored: Vec<bool>,
}

impl GridMap {
    /// A single room: floor everywhere, walls around the edge.
    pub fn bordered_room(width: u32, height: u32) -> Result<Self, MapError> {
        if width < MIN_ROOM_SIDE || height < MIN_ROOM_SIDE {
            return Err(MapError::TooSmall { width, height });
        }

        let dimensions = MapDimensions::new(width, height);
        let tiles = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| {
                let edge = x == 0 || y == 0 || x == width - 1 || y == height - 1;
                StaticTile::new(if edge {
                    TerrainKind::Wall
                } else {
                    TerrainKind::Floor
                })
            })
            .collect();

        Ok(Self::from_tiles(dimensions, tiles))
    }

    /// Parses one row per line using the terrain glyphs (`.`, `#`, ` `, `~`).
    ///
    /// Trailing newlines are ignored; every remaining row must have the same
    /// width.
    pub fn from_ascii(layout: &str) -> Result<Self, MapError> {
        let rows: Vec<&str> = layout.trim_end_matches(['\n', '\r']).lines().collect();
        let width = rows.first().map_or(0, |row| row.chars().count());
        if width == 0 {
            return Err(MapError::Empty);
        }

        let mut tiles = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(MapError::RaggedRow {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let terrain = TerrainKind::from_glyph(glyph).ok_or(MapError::UnknownGlyph {
                    glyph,
                    position: Position::new(x as i32, y as i32),
                })?;
                tiles.push(StaticTile::new(terrain));
            }
        }

        let dimensions = MapDimensions::new(width as u32, rows.len() as u32);
        Ok(Self::from_tiles(dimensions, tiles))
    }

    fn from_tiles(dimensions: MapDimensions, tiles: Vec<StaticTile>) -> Self {
        Self {
            explored: vec![false; tiles.len()],
            dimensions,
            tiles,
        }
    }

    /// Walkable positions in scan order.
    pub fn floor_positions(&self) -> Vec<Position> {
        self.positions()
            .filter(|&position| self.is_walkable(position))
            .collect()
    }

    fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let MapDimensions { width, height } = self.dimensions;
        (0..height as i32).flat_map(move |y| (0..width as i32).map(move |x| Position::new(x, y)))
    }

    /// Centre tile, rounded towards the origin.
    pub fn center(&self) -> Position {
        Position::new(
            (self.dimensions.width / 2) as i32,
            (self.dimensions.height / 2) as i32,
        )
    }

    pub fn set_explored(&mut self, position: Position) {
        if let Some(index) = self.dimensions.index_of(position) {
            self.explored[index] = true;
        }
    }

    pub fn is_explored(&self, position: Position) -> bool {
        self.dimensions
            .index_of(position)
            .is_some_and(|index| self.explored[index])
    }

    pub fn explored_count(&self) -> usize {
        self.explored.iter().filter(|&&seen| seen).count()
    }

    /// Positions within `range` (Chebyshev) of `origin` with an unobstructed
    /// line to it. Opaque tiles are themselves visible but hide what lies
    /// behind them.
    pub fn visible_from(&self, origin: Position, range: u32) -> BTreeSet<Position> {
        let range = range as i32;
        let mut visible = BTreeSet::new();
        if !self.in_bounds(origin) {
            return visible;
        }

        for dy in -range..=range {
            for dx in -range..=range {
                let target = origin.offset(dx, dy);
                if self.in_bounds(target) && self.has_line_of_sight(origin, target) {
                    visible.insert(target);
                }
            }
        }
        visible
    }

    fn has_line_of_sight(&self, from: Position, to: Position) -> bool {
        line(from, to)
            .skip(1)
            .all(|position| !self.is_opaque(position))
    }

    /// Marks everything visible from `origin` as explored and returns it.
    pub fn reveal_around(&mut self, origin: Position, range: u32) -> BTreeSet<Position> {
        let visible = self.visible_from(origin, range);
        for &position in &visible {
            self.set_explored(position);
        }
        visible
    }

    /// Renders the terrain back into the glyphs [`GridMap::from_ascii`] reads.
    pub fn render_ascii(&self) -> String {
        let width = self.dimensions.width.max(1) as usize;
        let mut out = String::with_capacity(self.tiles.len() + self.dimensions.height as usize);
        for row in self.tiles.chunks(width) {
            out.extend(row.iter().map(|tile| tile.terrain().glyph()));
            out.push('\n');
        }
        out
    }
}

impl MapOracle for GridMap {
    fn dimensions(&self) -> MapDimensions {
        self.dimensions
    }

    fn tile(&self, position: Position) -> Option<StaticTile> {
        self.dimensions
            .index_of(position)
            .and_then(|index| self.tiles.get(index).copied())
    }
}

/// Bresenham line from `a` up to, but not including, `b`.
fn line(a: Position, b: Position) -> impl Iterator<Item = Position> {
    let step = ((b.x - a.x).signum(), (b.y - a.y).signum());
    let (dx, dy) = ((b.x - a.x).abs(), -(b.y - a.y).abs());
    let mut p = a;
    let mut err = dx + dy;

    std::iter::from_fn(move || {
        if p == b {
            return None;
        }
        let ret = p;
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            p.x += step.0;
        }
        if e2 <= dx {
            err += dx;
            p.y += step.1;
        }
        Some(ret)
    })
}
