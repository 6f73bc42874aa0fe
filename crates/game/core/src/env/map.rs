use crate::state::Position;

/// Static map oracle exposing immutable layout information.
///
/// Implementors only describe tiles; bounds, walkability and opacity queries
/// derive from them unless the implementor has a faster answer.
pub trait MapOracle: Send + Sync {
    fn dimensions(&self) -> MapDimensions;

    /// Tile at `position`, or `None` outside the map.
    fn tile(&self, position: Position) -> Option<StaticTile>;

    fn in_bounds(&self, position: Position) -> bool {
        self.dimensions().contains(position)
    }

    fn is_walkable(&self, position: Position) -> bool {
        self.tile(position).is_some_and(StaticTile::is_passable)
    }

    /// Out-of-bounds positions are opaque.
    fn is_opaque(&self, position: Position) -> bool {
        self.tile(position).is_none_or(StaticTile::is_opaque)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapDimensions {
    pub width: u32,
    pub height: u32,
}

impl MapDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && (position.x as i64) < self.width as i64
            && (position.y as i64) < self.height as i64
    }

    /// Row-major index of `position`, if it is inside the map.
    pub fn index_of(&self, position: Position) -> Option<usize> {
        self.contains(position)
            .then(|| position.y as usize * self.width as usize + position.x as usize)
    }
}

/// Immutable descriptor for a tile in the static layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaticTile {
    terrain: TerrainKind,
}

impl StaticTile {
    pub const fn new(terrain: TerrainKind) -> Self {
        Self { terrain }
    }

    pub fn terrain(self) -> TerrainKind {
        self.terrain
    }

    pub fn is_passable(self) -> bool {
        self.terrain.is_passable()
    }

    pub fn is_opaque(self) -> bool {
        self.terrain.is_opaque()
    }
}

/// Canonical terrain classes for static map tiles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerrainKind {
    #[default]
    Floor,
    Wall,
    Void,
    Water,
}

impl TerrainKind {
    pub fn is_passable(self) -> bool {
        matches!(self, TerrainKind::Floor)
    }

    /// Water blocks movement but not sight.
    pub fn is_opaque(self) -> bool {
        matches!(self, TerrainKind::Wall | TerrainKind::Void)
    }

    pub fn glyph(self) -> char {
        match self {
            TerrainKind::Floor => '.',
            TerrainKind::Wall => '#',
            TerrainKind::Void => ' ',
            TerrainKind::Water => '~',
        }
    }

    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '.' => Some(TerrainKind::Floor),
            '#' => Some(TerrainKind::Wall),
            ' ' => Some(TerrainKind::Void),
            '~' => Some(TerrainKind::Water),
            _ => None,
        }
    }
}
