//! Read-only world data the core consumes but does not own.
//!
//! Map generation, field of view and exploration live outside the core. The
//! simulation only asks the [`MapOracle`] whether a tile exists, can be walked
//! on, or blocks sight.
mod map;

pub use map::{MapDimensions, MapOracle, StaticTile, TerrainKind};
