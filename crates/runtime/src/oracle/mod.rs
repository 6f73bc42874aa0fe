//! Data adapters that expose static world data to the core.
mod map;

pub use map::{GridMap, MapError};
