//! Action planners for entities the player does not control.
mod ai;

pub use ai::RandomWalkAi;
