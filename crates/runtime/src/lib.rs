//! Runtime orchestration for the deterministic dungeon simulation.
//!
//! This crate owns a [`game_core::GameState`] on a background task and lets
//! clients drive it through a cloneable [`RuntimeHandle`]: queue player
//! actions, advance the turn loop, query snapshots, and subscribe to events.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator, its builder and configuration
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`oracle`] serves the static map to the core
//! - [`providers`] decides what AI-controlled entities do
//! - [`scenario`] places the player and monsters in a fresh world
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod oracle;
pub mod providers;
pub mod runtime;
pub mod scenario;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use events::{Event, EventBus, Topic, TurnEvent};
pub use oracle::{GridMap, MapError};
pub use providers::RandomWalkAi;
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use scenario::Scenario;
