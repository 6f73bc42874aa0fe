//! Topic-based event routing.
//!
//! The simulation worker publishes every [`game_core::GameEvent`] drained from
//! the world under [`Topic::GameState`], and one [`TurnEvent`] per advance under
//! [`Topic::Turn`]. Consumers subscribe only to the topics they care about.
mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::TurnEvent;
