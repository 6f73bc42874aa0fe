//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use game_core::GameEvent;

use super::types::TurnEvent;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// World changes (spawns, moves, attacks, deaths, failed actions)
    GameState,
    /// Turn loop progress
    Turn,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Game(GameEvent),
    Turn(TurnEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Game(_) => Topic::GameState,
            Event::Turn(_) => Topic::Turn,
        }
    }
}

/// Topic-based event bus
///
/// Every topic has its own broadcast channel, created up front, so publishing
/// never waits and a slow consumer of one topic never lags another.
#[derive(Clone, Debug)]
pub struct EventBus {
    game_state: broadcast::Sender<Event>,
    turn: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    ///
    /// `capacity` must be non-zero; [`crate::RuntimeBuilder::build`] checks it.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            game_state: broadcast::channel(capacity).0,
            turn: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::GameState => &self.game_state,
            Topic::Turn => &self.turn,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!(target: "runtime::worker", ?topic, "no subscribers");
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    /// Number of live receivers on `topic`.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.sender(topic).receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
