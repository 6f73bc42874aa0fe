//! Game log entries produced while the simulation runs.
//!
//! Actions and the turn loop push events onto [`crate::GameState`]; hosts
//! drain them after each trigger and forward them to the UI or a log sink.

use crate::state::{EntityId, Position};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameEvent {
    Spawned {
        entity: EntityId,
        name: String,
        position: Position,
    },
    Moved {
        entity: EntityId,
        from: Position,
        to: Position,
    },
    Attacked {
        attacker: EntityId,
        target: EntityId,
        damage: i32,
        remaining: i32,
    },
    /// A non-player entity died and is now a corpse.
    Died { entity: EntityId, name: String },
    /// The player died. No further turns will be processed.
    PlayerDied { entity: EntityId },
    ActionFailed {
        entity: EntityId,
        code: String,
        reason: String,
    },
}
