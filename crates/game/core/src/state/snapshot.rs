use super::{EntityId, GameStatus, Position, Tick};
use crate::store::{Health, Tint};
use crate::turn::TurnEntry;

/// Draw layer. Later layers are drawn over earlier ones on the same tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RenderOrder {
    None,
    Corpse,
    Actor,
}

/// Everything the renderer needs to draw one entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Drawable {
    pub entity: EntityId,
    pub position: Position,
    pub glyph: char,
    pub tint: Tint,
    pub order: RenderOrder,
}

/// Read-only copy of the world handed to UI and runtime consumers.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldSnapshot {
    pub clock: Tick,
    pub status: GameStatus,
    pub waiting_for_input: bool,
    pub player: Option<EntityId>,
    pub player_position: Option<Position>,
    pub player_health: Option<Health>,
    pub entity_count: usize,
    /// Pending turns in processing order.
    pub schedule: Vec<TurnEntry>,
    /// Drawables in draw order.
    pub drawables: Vec<Drawable>,
}

impl WorldSnapshot {
    /// Topmost drawable at `position`.
    pub fn drawable_at(&self, position: Position) -> Option<&Drawable> {
        self.drawables
            .iter()
            .rev()
            .find(|drawable| drawable.position == position)
    }

    pub fn is_game_over(&self) -> bool {
        self.status == GameStatus::Lost
    }
}
