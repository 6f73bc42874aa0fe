use tracing::debug;

use super::{Action, ActionContext, AttackAction, MoveError};
use crate::event::GameEvent;
use crate::state::{EntityId, Position, Tick};
use crate::store::{BlocksMovement, Health, TurnActor};

/// One of the four grid directions, in screen coordinates (y grows downward).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CardinalDirection {
    North,
    South,
    East,
    West,
}

impl CardinalDirection {
    pub const ALL: [CardinalDirection; 4] = [
        CardinalDirection::North,
        CardinalDirection::South,
        CardinalDirection::East,
        CardinalDirection::West,
    ];

    pub const fn delta(self) -> (i32, i32) {
        match self {
            CardinalDirection::North => (0, -1),
            CardinalDirection::South => (0, 1),
            CardinalDirection::East => (1, 0),
            CardinalDirection::West => (-1, 0),
        }
    }

    /// Direction of a single orthogonal step from `from` to `to`, if there is one.
    pub fn between(from: Position, to: Position) -> Option<Self> {
        Self::ALL.into_iter().find(|direction| {
            let (dx, dy) = direction.delta();
            from.offset(dx, dy) == to
        })
    }
}

/// Step one tile in `direction`, or attack whatever living thing stands there.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveAction {
    pub actor: EntityId,
    pub direction: CardinalDirection,
}

impl MoveAction {
    pub fn new(actor: EntityId, direction: CardinalDirection) -> Self {
        Self { actor, direction }
    }

    fn destination_from(&self, origin: Position) -> Position {
        let (dx, dy) = self.direction.delta();
        origin.offset(dx, dy)
    }

    pub(super) fn execute(&self, ctx: &mut ActionContext<'_>) -> Result<Tick, MoveError> {
        let store = &ctx.state.store;
        let origin = store
            .position(self.actor)
            .ok_or(MoveError::ActorNotFound(self.actor))?;
        let destination = self.destination_from(origin);

        if !ctx.map.in_bounds(destination) {
            return Err(MoveError::OutOfBounds { destination });
        }
        if !ctx.map.is_walkable(destination) {
            return Err(MoveError::Blocked { destination });
        }

        let blockers: Vec<EntityId> = store
            .entities_at(destination)
            .into_iter()
            .filter(|id| *id != self.actor && store.has::<BlocksMovement>(*id))
            .collect();

        if let Some(&target) = blockers.iter().find(|id| store.has::<Health>(**id)) {
            // The attack is what gets timed, on the actor's next pop.
            store.update::<TurnActor, _>(self.actor, |turn_actor| {
                turn_actor.queue_front(Action::Attack(AttackAction::new(self.actor, target)));
            });
            debug!(
                target: "game_core::action",
                actor = %self.actor,
                target = %target,
                "bump converted to attack"
            );
            return Ok(Tick::ZERO);
        }

        if let Some(&occupant) = blockers.first() {
            return Err(MoveError::Occupied {
                destination,
                occupant,
            });
        }

        store.add(self.actor, destination);
        debug!(
            target: "game_core::action",
            actor = %self.actor,
            from = %origin,
            to = %destination,
            "moved"
        );
        ctx.emit(GameEvent::Moved {
            entity: self.actor,
            from: origin,
            to: destination,
        });

        Ok(ctx.standard_cost(self.actor))
    }
}
