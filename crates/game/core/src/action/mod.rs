//! What an entity can do on its turn.
//!
//! [`Action`] is a closed sum type. Every variant resolves against an
//! [`ActionContext`] and returns the time it cost, which the turn loop adds to
//! the clock when it reschedules the actor. A zero cost means the actor is
//! immediately eligible again (used by bump-to-attack, where the queued
//! attack is what gets timed).

mod attack;
mod context;
mod error;
mod movement;
mod wait;

pub use attack::{AttackAction, DamagePolicy, FixedDamage};
pub use context::ActionContext;
pub use error::{ActionError, AttackError, MoveError};
pub use movement::{CardinalDirection, MoveAction};
pub use wait::WaitAction;

use crate::state::{EntityId, Tick};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    Move(MoveAction),
    Attack(AttackAction),
    Wait(WaitAction),
}

impl Action {
    pub fn move_in(actor: EntityId, direction: CardinalDirection) -> Self {
        Self::Move(MoveAction::new(actor, direction))
    }

    pub fn attack(attacker: EntityId, target: EntityId) -> Self {
        Self::Attack(AttackAction::new(attacker, target))
    }

    pub fn wait(actor: EntityId) -> Self {
        Self::Wait(WaitAction::new(actor))
    }

    /// Entity performing this action.
    pub fn actor(&self) -> EntityId {
        match self {
            Self::Move(action) => action.actor,
            Self::Attack(action) => action.attacker,
            Self::Wait(action) => action.actor,
        }
    }

    pub fn execute(&self, ctx: &mut ActionContext<'_>) -> Result<Tick, ActionError> {
        match self {
            Self::Move(action) => Ok(action.execute(ctx)?),
            Self::Attack(action) => Ok(action.execute(ctx)?),
            Self::Wait(action) => Ok(action.execute(ctx)),
        }
    }
}
