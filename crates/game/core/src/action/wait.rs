use tracing::trace;

use super::ActionContext;
use crate::state::{EntityId, Tick};

/// Skip a turn. Always succeeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WaitAction {
    pub actor: EntityId,
}

impl WaitAction {
    pub fn new(actor: EntityId) -> Self {
        Self { actor }
    }

    pub(super) fn execute(&self, ctx: &mut ActionContext<'_>) -> Tick {
        trace!(target: "game_core::action", actor = %self.actor, "waited");
        ctx.standard_cost(self.actor)
    }
}
