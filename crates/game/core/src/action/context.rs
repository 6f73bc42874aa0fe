use super::DamagePolicy;
use crate::env::MapOracle;
use crate::event::GameEvent;
use crate::state::{EntityId, GameState, Tick};
use crate::store::TurnActor;

/// Everything an action may read or mutate while it executes.
pub struct ActionContext<'a> {
    pub state: &'a mut GameState,
    pub map: &'a dyn MapOracle,
    pub damage: &'a dyn DamagePolicy,
}

impl<'a> ActionContext<'a> {
    pub fn new(
        state: &'a mut GameState,
        map: &'a dyn MapOracle,
        damage: &'a dyn DamagePolicy,
    ) -> Self {
        Self { state, map, damage }
    }

    /// Cost of one standard action for `actor`: its own speed when it has a
    /// non-zero one, otherwise the configured default.
    pub fn standard_cost(&self, actor: EntityId) -> Tick {
        self.state
            .store
            .get::<TurnActor>(actor)
            .map(|turn_actor| turn_actor.speed)
            .filter(|speed| *speed > Tick::ZERO)
            .unwrap_or(self.state.config.standard_action_cost)
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.state.emit(event);
    }
}
