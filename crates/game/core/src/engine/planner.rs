use crate::action::Action;
use crate::env::MapOracle;
use crate::state::{EntityId, GameState};

/// Decides what a non-player entity does when its turn comes up with an
/// empty action queue.
pub trait ActionPlanner {
    /// Returns `None` to let the entity idle until its next turn.
    fn plan(&mut self, entity: EntityId, state: &GameState, map: &dyn MapOracle) -> Option<Action>;
}

/// Planner that never acts. Idle entities are rescheduled one standard cost later.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdlePlanner;

impl ActionPlanner for IdlePlanner {
    fn plan(&mut self, _entity: EntityId, _state: &GameState, _map: &dyn MapOracle) -> Option<Action> {
        None
    }
}
