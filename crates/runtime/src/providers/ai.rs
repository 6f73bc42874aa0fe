use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::trace;

use game_core::{Action, ActionPlanner, CardinalDirection, EntityId, GameState, MapOracle};

/// Chance that a monster with nothing better to do stands still.
const WAIT_CHANCE: f64 = 0.5;

/// Wanders at random and attacks the player when orthogonally adjacent.
///
/// All randomness comes from one seeded generator, so a run is reproducible
/// from its seed as long as turns are processed in the same order.
#[derive(Debug, Clone)]
pub struct RandomWalkAi {
    rng: StdRng,
}

impl RandomWalkAi {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn wander(&mut self, entity: EntityId, state: &GameState, map: &dyn MapOracle) -> Action {
        let Some(position) = state.store.position(entity) else {
            return Action::wait(entity);
        };
        if self.rng.gen_bool(WAIT_CHANCE) {
            return Action::wait(entity);
        }

        let mut directions = CardinalDirection::ALL;
        directions.shuffle(&mut self.rng);
        directions
            .into_iter()
            .find(|direction| {
                let (dx, dy) = direction.delta();
                let destination = position.offset(dx, dy);
                map.is_walkable(destination) && !state.is_blocked(destination)
            })
            .map_or_else(|| Action::wait(entity), |direction| Action::move_in(entity, direction))
    }
}

impl ActionPlanner for RandomWalkAi {
    fn plan(&mut self, entity: EntityId, state: &GameState, map: &dyn MapOracle) -> Option<Action> {
        let position = state.store.position(entity)?;

        let toward_player = state
            .player
            .filter(|_| !state.is_game_over())
            .and_then(|player| state.store.position(player))
            .and_then(|target| CardinalDirection::between(position, target));

        let action = match toward_player {
            Some(direction) => Action::move_in(entity, direction),
            None => self.wander(entity, state, map),
        };
        trace!(target: "runtime::worker", %entity, ?action, "planned");
        Some(action)
    }
}
