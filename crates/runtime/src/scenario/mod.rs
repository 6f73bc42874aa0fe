//! Scenario system for entity placement and game initialization.
//!
//! A scenario decides which map to use and where to place entities. The map
//! only describes terrain; everything that acts is spawned here.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use strum::{EnumCount, IntoEnumIterator};
use tracing::{info, warn};

use game_core::{EntityId, GameConfig, GameState, MapOracle, MonsterKind};

use crate::api::{Result, RuntimeError};
use crate::oracle::GridMap;

/// Seeded description of a fresh world: one bordered room, the player in the
/// middle, and monsters of random kinds on free floor tiles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scenario {
    pub seed: u64,
    pub width: u32,
    pub height: u32,
    pub monster_count: usize,
}

impl Scenario {
    pub fn new(seed: u64, width: u32, height: u32, monster_count: usize) -> Self {
        Self {
            seed,
            width,
            height,
            monster_count,
        }
    }

    pub fn build_map(&self) -> Result<GridMap> {
        Ok(GridMap::bordered_room(self.width, self.height)?)
    }

    /// Builds the map and a populated world for it.
    pub fn generate(&self, config: GameConfig) -> Result<(GameState, GridMap)> {
        let map = self.build_map()?;
        let mut state = GameState::new(config);
        self.populate(&mut state, &map)?;
        Ok((state, map))
    }

    /// Spawns the player and the monsters into `state`. Returns the player id.
    ///
    /// When the map has fewer free tiles than requested monsters, as many as
    /// fit are placed.
    pub fn populate(&self, state: &mut GameState, map: &GridMap) -> Result<EntityId> {
        let mut floor = map.floor_positions();
        let center = map.center();
        let player_position = if map.is_walkable(center) {
            center
        } else {
            *floor.first().ok_or(RuntimeError::NoPlayer)?
        };
        let player = state.spawn_player(player_position);

        let mut rng = StdRng::seed_from_u64(self.seed);
        floor.retain(|&position| position != player_position && !state.is_blocked(position));
        floor.shuffle(&mut rng);

        let kinds: Vec<MonsterKind> = MonsterKind::iter().collect();
        if floor.len() < self.monster_count {
            warn!(
                target: "runtime::worker",
                requested = self.monster_count,
                available = floor.len(),
                "not enough floor for every monster"
            );
        }
        for position in floor.into_iter().take(self.monster_count) {
            let kind = kinds[rng.gen_range(0..MonsterKind::COUNT)];
            state.spawn_monster(position, kind);
        }

        info!(
            target: "runtime::worker",
            seed = self.seed,
            width = self.width,
            height = self.height,
            entities = state.store.entity_count(),
            player = %player,
            position = %player_position,
            "scenario populated"
        );
        Ok(player)
    }
}
