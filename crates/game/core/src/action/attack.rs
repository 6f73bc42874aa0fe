use tracing::{debug, info};

use super::{ActionContext, AttackError};
use crate::config::GameConfig;
use crate::event::GameEvent;
use crate::state::{EntityId, GameState, GameStatus, Tick};
use crate::store::{
    AiTag, BlocksMovement, ComponentStore, CorpseTag, Fov, Health, Name, Renderable, TurnActor,
};

/// Decides how much damage one attack deals.
pub trait DamagePolicy: Send + Sync {
    fn damage(&self, attacker: EntityId, target: EntityId, store: &ComponentStore) -> i32;
}

/// Every hit deals the same amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedDamage(pub i32);

impl FixedDamage {
    pub fn from_config(config: &GameConfig) -> Self {
        Self(config.attack_damage)
    }
}

impl Default for FixedDamage {
    fn default() -> Self {
        Self(GameConfig::DEFAULT_ATTACK_DAMAGE)
    }
}

impl DamagePolicy for FixedDamage {
    fn damage(&self, _attacker: EntityId, _target: EntityId, _store: &ComponentStore) -> i32 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackAction {
    pub attacker: EntityId,
    pub target: EntityId,
}

impl AttackAction {
    pub fn new(attacker: EntityId, target: EntityId) -> Self {
        Self { attacker, target }
    }

    pub(super) fn execute(&self, ctx: &mut ActionContext<'_>) -> Result<Tick, AttackError> {
        let store = &ctx.state.store;
        if !store.has::<Health>(self.target) {
            debug!(
                target: "game_core::action",
                attacker = %self.attacker,
                target = %self.target,
                "attack target has no health"
            );
            return Err(AttackError::TargetHasNoHealth(self.target));
        }

        let damage = ctx.damage.damage(self.attacker, self.target, store).max(0);
        let health = store
            .update::<Health, _>(self.target, |health| {
                health.take_damage(damage);
                *health
            })
            .ok_or(AttackError::TargetHasNoHealth(self.target))?;

        info!(
            target: "game_core::action",
            attacker = %store.display_name(self.attacker),
            target = %store.display_name(self.target),
            damage,
            hp = health.current,
            max_hp = health.max,
            "attack"
        );
        ctx.emit(GameEvent::Attacked {
            attacker: self.attacker,
            target: self.target,
            damage,
            remaining: health.current,
        });

        if health.is_dead() {
            handle_death(ctx.state, self.target);
        }

        Ok(ctx.standard_cost(self.attacker))
    }
}

/// Takes a dead entity out of play.
///
/// The player keeps its components so the UI can still show it, but stops
/// acting and ends the game. Everyone else is reduced to a corpse.
fn handle_death(state: &mut GameState, entity: EntityId) {
    let name = state.store.display_name(entity);
    state.scheduler.remove(entity);

    if state.is_player(entity) {
        state.store.update::<TurnActor, _>(entity, |turn_actor| {
            turn_actor.alive = false;
            turn_actor.clear();
        });
        state.status = GameStatus::Lost;
        info!(target: "game_core::action", entity = %entity, name = %name, "player died");
        state.emit(GameEvent::PlayerDied { entity });
        return;
    }

    let store = &state.store;
    store.remove::<TurnActor>(entity);
    store.remove::<AiTag>(entity);
    store.remove::<BlocksMovement>(entity);
    store.remove::<Health>(entity);
    store.remove::<Fov>(entity);
    store.add(entity, CorpseTag);
    store.add(entity, Renderable::CORPSE);
    store.add(entity, Name::new(format!("remains of {name}")));

    info!(target: "game_core::action", entity = %entity, name = %name, "died");
    state.emit(GameEvent::Died { entity, name });
}
