//! The world aggregate.
//!
//! [`GameState`] owns the component store, the turn scheduler, and the small
//! amount of game-level bookkeeping (player id, game status, pending events).
//! It is passed by reference into the engine and actions; nothing in the core
//! holds a global handle to it.
mod common;
mod snapshot;
mod spawn;

pub use common::{EntityId, Position, Tick};
pub use snapshot::{Drawable, RenderOrder, WorldSnapshot};
pub use spawn::{MONSTER_FOV_RANGE, MonsterKind, PLAYER_FOV_RANGE, PLAYER_MAX_HP, PLAYER_SPEED};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::action::Action;
use crate::config::GameConfig;
use crate::event::GameEvent;
use crate::store::{
    AiTag, BlocksMovement, ComponentKind, ComponentStore, CorpseTag, Fov, Health, Name, PlayerTag,
    Renderable, Tint, TurnActor,
};
use crate::turn::TurnScheduler;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameStatus {
    #[default]
    Ongoing,
    /// The player died.
    Lost,
}

/// Cross-task quit request, checked by the turn loop between iterations.
#[derive(Clone, Debug, Default)]
pub struct QuitSignal(Arc<AtomicBool>);

impl QuitSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
pub struct GameState {
    pub config: GameConfig,
    pub store: ComponentStore,
    pub scheduler: TurnScheduler,
    pub player: Option<EntityId>,
    pub status: GameStatus,
    pub(crate) waiting_for_input: bool,
    events: Vec<GameEvent>,
    quit: QuitSignal,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl GameState {
    pub fn new(config: GameConfig) -> Self {
        Self {
            scheduler: TurnScheduler::new(&config),
            config,
            store: ComponentStore::new(),
            player: None,
            status: GameStatus::Ongoing,
            waiting_for_input: false,
            events: Vec::new(),
            quit: QuitSignal::new(),
        }
    }

    pub fn clock(&self) -> Tick {
        self.scheduler.clock()
    }

    pub fn is_player(&self, id: EntityId) -> bool {
        self.player == Some(id) || self.store.has::<PlayerTag>(id)
    }

    /// True once the player popped with nothing queued. Cleared by the next
    /// [`crate::GameEngine::process_turns`] call.
    pub fn is_waiting_for_input(&self) -> bool {
        self.waiting_for_input
    }

    pub fn is_game_over(&self) -> bool {
        self.status == GameStatus::Lost
    }

    pub fn is_quit_requested(&self) -> bool {
        self.quit.is_requested()
    }

    /// Handle other tasks can use to stop the turn loop.
    pub fn quit_signal(&self) -> QuitSignal {
        self.quit.clone()
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // Spawning
    // ========================================================================

    /// Creates the player and schedules its first turn at the current clock.
    pub fn spawn_player(&mut self, position: Position) -> EntityId {
        let store = &self.store;
        let id = store.create_entity();
        store.add(id, PlayerTag);
        store.add(id, Name::new("Player"));
        store.add(id, position);
        store.add(id, Renderable::new('@', Tint::Player));
        store.add(id, TurnActor::new(PLAYER_SPEED));
        store.add(id, Health::new(PLAYER_MAX_HP));
        store.add(id, BlocksMovement);
        store.add(id, Fov::new(PLAYER_FOV_RANGE));

        self.player = Some(id);
        self.scheduler.add(id, self.scheduler.clock());
        debug!(target: "game_core::engine", entity = %id, %position, "spawned player");
        self.emit(GameEvent::Spawned {
            entity: id,
            name: "Player".to_owned(),
            position,
        });
        id
    }

    /// Creates a monster from its template. Its first turn comes one spawn
    /// delay after the current clock.
    pub fn spawn_monster(&mut self, position: Position, kind: MonsterKind) -> EntityId {
        let store = &self.store;
        let id = store.create_entity();
        store.add(id, Name::new(kind.name()));
        store.add(id, position);
        store.add(id, Renderable::new(kind.glyph(), Tint::Monster));
        store.add(id, TurnActor::new(kind.speed()));
        store.add(id, Health::new(kind.max_hp()));
        store.add(id, AiTag);
        store.add(id, BlocksMovement);
        store.add(id, Fov::new(MONSTER_FOV_RANGE));

        let first_turn = self.scheduler.clock() + self.config.monster_spawn_delay;
        self.scheduler.add(id, first_turn);
        debug!(
            target: "game_core::engine",
            entity = %id,
            monster = %kind,
            %position,
            first_turn = %first_turn,
            "spawned monster"
        );
        self.emit(GameEvent::Spawned {
            entity: id,
            name: kind.name().to_owned(),
            position,
        });
        id
    }

    /// Appends `action` to the entity's queue. Returns false if the entity
    /// cannot hold actions.
    pub fn queue_action(&self, id: EntityId, action: Action) -> bool {
        let queued = self
            .store
            .update::<TurnActor, _>(id, |turn_actor| turn_actor.queue_action(action))
            .is_some();
        if !queued {
            debug!(target: "game_core::engine", entity = %id, "queue_action on entity without TurnActor");
        }
        queued
    }

    /// Whether `position` holds something that blocks movement.
    pub fn is_blocked(&self, position: Position) -> bool {
        self.store
            .entities_at(position)
            .into_iter()
            .any(|id| self.store.has::<BlocksMovement>(id))
    }

    // ========================================================================
    // Read views
    // ========================================================================

    /// Every positioned, renderable entity in draw order.
    pub fn drawables(&self) -> Vec<Drawable> {
        let mut drawables: Vec<Drawable> = self
            .store
            .query(&[ComponentKind::Position, ComponentKind::Renderable])
            .into_iter()
            .filter_map(|entity| {
                let position = self.store.position(entity)?;
                let renderable = self.store.renderable(entity)?;
                Some(Drawable {
                    entity,
                    position,
                    glyph: renderable.glyph,
                    tint: renderable.tint,
                    order: self.render_order(entity),
                })
            })
            .collect();
        drawables.sort_by_key(|drawable| (drawable.order, drawable.entity));
        drawables
    }

    fn render_order(&self, entity: EntityId) -> RenderOrder {
        if self.store.has::<CorpseTag>(entity) {
            RenderOrder::Corpse
        } else if self.store.has::<TurnActor>(entity) {
            RenderOrder::Actor
        } else {
            RenderOrder::None
        }
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            clock: self.clock(),
            status: self.status,
            waiting_for_input: self.waiting_for_input,
            player: self.player,
            player_position: self.player.and_then(|id| self.store.position(id)),
            player_health: self.player.and_then(|id| self.store.health(id)),
            entity_count: self.store.entity_count(),
            schedule: self.scheduler.entries(),
            drawables: self.drawables(),
        }
    }
}
