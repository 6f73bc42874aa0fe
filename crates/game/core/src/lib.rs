//! Deterministic turn simulation for the dungeon.
//!
//! `game-core` owns the entity/component store, the time-ordered turn
//! schedule, the action protocol, and the turn loop that ties them together.
//! Hosts (the runtime worker, tests, tools) own a [`GameState`] and drive it
//! through [`GameEngine::process_turns`], one external trigger at a time.
//!
//! Modules, leaf first:
//! - [`store`] holds entities and their components behind a single lock
//! - [`turn`] is the priority schedule and the scheduler that owns the clock
//! - [`action`] defines what an entity can do on its turn
//! - [`engine`] is the per-tick driver
//! - [`state`] is the world aggregate passed by reference into all of the above
pub mod action;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod event;
pub mod state;
pub mod store;
pub mod turn;

pub use action::{
    Action, ActionContext, ActionError, AttackAction, AttackError, CardinalDirection,
    DamagePolicy, FixedDamage, MoveAction, MoveError, WaitAction,
};
pub use config::GameConfig;
pub use engine::{ActionPlanner, GameEngine, IdlePlanner, LoopState, StepOutcome, TurnReport};
pub use env::{MapDimensions, MapOracle, StaticTile, TerrainKind};
pub use error::{ErrorSeverity, GameError};
pub use event::GameEvent;
pub use state::{
    Drawable, EntityId, GameState, GameStatus, MonsterKind, Position, QuitSignal, RenderOrder,
    Tick, WorldSnapshot,
};
pub use store::{
    AiTag, BlocksMovement, Component, ComponentKind, ComponentSet, ComponentStore,
    ComponentValue, CorpseTag, Fov, Health, Name, PlayerTag, Renderable, Tint, TurnActor,
};
pub use turn::{CleanupMetrics, TurnEntry, TurnSchedule, TurnScheduler};
