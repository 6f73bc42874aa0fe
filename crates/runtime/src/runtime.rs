//! High-level runtime orchestrator.
//!
//! The runtime owns the simulation worker, wires up command/event channels,
//! and exposes a builder-based API for clients to drive the simulation.

use std::env;
use std::str::FromStr;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use game_core::{GameConfig, GameState};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::EventBus;
use crate::oracle::GridMap;
use crate::providers::RandomWalkAi;
use crate::scenario::Scenario;
use crate::workers::{Command, SimulationWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub game_config: GameConfig,
    /// Seeds both world generation and the AI.
    pub seed: u64,
    pub map_width: u32,
    pub map_height: u32,
    pub monster_count: usize,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game_config: GameConfig::default(),
            seed: 0x5eed,
            map_width: 40,
            map_height: 20,
            monster_count: 6,
            event_buffer_size: 100,
            command_buffer_size: 32,
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by any `DUNGEON_*` variables that parse.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(seed) = read_env("DUNGEON_SEED") {
            config.seed = seed;
        }
        if let Some(width) = read_env("DUNGEON_MAP_WIDTH") {
            config.map_width = width;
        }
        if let Some(height) = read_env("DUNGEON_MAP_HEIGHT") {
            config.map_height = height;
        }
        if let Some(monsters) = read_env("DUNGEON_MONSTERS") {
            config.monster_count = monsters;
        }
        if let Some(damage) = read_env("DUNGEON_ATTACK_DAMAGE") {
            config.game_config = config.game_config.with_attack_damage(damage);
        }
        if let Some(iterations) = read_env("DUNGEON_MAX_LOOP_ITERATIONS") {
            config.game_config = config.game_config.with_max_loop_iterations(iterations);
        }
        if let Some(threshold) = read_env("DUNGEON_CLEANUP_THRESHOLD") {
            config.game_config = config.game_config.with_cleanup_base_threshold(threshold);
        }

        config
    }

    pub fn scenario(&self) -> Scenario {
        Scenario::new(self.seed, self.map_width, self.map_height, self.monster_count)
    }

    fn validate(&self) -> Result<()> {
        if self.command_buffer_size == 0 {
            return Err(RuntimeError::InvalidConfig(
                "command_buffer_size must be at least 1".to_owned(),
            ));
        }
        if self.event_buffer_size == 0 {
            return Err(RuntimeError::InvalidConfig(
                "event_buffer_size must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

fn read_env<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok()?.parse().ok()
}

/// Main runtime that orchestrates game simulation
///
/// Runtime owns the worker task; [`RuntimeHandle`] provides a cloneable
/// façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    sim_worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Build a runtime from `config` with a generated world.
    pub async fn start(config: RuntimeConfig) -> Result<Self> {
        Self::builder().config(config).build().await
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Stop the worker and wait for it to finish.
    pub async fn shutdown(self) -> Result<()> {
        if let Err(error) = self.handle.quit().await {
            debug!(target: "runtime::worker", %error, "worker already stopped");
        }
        drop(self.handle);

        self.sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        info!(target: "runtime::worker", "runtime shut down");
        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    world: Option<(GameState, GridMap)>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            world: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Provide a prepared world instead of generating one from the config.
    pub fn world(mut self, state: GameState, map: GridMap) -> Self {
        self.world = Some((state, map));
        self
    }

    /// Build the runtime and spawn its worker.
    pub async fn build(self) -> Result<Runtime> {
        self.config.validate()?;

        let (state, map) = match self.world {
            Some(world) => world,
            None => self
                .config
                .scenario()
                .generate(self.config.game_config.clone())?,
        };

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let handle = RuntimeHandle::new(command_tx, event_bus.clone(), state.quit_signal());

        let sim_worker = SimulationWorker::new(
            state,
            map,
            RandomWalkAi::from_seed(self.config.seed),
            command_rx,
            event_bus,
        );

        let sim_worker_handle = tokio::spawn(async move {
            sim_worker.run().await;
        });

        info!(
            target: "runtime::worker",
            seed = self.config.seed,
            "runtime started"
        );

        Ok(Runtime {
            handle,
            sim_worker_handle,
        })
    }
}
