//! The per-trigger turn driver.
//!
//! [`GameEngine`] borrows a [`GameState`] and a map for the duration of one
//! external trigger (a player input or a runtime tick) and runs the turn loop
//! until the player needs input, the schedule empties, the game halts, or the
//! iteration guard trips.

mod planner;
mod turn_loop;

pub use planner::{ActionPlanner, IdlePlanner};

use crate::action::{Action, ActionError, DamagePolicy, FixedDamage};
use crate::env::MapOracle;
use crate::state::{EntityId, GameState, Tick};
use crate::turn::CleanupMetrics;

/// Where the turn loop currently is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoopState {
    #[default]
    Idle,
    Cleaning,
    Dispatching,
    WaitingForPlayerInput,
    /// The schedule ran dry.
    Empty,
    /// Quit was requested or the game is over.
    Halted,
}

/// Result of a single loop iteration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Empty,
    Halted,
    /// The popped entity can no longer act; its entry was discarded.
    Dropped { entity: EntityId },
    /// The player popped with nothing queued and was put back at the same time.
    WaitingForInput { entity: EntityId },
    /// A non-player had nothing to do and was pushed to `next`.
    Idled { entity: EntityId, next: Tick },
    Acted {
        entity: EntityId,
        action: Action,
        cost: Tick,
    },
    Failed {
        entity: EntityId,
        action: Action,
        error: ActionError,
        retry_at: Tick,
    },
}

impl StepOutcome {
    /// Whether the loop should stop after this outcome.
    pub fn ends_loop(&self) -> bool {
        matches!(self, Self::Empty | Self::Halted | Self::WaitingForInput { .. })
    }
}

/// Summary of one [`GameEngine::process_turns`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnReport {
    pub state: LoopState,
    pub iterations: usize,
    pub actions_executed: usize,
    pub actions_failed: usize,
    pub cleanup: Option<CleanupMetrics>,
    pub hit_iteration_limit: bool,
}

impl TurnReport {
    pub fn is_waiting_for_input(&self) -> bool {
        self.state == LoopState::WaitingForPlayerInput
    }
}

pub struct GameEngine<'a> {
    state: &'a mut GameState,
    map: &'a dyn MapOracle,
    damage: Box<dyn DamagePolicy>,
    loop_state: LoopState,
}

impl<'a> GameEngine<'a> {
    /// Creates an engine using the configured fixed damage.
    pub fn new(state: &'a mut GameState, map: &'a dyn MapOracle) -> Self {
        let damage = Box::new(FixedDamage::from_config(&state.config));
        Self {
            state,
            map,
            damage,
            loop_state: LoopState::Idle,
        }
    }

    pub fn with_damage_policy(mut self, damage: impl DamagePolicy + 'static) -> Self {
        self.damage = Box::new(damage);
        self
    }

    pub fn loop_state(&self) -> LoopState {
        self.loop_state
    }

    pub fn state(&self) -> &GameState {
        self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        self.state
    }
}
