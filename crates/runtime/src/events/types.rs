use serde::{Deserialize, Serialize};

use game_core::{GameState, LoopState, Tick, TurnReport};

/// Summary of one advance of the turn loop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnEvent {
    /// Simulation clock after the advance.
    pub clock: Tick,
    pub state: LoopState,
    pub iterations: usize,
    pub actions_executed: usize,
    pub actions_failed: usize,
    /// Entries dropped by the cleanup pass, if one ran.
    pub cleanup_removed: Option<usize>,
    pub hit_iteration_limit: bool,
    pub waiting_for_input: bool,
    pub game_over: bool,
}

impl TurnEvent {
    pub fn from_report(report: &TurnReport, state: &GameState) -> Self {
        Self {
            clock: state.clock(),
            state: report.state,
            iterations: report.iterations,
            actions_executed: report.actions_executed,
            actions_failed: report.actions_failed,
            cleanup_removed: report.cleanup.map(|metrics| metrics.entities_removed),
            hit_iteration_limit: report.hit_iteration_limit,
            waiting_for_input: state.is_waiting_for_input(),
            game_over: state.is_game_over(),
        }
    }
}
