//! Simulation worker that owns the authoritative [`game_core::GameState`].
//!
//! Receives commands from [`crate::RuntimeHandle`], runs the turn loop via
//! [`game_core::GameEngine`], and publishes [`Event`] notifications. Commands
//! are handled one at a time, so a quit never lands in the middle of an
//! action.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use game_core::{Action, ComponentKind, Fov, GameEngine, GameState, WorldSnapshot};

use crate::api::{Result, RuntimeError};
use crate::events::{Event, EventBus, TurnEvent};
use crate::oracle::GridMap;
use crate::providers::RandomWalkAi;

/// Commands that can be sent to the simulation worker
pub enum Command {
    /// Queue an action on an entity's turn actor. It runs on the entity's
    /// next turn, during a later [`Command::Advance`].
    SubmitAction {
        action: Action,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Run the turn loop until the player needs input or it otherwise stops.
    Advance {
        reply: oneshot::Sender<Result<TurnEvent>>,
    },
    /// Read-only copy of the world.
    QueryState { reply: oneshot::Sender<WorldSnapshot> },
    /// Stop the worker after replying.
    Quit { reply: oneshot::Sender<()> },
}

/// Background task that processes gameplay commands.
pub struct SimulationWorker {
    state: GameState,
    map: GridMap,
    planner: RandomWalkAi,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
}

impl SimulationWorker {
    /// Creates a new simulation worker.
    pub fn new(
        state: GameState,
        map: GridMap,
        planner: RandomWalkAi,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        let mut worker = Self {
            state,
            map,
            planner,
            command_rx,
            event_bus,
        };
        worker.refresh_fov();
        worker
    }

    /// Main worker loop.
    ///
    /// Events from world setup stay buffered in the state and go out with the
    /// first advance, so subscribers that attach after start still see them.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    if !self.handle_command(cmd) {
                        break;
                    }
                }
                else => break,
            }
        }
        info!(
            target: "runtime::worker",
            clock = %self.state.clock(),
            "simulation worker stopped"
        );
    }

    /// Returns false once the worker should stop.
    fn handle_command(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::SubmitAction { action, reply } => {
                let result = self.submit_action(action);
                let _ = reply.send(result);
            }
            Command::Advance { reply } => {
                let result = self.advance();
                let _ = reply.send(result);
            }
            Command::QueryState { reply } => {
                let _ = reply.send(self.state.snapshot());
            }
            Command::Quit { reply } => {
                self.state.quit_signal().request();
                debug!(target: "runtime::worker", "quit requested");
                let _ = reply.send(());
                return false;
            }
        }
        true
    }

    fn submit_action(&mut self, action: Action) -> Result<()> {
        if self.state.is_game_over() {
            return Err(RuntimeError::GameOver);
        }
        let entity = action.actor();
        if !self.state.queue_action(entity, action) {
            return Err(RuntimeError::ActionRejected { entity });
        }
        debug!(target: "runtime::worker", %entity, ?action, "action queued");
        Ok(())
    }

    fn advance(&mut self) -> Result<TurnEvent> {
        if self.state.player.is_none() {
            return Err(RuntimeError::NoPlayer);
        }

        let report = GameEngine::new(&mut self.state, &self.map).process_turns(&mut self.planner);
        if report.hit_iteration_limit {
            warn!(
                target: "runtime::worker",
                iterations = report.iterations,
                "advance stopped at the iteration limit"
            );
        }

        self.publish_game_events();
        self.refresh_fov();

        let turn = TurnEvent::from_report(&report, &self.state);
        debug!(
            target: "runtime::worker",
            clock = %turn.clock,
            state = %turn.state,
            executed = turn.actions_executed,
            failed = turn.actions_failed,
            "advanced"
        );
        self.event_bus.publish(Event::Turn(turn.clone()));
        Ok(turn)
    }

    fn publish_game_events(&mut self) {
        for event in self.state.drain_events() {
            self.event_bus.publish(Event::Game(event));
        }
    }

    /// Recomputes every field of view and marks what the player sees as
    /// explored.
    fn refresh_fov(&mut self) {
        let viewers = self
            .state
            .store
            .query(&[ComponentKind::Fov, ComponentKind::Position]);
        for viewer in viewers {
            let (Some(position), Some(fov)) = (
                self.state.store.position(viewer),
                self.state.store.get::<Fov>(viewer),
            ) else {
                continue;
            };
            let visible = if self.state.is_player(viewer) {
                self.map.reveal_around(position, fov.range)
            } else {
                self.map.visible_from(position, fov.range)
            };
            self.state
                .store
                .update::<Fov, _>(viewer, |fov| fov.visible = visible);
        }
    }
}

#[cfg(test)]
mod tests {
    use game_core::{
        CardinalDirection, GameConfig, GameEvent, LoopState, MonsterKind, Position, Tick,
    };

    use super::*;
    use crate::events::Topic;

    fn worker_with(state: GameState, map: GridMap) -> (SimulationWorker, mpsc::Sender<Command>) {
        let (tx, rx) = mpsc::channel(4);
        let worker = SimulationWorker::new(state, map, RandomWalkAi::from_seed(0), rx, EventBus::new());
        (worker, tx)
    }

    #[test]
    fn player_sees_and_explores_on_start() {
        let map = GridMap::bordered_room(9, 9).unwrap();
        let mut state = GameState::default();
        let player = state.spawn_player(Position::new(4, 4));
        let (worker, _tx) = worker_with(state, map);

        let fov = worker.state.store.get::<Fov>(player).unwrap();
        assert!(fov.is_visible(Position::new(4, 4)));
        assert!(fov.is_visible(Position::new(0, 0)));
        assert!(worker.map.is_explored(Position::new(8, 8)));
    }

    #[test]
    fn advance_without_player_is_an_error() {
        let map = GridMap::bordered_room(5, 5).unwrap();
        let (mut worker, _tx) = worker_with(GameState::default(), map);
        assert!(matches!(worker.advance(), Err(RuntimeError::NoPlayer)));
    }

    #[test]
    fn submitted_move_runs_on_next_advance() {
        let map = GridMap::bordered_room(7, 5).unwrap();
        let mut state = GameState::default();
        let player = state.spawn_player(Position::new(1, 1));
        state.spawn_monster(Position::new(5, 3), MonsterKind::Troll);
        let (mut worker, _tx) = worker_with(state, map);

        let first = worker.advance().unwrap();
        assert_eq!(first.state, LoopState::WaitingForPlayerInput);
        assert_eq!(first.clock, Tick(0));

        worker
            .submit_action(Action::move_in(player, CardinalDirection::East))
            .unwrap();
        let second = worker.advance().unwrap();
        assert_eq!(second.actions_executed, 1);
        assert_eq!(second.clock, Tick(100));
        assert!(second.waiting_for_input);
        assert_eq!(worker.state.store.position(player), Some(Position::new(2, 1)));
    }

    #[test]
    fn setup_events_wait_for_the_first_advance() {
        let map = GridMap::bordered_room(7, 5).unwrap();
        let mut state = GameState::default();
        let player = state.spawn_player(Position::new(1, 1));
        let bus = EventBus::new();
        let (_tx, rx) = mpsc::channel(4);
        let mut worker = SimulationWorker::new(state, map, RandomWalkAi::from_seed(0), rx, bus.clone());

        let mut game_rx = bus.subscribe(Topic::GameState);
        worker.advance().unwrap();

        assert!(matches!(
            game_rx.try_recv(),
            Ok(Event::Game(GameEvent::Spawned { entity, .. })) if entity == player
        ));
    }

    #[test]
    fn quit_stops_the_worker() {
        let map = GridMap::bordered_room(5, 5).unwrap();
        let mut state = GameState::default();
        state.spawn_player(Position::new(2, 2));
        let (mut worker, _tx) = worker_with(state, map);

        let (reply, _rx) = oneshot::channel();
        assert!(!worker.handle_command(Command::Quit { reply }));
        assert!(worker.state.is_quit_requested());
    }

    #[test]
    fn rejected_actions_report_the_entity() {
        let map = GridMap::bordered_room(5, 5).unwrap();
        let mut state = GameState::new(GameConfig::default());
        state.spawn_player(Position::new(2, 2));
        let (mut worker, _tx) = worker_with(state, map);

        let stranger = game_core::EntityId(999);
        assert!(matches!(
            worker.submit_action(Action::wait(stranger)),
            Err(RuntimeError::ActionRejected { entity }) if entity == stranger
        ));
    }
}
