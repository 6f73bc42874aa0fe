use tracing::{debug, trace, warn};

use super::{ActionPlanner, GameEngine, LoopState, StepOutcome, TurnReport};
use crate::action::ActionContext;
use crate::error::GameError;
use crate::event::GameEvent;
use crate::state::{EntityId, Tick};
use crate::store::TurnActor;

impl GameEngine<'_> {
    /// Runs turns until the player needs input, the schedule empties, the
    /// game halts, or the configured iteration bound is reached.
    ///
    /// Reaching the bound is not an error but indicates entities that keep
    /// becoming eligible without the player ever getting a turn, so it is
    /// logged as a warning.
    pub fn process_turns(&mut self, planner: &mut dyn ActionPlanner) -> TurnReport {
        self.state.waiting_for_input = false;

        self.loop_state = LoopState::Cleaning;
        let cleanup = self
            .state
            .scheduler
            .cleanup_dead_entities(&self.state.store);
        self.state.scheduler.log_queue(&self.state.store);

        let mut report = TurnReport {
            cleanup,
            ..TurnReport::default()
        };
        let max_iterations = self.state.config.max_loop_iterations;

        while report.iterations < max_iterations {
            report.iterations += 1;
            let outcome = self.step(planner);
            match &outcome {
                StepOutcome::Acted { .. } => report.actions_executed += 1,
                StepOutcome::Failed { .. } => report.actions_failed += 1,
                _ => {}
            }
            if outcome.ends_loop() {
                report.state = self.loop_state;
                return report;
            }
        }

        warn!(
            target: "game_core::engine",
            iterations = report.iterations,
            clock = %self.state.clock(),
            queue_len = self.state.scheduler.len(),
            "turn loop hit its iteration limit"
        );
        report.hit_iteration_limit = true;
        self.loop_state = LoopState::Idle;
        report.state = self.loop_state;
        report
    }

    /// Runs exactly one iteration of the turn loop.
    pub fn step(&mut self, planner: &mut dyn ActionPlanner) -> StepOutcome {
        if self.state.is_quit_requested() || self.state.is_game_over() {
            debug!(target: "game_core::engine", status = ?self.state.status, "turn loop halted");
            self.loop_state = LoopState::Halted;
            return StepOutcome::Halted;
        }

        self.loop_state = LoopState::Dispatching;
        let Some(entry) = self.state.scheduler.next() else {
            debug!(target: "game_core::engine", "schedule is empty");
            self.loop_state = LoopState::Empty;
            return StepOutcome::Empty;
        };
        let entity = entry.entity;
        let clock = self.state.clock();

        if !self.can_take_turn(entity) {
            trace!(target: "game_core::engine", entity = %entity, "dropped entry of inactive entity");
            return StepOutcome::Dropped { entity };
        }

        let has_pending = self
            .state
            .store
            .get::<TurnActor>(entity)
            .is_some_and(|turn_actor| turn_actor.has_pending());

        if !has_pending {
            if self.state.is_player(entity) {
                self.state.scheduler.add(entity, entry.time);
                self.state.waiting_for_input = true;
                self.loop_state = LoopState::WaitingForPlayerInput;
                trace!(target: "game_core::engine", entity = %entity, clock = %clock, "waiting for player input");
                return StepOutcome::WaitingForInput { entity };
            }

            match planner.plan(entity, self.state, self.map) {
                Some(action) => {
                    self.state.queue_action(entity, action);
                }
                None => {
                    // Strictly later than now, so an idle entity can never spin.
                    let next = clock + self.standard_cost(entity);
                    self.state.scheduler.add(entity, next);
                    trace!(target: "game_core::engine", entity = %entity, next = %next, "idle");
                    return StepOutcome::Idled { entity, next };
                }
            }
        }

        let Some(action) = self
            .state
            .store
            .update::<TurnActor, _>(entity, |turn_actor| turn_actor.next_action())
            .flatten()
        else {
            let next = clock + self.standard_cost(entity);
            self.state.scheduler.add(entity, next);
            return StepOutcome::Idled { entity, next };
        };

        let result = {
            let mut ctx = ActionContext::new(self.state, self.map, &*self.damage);
            action.execute(&mut ctx)
        };

        match result {
            Ok(cost) => {
                let next = clock + cost;
                if self.can_take_turn(entity) {
                    self.state.scheduler.add(entity, next);
                }
                debug!(
                    target: "game_core::engine",
                    entity = %entity,
                    ?action,
                    cost = %cost,
                    next = %next,
                    "action executed"
                );
                StepOutcome::Acted {
                    entity,
                    action,
                    cost,
                }
            }
            Err(error) => {
                // The player retries immediately (and will normally be asked for
                // input again); everyone else backs off one standard action.
                let retry_at = if self.state.is_player(entity) {
                    clock
                } else {
                    clock + self.standard_cost(entity)
                };
                if self.can_take_turn(entity) {
                    self.state.scheduler.add(entity, retry_at);
                }

                let severity = error.severity();
                if severity.is_internal() {
                    warn!(
                        target: "game_core::engine",
                        entity = %entity,
                        ?action,
                        %error,
                        severity = severity.as_str(),
                        "action failed"
                    );
                } else {
                    debug!(
                        target: "game_core::engine",
                        entity = %entity,
                        ?action,
                        %error,
                        severity = severity.as_str(),
                        "action failed"
                    );
                }
                self.state.emit(GameEvent::ActionFailed {
                    entity,
                    code: error.error_code().to_owned(),
                    reason: error.to_string(),
                });

                StepOutcome::Failed {
                    entity,
                    action,
                    error,
                    retry_at,
                }
            }
        }
    }

    /// Entry-level check applied when an entry is popped: the entity still
    /// has a turn actor that has not been marked dead.
    fn can_take_turn(&self, entity: EntityId) -> bool {
        self.state
            .store
            .get::<TurnActor>(entity)
            .is_some_and(|turn_actor| turn_actor.alive)
    }

    fn standard_cost(&self, entity: EntityId) -> Tick {
        self.state
            .store
            .get::<TurnActor>(entity)
            .map(|turn_actor| turn_actor.speed)
            .filter(|speed| *speed > Tick::ZERO)
            .unwrap_or(self.state.config.standard_action_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::super::IdlePlanner;
    use super::*;
    use crate::action::{Action, CardinalDirection};
    use crate::config::GameConfig;
    use crate::env::{MapDimensions, MapOracle, StaticTile, TerrainKind};
    use crate::state::{GameState, GameStatus, MonsterKind, Position};
    use crate::store::{CorpseTag, Health, Renderable};
    use crate::turn::TurnEntry;

    struct OpenFloor;

    impl MapOracle for OpenFloor {
        fn dimensions(&self) -> MapDimensions {
            MapDimensions::new(10, 10)
        }

        fn tile(&self, position: Position) -> Option<StaticTile> {
            self.in_bounds(position)
                .then_some(StaticTile::new(TerrainKind::Floor))
        }
    }

    /// Always moves the entity east.
    struct EastWalker;

    impl ActionPlanner for EastWalker {
        fn plan(&mut self, entity: EntityId, _: &GameState, _: &dyn MapOracle) -> Option<Action> {
            Some(Action::move_in(entity, CardinalDirection::East))
        }
    }

    #[test]
    fn one_iteration_moves_and_reschedules() {
        let mut state = GameState::default();
        let id = state.store.create_entity();
        state.store.add(id, Position::new(1, 1));
        state.store.add(id, TurnActor::new(Tick(100)));
        state.scheduler.add(id, Tick(0));
        state.queue_action(id, Action::move_in(id, CardinalDirection::South));

        let map = OpenFloor;
        let mut engine = GameEngine::new(&mut state, &map);
        let outcome = engine.step(&mut IdlePlanner);

        assert!(matches!(outcome, StepOutcome::Acted { cost: Tick(100), .. }));
        assert_eq!(state.store.position(id), Some(Position::new(1, 2)));
        assert_eq!(state.scheduler.entries(), vec![TurnEntry::new(Tick(100), id)]);
    }

    #[test]
    fn player_without_action_waits_then_moves_on_next_call() {
        let mut state = GameState::default();
        let player = state.spawn_player(Position::new(2, 2));
        let map = OpenFloor;

        let report = GameEngine::new(&mut state, &map).process_turns(&mut IdlePlanner);
        assert_eq!(report.state, LoopState::WaitingForPlayerInput);
        assert!(state.is_waiting_for_input());
        assert_eq!(state.scheduler.entries(), vec![TurnEntry::new(Tick(0), player)]);
        assert_eq!(state.clock(), Tick(0));

        state.queue_action(player, Action::move_in(player, CardinalDirection::East));
        let report = GameEngine::new(&mut state, &map).process_turns(&mut IdlePlanner);

        assert_eq!(report.actions_executed, 1);
        assert!(report.is_waiting_for_input());
        assert_eq!(state.clock(), Tick(100));
        assert_eq!(state.store.position(player), Some(Position::new(3, 2)));
    }

    #[test]
    fn bump_attack_kills_monster_and_clears_it_from_schedule() {
        let mut state = GameState::default();
        let player = state.spawn_player(Position::new(2, 2));
        let orc = state.spawn_monster(Position::new(3, 2), MonsterKind::Orc);
        state.store.add(orc, Health::new(1));
        state.queue_action(player, Action::move_in(player, CardinalDirection::East));

        let map = OpenFloor;
        let report = GameEngine::new(&mut state, &map).process_turns(&mut IdlePlanner);

        // Bump (cost 0) then the queued attack (cost 100).
        assert_eq!(report.actions_executed, 2);
        assert!(state.store.has::<CorpseTag>(orc));
        assert_eq!(state.store.renderable(orc), Some(Renderable::CORPSE));
        assert!(!state.scheduler.contains(orc));
        assert_eq!(state.store.position(player), Some(Position::new(2, 2)));
        assert_eq!(state.clock(), Tick(100));
        assert!(report.is_waiting_for_input());
    }

    #[test]
    fn idle_monsters_always_make_forward_progress() {
        let config = GameConfig::default().with_max_loop_iterations(5);
        let mut state = GameState::new(config);
        let troll = state.spawn_monster(Position::new(1, 1), MonsterKind::Troll);
        let map = OpenFloor;

        let report = GameEngine::new(&mut state, &map).process_turns(&mut IdlePlanner);

        assert!(report.hit_iteration_limit);
        assert_eq!(report.iterations, 5);
        assert_eq!(report.state, LoopState::Idle);
        // First turn at 100, then one troll-speed step per idle.
        assert_eq!(state.clock(), Tick(100 + 4 * 200));
        assert_eq!(state.scheduler.entries(), vec![TurnEntry::new(Tick(1100), troll)]);
    }

    #[test]
    fn planner_drives_monsters_between_player_turns() {
        let mut state = GameState::default();
        let player = state.spawn_player(Position::new(0, 0));
        let kobold = state.spawn_monster(Position::new(0, 5), MonsterKind::Kobold);
        state.queue_action(player, Action::wait(player));
        state.queue_action(player, Action::wait(player));

        let map = OpenFloor;
        let report = GameEngine::new(&mut state, &map).process_turns(&mut EastWalker);

        // Player waits at 0 and 100; the kobold moves at 100 (after the player on
        // the tie) and is next due at 250, after the player waits for input at 200.
        assert!(report.is_waiting_for_input());
        assert_eq!(state.clock(), Tick(200));
        assert_eq!(state.store.position(kobold), Some(Position::new(1, 5)));
        assert_eq!(
            state.scheduler.entries(),
            vec![TurnEntry::new(Tick(200), player), TurnEntry::new(Tick(250), kobold)]
        );
    }

    #[test]
    fn failed_moves_retry_by_role() {
        let mut state = GameState::default();
        // Spawned first so it wins the tie with the player at time 100.
        let goblin = state.spawn_monster(Position::new(9, 9), MonsterKind::Goblin);
        let player = state.spawn_player(Position::new(0, 0));
        state.queue_action(player, Action::move_in(player, CardinalDirection::North));

        let map = OpenFloor;
        let mut engine = GameEngine::new(&mut state, &map);
        let outcome = engine.step(&mut IdlePlanner);
        assert!(matches!(outcome, StepOutcome::Failed { retry_at: Tick(0), .. }));

        engine.state_mut().queue_action(goblin, Action::move_in(goblin, CardinalDirection::East));
        engine.state_mut().queue_action(player, Action::wait(player));
        assert!(matches!(engine.step(&mut IdlePlanner), StepOutcome::Acted { .. }));
        let outcome = engine.step(&mut IdlePlanner);
        assert!(matches!(
            outcome,
            StepOutcome::Failed { entity, retry_at: Tick(200), .. } if entity == goblin
        ));
        assert_eq!(state.status, GameStatus::Ongoing);
    }

    #[test]
    fn dead_entries_are_dropped_without_reschedule() {
        let mut state = GameState::default();
        let ghost = state.store.create_entity();
        state.scheduler.add(ghost, Tick(0));

        let map = OpenFloor;
        let mut engine = GameEngine::new(&mut state, &map);
        assert_eq!(engine.step(&mut IdlePlanner), StepOutcome::Dropped { entity: ghost });
        assert_eq!(engine.step(&mut IdlePlanner), StepOutcome::Empty);
        assert_eq!(engine.loop_state(), LoopState::Empty);
    }

    #[test]
    fn quit_and_game_over_halt_between_iterations() {
        let mut state = GameState::default();
        let player = state.spawn_player(Position::new(0, 0));
        state.queue_action(player, Action::wait(player));
        let quit = state.quit_signal();
        quit.request();

        let map = OpenFloor;
        let report = GameEngine::new(&mut state, &map).process_turns(&mut IdlePlanner);
        assert_eq!(report.state, LoopState::Halted);
        assert_eq!(report.actions_executed, 0);

        let mut state = GameState::default();
        state.spawn_player(Position::new(0, 0));
        state.status = GameStatus::Lost;
        let report = GameEngine::new(&mut state, &map).process_turns(&mut IdlePlanner);
        assert_eq!(report.state, LoopState::Halted);
    }
}
