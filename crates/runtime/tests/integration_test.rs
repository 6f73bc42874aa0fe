use std::time::Duration;

use game_core::{
    Action, CardinalDirection, EntityId, GameConfig, GameEvent, GameState, LoopState,
    MonsterKind, Position, Tick,
};
use runtime::{Event, GridMap, Runtime, RuntimeConfig, RuntimeError, Topic};
use tokio::sync::broadcast;

const PLAYER_START: Position = Position::new(1, 1);

/// Small hand-built world: a 7x5 room populated by `populate`. Spawn order
/// decides entity ids, and with them who wins ties in the schedule.
fn small_world(config: GameConfig, populate: impl FnOnce(&mut GameState)) -> (GameState, GridMap) {
    let map = GridMap::bordered_room(7, 5).expect("room should build");
    let mut state = GameState::new(config);
    populate(&mut state);
    (state, map)
}

async fn next_event(rx: &mut broadcast::Receiver<Event>) -> Event {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("event should arrive")
        .expect("bus should stay open")
}

/// Reads game events until one matches, skipping spawn notices and the like.
async fn wait_for_game_event(
    rx: &mut broadcast::Receiver<Event>,
    mut matches: impl FnMut(&GameEvent) -> bool,
) -> GameEvent {
    loop {
        if let Event::Game(event) = next_event(rx).await
            && matches(&event)
        {
            return event;
        }
    }
}

#[tokio::test]
async fn generated_world_starts_at_time_zero() {
    let config = RuntimeConfig {
        monster_count: 4,
        ..RuntimeConfig::default()
    };
    let runtime = Runtime::start(config).await.expect("runtime should start");
    let handle = runtime.handle();

    let snapshot = handle.query_state().await.unwrap();
    assert!(snapshot.player.is_some());
    assert_eq!(snapshot.entity_count, 5);
    assert_eq!(snapshot.clock, Tick(0));
    assert!(!snapshot.waiting_for_input);
    assert_eq!(snapshot.schedule.len(), 5);
    assert_eq!(snapshot.schedule[0].entity, snapshot.player.unwrap());

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn first_advance_waits_for_the_player() {
    let runtime = Runtime::start(RuntimeConfig::default()).await.unwrap();
    let handle = runtime.handle();
    let mut turns = handle.subscribe(Topic::Turn);

    let turn = handle.advance().await.unwrap();
    assert_eq!(turn.state, LoopState::WaitingForPlayerInput);
    assert_eq!(turn.clock, Tick(0));
    assert_eq!(turn.actions_executed, 0);
    assert!(turn.waiting_for_input);

    assert_eq!(next_event(&mut turns).await, Event::Turn(turn));
    assert!(handle.query_state().await.unwrap().waiting_for_input);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn submitted_move_runs_on_the_next_advance() {
    let (state, map) = small_world(GameConfig::default(), |state| {
        state.spawn_player(PLAYER_START);
        state.spawn_monster(Position::new(5, 3), MonsterKind::Orc);
    });
    let runtime = Runtime::builder().world(state, map).build().await.unwrap();
    let handle = runtime.handle();
    let mut game = handle.subscribe(Topic::GameState);

    handle.advance().await.unwrap();
    let player = handle.query_state().await.unwrap().player.unwrap();

    handle
        .submit_action(Action::move_in(player, CardinalDirection::East))
        .await
        .unwrap();
    let turn = handle.advance().await.unwrap();
    assert_eq!(turn.actions_executed, 1);
    assert_eq!(turn.clock, Tick(100));
    assert!(turn.waiting_for_input);

    let moved = wait_for_game_event(&mut game, |event| matches!(event, GameEvent::Moved { .. })).await;
    assert_eq!(
        moved,
        GameEvent::Moved {
            entity: player,
            from: PLAYER_START,
            to: Position::new(2, 1),
        }
    );

    let snapshot = handle.query_state().await.unwrap();
    assert_eq!(snapshot.player_position, Some(Position::new(2, 1)));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn bumping_a_monster_attacks_and_leaves_a_corpse() {
    let config = GameConfig::default().with_attack_damage(5);
    let (state, map) = small_world(config, |state| {
        state.spawn_player(PLAYER_START);
        state.spawn_monster(Position::new(2, 1), MonsterKind::Goblin);
    });
    let runtime = Runtime::builder().world(state, map).build().await.unwrap();
    let handle = runtime.handle();
    let mut game = handle.subscribe(Topic::GameState);

    handle.advance().await.unwrap();
    let player = handle.query_state().await.unwrap().player.unwrap();
    handle
        .submit_action(Action::move_in(player, CardinalDirection::East))
        .await
        .unwrap();
    let turn = handle.advance().await.unwrap();

    // The bump itself, then the attack it queued.
    assert_eq!(turn.actions_executed, 2);
    assert_eq!(turn.clock, Tick(100));

    let died = wait_for_game_event(&mut game, |event| matches!(event, GameEvent::Died { .. })).await;
    assert_eq!(
        died,
        GameEvent::Died {
            entity: EntityId(2),
            name: "Goblin".to_owned(),
        }
    );

    let snapshot = handle.query_state().await.unwrap();
    assert_eq!(snapshot.schedule.len(), 1);
    assert_eq!(snapshot.schedule[0].entity, player);
    assert_eq!(snapshot.player_position, Some(PLAYER_START));
    assert_eq!(
        snapshot.drawable_at(Position::new(2, 1)).map(|d| d.glyph),
        Some('%')
    );

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn player_death_ends_the_game() {
    let config = GameConfig::default().with_attack_damage(20);
    // The troll is created first so it wins the tie at time 100.
    let (state, map) = small_world(config, |state| {
        state.spawn_monster(Position::new(2, 1), MonsterKind::Troll);
        state.spawn_player(PLAYER_START);
    });
    let runtime = Runtime::builder().world(state, map).build().await.unwrap();
    let handle = runtime.handle();

    handle.advance().await.unwrap();
    let player = handle.query_state().await.unwrap().player.unwrap();
    handle.submit_action(Action::wait(player)).await.unwrap();

    let turn = handle.advance().await.unwrap();
    assert!(turn.game_over);
    assert_eq!(turn.state, LoopState::Halted);

    let snapshot = handle.query_state().await.unwrap();
    assert!(snapshot.is_game_over());
    assert!(snapshot.schedule.iter().all(|entry| entry.entity != player));

    let result = handle.submit_action(Action::wait(player)).await;
    assert!(matches!(result, Err(RuntimeError::GameOver)));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn actions_for_unknown_entities_are_rejected() {
    let runtime = Runtime::start(RuntimeConfig::default()).await.unwrap();
    let handle = runtime.handle();

    let stranger = EntityId(10_000);
    let result = handle.submit_action(Action::wait(stranger)).await;
    assert!(matches!(
        result,
        Err(RuntimeError::ActionRejected { entity }) if entity == stranger
    ));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn quit_stops_the_worker() {
    let runtime = Runtime::start(RuntimeConfig::default()).await.unwrap();
    let handle = runtime.handle();

    handle.quit().await.unwrap();
    assert!(handle.is_quit_requested());

    let result = handle.query_state().await;
    assert!(matches!(
        result,
        Err(RuntimeError::CommandChannelClosed | RuntimeError::ReplyChannelClosed(_))
    ));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn same_seed_replays_the_same_session() {
    let config = RuntimeConfig {
        seed: 2024,
        map_width: 16,
        map_height: 10,
        monster_count: 5,
        ..RuntimeConfig::default()
    };
    let first = Runtime::start(config.clone()).await.unwrap();
    let second = Runtime::start(config).await.unwrap();
    let (a, b) = (first.handle(), second.handle());

    for _ in 0..8 {
        for handle in [&a, &b] {
            let snapshot = handle.query_state().await.unwrap();
            if snapshot.is_game_over() {
                continue;
            }
            let player = snapshot.player.unwrap();
            handle.submit_action(Action::wait(player)).await.unwrap();
            handle.advance().await.unwrap();
        }
        assert_eq!(a.query_state().await.unwrap(), b.query_state().await.unwrap());
    }

    first.shutdown().await.unwrap();
    second.shutdown().await.unwrap();
}

#[tokio::test]
async fn invalid_configs_fail_to_start() {
    let tiny = RuntimeConfig {
        map_width: 2,
        ..RuntimeConfig::default()
    };
    assert!(matches!(
        Runtime::start(tiny).await,
        Err(RuntimeError::Map(_))
    ));

    let no_buffer = RuntimeConfig {
        command_buffer_size: 0,
        ..RuntimeConfig::default()
    };
    assert!(matches!(
        Runtime::start(no_buffer).await,
        Err(RuntimeError::InvalidConfig(_))
    ));
}

#[test]
fn events_serialize_for_logging() {
    let event = Event::Game(GameEvent::PlayerDied { entity: EntityId(1) });
    let json = serde_json::to_string(&event).unwrap();
    let back: Event = serde_json::from_str(&json).unwrap();
    assert_eq!(back, event);
}
