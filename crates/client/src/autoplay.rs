//! Headless player: hunts the nearest monster until the session ends.
use anyhow::Result;
use tracing::{debug, info};

use game_core::{
    Action, CardinalDirection, EntityId, LoopState, Position, RenderOrder, Tick, WorldSnapshot,
};
use runtime::{RuntimeError, RuntimeHandle};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSummary {
    pub turns_played: usize,
    pub clock: Tick,
    pub game_over: bool,
    pub entities: usize,
}

pub struct Autoplay {
    handle: RuntimeHandle,
    hunter: Hunter,
}

impl Autoplay {
    pub fn new(handle: RuntimeHandle) -> Self {
        Self {
            handle,
            hunter: Hunter::default(),
        }
    }

    /// Plays up to `max_turns` advances and summarises the final world.
    pub async fn run(mut self, max_turns: usize) -> Result<SessionSummary> {
        let mut turns_played = 0;

        while turns_played < max_turns {
            let turn = self.handle.advance().await?;
            turns_played += 1;

            if turn.game_over || matches!(turn.state, LoopState::Empty | LoopState::Halted) {
                info!(clock = %turn.clock, state = %turn.state, "session over");
                break;
            }
            if !turn.waiting_for_input {
                continue;
            }

            let snapshot = self.handle.query_state().await?;
            let Some(action) = self.hunter.choose(&snapshot) else {
                break;
            };
            match self.handle.submit_action(action).await {
                Ok(()) => {}
                Err(RuntimeError::GameOver) => break,
                Err(error) => return Err(error.into()),
            }
        }

        let snapshot = self.handle.query_state().await?;
        Ok(SessionSummary {
            turns_played,
            clock: snapshot.clock,
            game_over: snapshot.is_game_over(),
            entities: snapshot.entity_count,
        })
    }
}

/// Decision state carried between turns.
#[derive(Debug, Default)]
struct Hunter {
    /// Where the player stood before its last plain step. Bumps are not
    /// recorded: they leave the player in place on purpose.
    last_step_from: Option<Position>,
}

impl Hunter {
    fn choose(&mut self, snapshot: &WorldSnapshot) -> Option<Action> {
        let player = snapshot.player?;
        let position = snapshot.player_position?;
        let stuck = self.last_step_from == Some(position);

        let direction = if stuck {
            None
        } else {
            step_toward_nearest(snapshot, player, position)
        };
        self.last_step_from = direction
            .filter(|&direction| {
                let (dx, dy) = direction.delta();
                !holds_actor(snapshot, player, position.offset(dx, dy))
            })
            .map(|_| position);

        let action = direction.map_or_else(
            || Action::wait(player),
            |direction| Action::move_in(player, direction),
        );
        debug!(?action, %position, stuck, "autoplay chose");
        Some(action)
    }
}

fn holds_actor(snapshot: &WorldSnapshot, player: EntityId, position: Position) -> bool {
    snapshot.drawables.iter().any(|drawable| {
        drawable.order == RenderOrder::Actor
            && drawable.entity != player
            && drawable.position == position
    })
}

/// Direction of a step toward the nearest living actor, or `None` when no
/// single step gets closer.
fn step_toward_nearest(
    snapshot: &WorldSnapshot,
    player: EntityId,
    position: Position,
) -> Option<CardinalDirection> {
    let target = snapshot
        .drawables
        .iter()
        .filter(|drawable| drawable.order == RenderOrder::Actor && drawable.entity != player)
        .min_by_key(|drawable| (manhattan(position, drawable.position), drawable.entity))
        .map(|drawable| drawable.position);

    let target = target?;

    let current = manhattan(position, target);
    CardinalDirection::ALL
        .into_iter()
        .map(|direction| {
            let (dx, dy) = direction.delta();
            (manhattan(position.offset(dx, dy), target), direction)
        })
        .filter(|&(distance, _)| distance < current)
        .min_by_key(|&(distance, _)| distance)
        .map(|(_, direction)| direction)
}

fn manhattan(a: Position, b: Position) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

#[cfg(test)]
mod tests {
    use game_core::{Drawable, GameStatus, Tint};

    use super::*;

    const PLAYER: EntityId = EntityId(1);

    fn actor(entity: u64, x: i32, y: i32) -> Drawable {
        Drawable {
            entity: EntityId(entity),
            position: Position::new(x, y),
            glyph: 'o',
            tint: Tint::Monster,
            order: RenderOrder::Actor,
        }
    }

    fn snapshot(player_at: Position, drawables: Vec<Drawable>) -> WorldSnapshot {
        WorldSnapshot {
            clock: Tick(0),
            status: GameStatus::Ongoing,
            waiting_for_input: true,
            player: Some(PLAYER),
            player_position: Some(player_at),
            player_health: None,
            entity_count: drawables.len(),
            schedule: Vec::new(),
            drawables,
        }
    }

    #[test]
    fn heads_for_the_nearest_monster() {
        let here = Position::new(5, 5);
        let world = snapshot(here, vec![actor(1, 5, 5), actor(2, 9, 5), actor(3, 5, 3)]);
        assert_eq!(
            step_toward_nearest(&world, PLAYER, here),
            Some(CardinalDirection::North)
        );
    }

    #[test]
    fn corpses_are_not_targets() {
        let here = Position::new(2, 2);
        let mut corpse = actor(2, 3, 2);
        corpse.order = RenderOrder::Corpse;
        let world = snapshot(here, vec![actor(1, 2, 2), corpse]);
        assert_eq!(step_toward_nearest(&world, PLAYER, here), None);
    }

    #[test]
    fn adjacent_monster_is_bumped() {
        let here = Position::new(2, 2);
        let world = snapshot(here, vec![actor(1, 2, 2), actor(4, 1, 2)]);
        assert_eq!(
            step_toward_nearest(&world, PLAYER, here),
            Some(CardinalDirection::West)
        );
    }

    #[test]
    fn keeps_attacking_an_adjacent_monster() {
        let here = Position::new(2, 2);
        let world = snapshot(here, vec![actor(1, 2, 2), actor(4, 3, 2)]);
        let mut hunter = Hunter::default();

        let bump = Action::move_in(PLAYER, CardinalDirection::East);
        assert_eq!(hunter.choose(&world), Some(bump));
        // The bump left the player in place; that is not being stuck.
        assert_eq!(hunter.choose(&world), Some(bump));
    }

    #[test]
    fn waits_once_when_a_step_went_nowhere() {
        let here = Position::new(2, 2);
        let world = snapshot(here, vec![actor(1, 2, 2), actor(4, 5, 2)]);
        let mut hunter = Hunter::default();

        let step = Action::move_in(PLAYER, CardinalDirection::East);
        assert_eq!(hunter.choose(&world), Some(step));
        assert_eq!(hunter.choose(&world), Some(Action::wait(PLAYER)));
        assert_eq!(hunter.choose(&world), Some(step));
    }
}
