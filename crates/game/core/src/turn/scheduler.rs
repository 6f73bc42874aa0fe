use std::fmt;
use std::time::{Duration, Instant};

use tracing::{Level, debug, enabled, info, trace};

use super::schedule::{TurnEntry, TurnSchedule};
use crate::config::GameConfig;
use crate::state::{EntityId, Tick};
use crate::store::{ComponentStore, CorpseTag, Health, TurnActor};

/// Cleanups that drop more entries than this are logged at info level.
const NOISY_CLEANUP: usize = 10;

/// Outcome of one schedule rebuild.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CleanupMetrics {
    pub entities_removed: usize,
    pub queue_size_before: usize,
    pub queue_size_after: usize,
    pub processing_time: Duration,
}

impl fmt::Display for CleanupMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "removed {} entities ({} -> {}) in {:?}",
            self.entities_removed, self.queue_size_before, self.queue_size_after, self.processing_time
        )
    }
}

/// Owns the simulation clock and the schedule, and decides whose turn is next.
#[derive(Clone, Debug)]
pub struct TurnScheduler {
    clock: Tick,
    schedule: TurnSchedule,
    base_threshold: u32,
    operations_since_cleanup: u32,
    total_cleanups: u64,
    total_entities_removed: u64,
}

impl Default for TurnScheduler {
    fn default() -> Self {
        Self::new(&GameConfig::default())
    }
}

impl TurnScheduler {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            clock: Tick::ZERO,
            schedule: TurnSchedule::new(),
            base_threshold: config.cleanup_base_threshold,
            operations_since_cleanup: 0,
            total_cleanups: 0,
            total_entities_removed: 0,
        }
    }

    pub fn clock(&self) -> Tick {
        self.clock
    }

    /// Schedules `entity` to act at `time`. The entity is not validated here;
    /// invalid entries are dropped when popped or during cleanup.
    pub fn add(&mut self, entity: EntityId, time: Tick) {
        trace!(target: "game_core::turn", entity = %entity, time = %time, "scheduled");
        self.schedule.push(TurnEntry::new(time, entity));
    }

    /// Pops the earliest entry and advances the clock to its time.
    ///
    /// The clock never moves backwards: an entry scheduled in the past (only
    /// possible if a caller added one) leaves the clock where it is.
    pub fn next(&mut self) -> Option<TurnEntry> {
        let entry = self.schedule.pop()?;
        self.clock = self.clock.max(entry.time);
        Some(entry)
    }

    pub fn peek(&self) -> Option<TurnEntry> {
        self.schedule.peek()
    }

    /// Drops every pending entry of `entity`. Returns how many were removed.
    pub fn remove(&mut self, entity: EntityId) -> usize {
        let removed = self.schedule.remove(entity);
        if removed > 0 {
            debug!(target: "game_core::turn", entity = %entity, removed, "removed from schedule");
        }
        removed
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.schedule.contains(entity)
    }

    pub fn len(&self) -> usize {
        self.schedule.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedule.is_empty()
    }

    /// Pending entries in processing order.
    pub fn entries(&self) -> Vec<TurnEntry> {
        self.schedule.sorted()
    }

    pub fn total_cleanups(&self) -> u64 {
        self.total_cleanups
    }

    pub fn total_entities_removed(&self) -> u64 {
        self.total_entities_removed
    }

    pub fn operations_since_cleanup(&self) -> u32 {
        self.operations_since_cleanup
    }

    /// Whether `id` may still take turns.
    ///
    /// Every "can this entity act" decision goes through here: the entity
    /// exists, has a turn actor, is not a corpse, and has positive health.
    pub fn is_valid_turn_actor(store: &ComponentStore, id: EntityId) -> bool {
        store.entity_exists(id)
            && store.has::<TurnActor>(id)
            && !store.has::<CorpseTag>(id)
            && store.get::<Health>(id).is_some_and(|health| !health.is_dead())
    }

    /// Operations allowed between rebuilds, scaled by world size.
    ///
    /// Large worlds or long schedules clean twice as often; small ones half as often.
    pub fn cleanup_threshold(&self, store: &ComponentStore) -> u32 {
        let entity_count = store.entity_count();
        let queue_size = self.schedule.len();

        if entity_count > 1000 || queue_size > 500 {
            self.base_threshold / 2
        } else if entity_count < 100 && queue_size < 50 {
            self.base_threshold.saturating_mul(2)
        } else {
            self.base_threshold
        }
    }

    /// Counts one operation and rebuilds the schedule once the count reaches
    /// the current threshold. Returns `None` when no rebuild ran.
    pub fn cleanup_dead_entities(&mut self, store: &ComponentStore) -> Option<CleanupMetrics> {
        let threshold = self.cleanup_threshold(store);
        if self.operations_since_cleanup < threshold {
            self.operations_since_cleanup += 1;
            return None;
        }
        Some(self.rebuild(store))
    }

    /// Drains the schedule and keeps only entries whose entity is still a
    /// valid turn actor. Always runs, regardless of the operation counter.
    pub fn rebuild(&mut self, store: &ComponentStore) -> CleanupMetrics {
        let started = Instant::now();
        let queue_size_before = self.schedule.len();

        let mut kept = Vec::with_capacity(queue_size_before);
        let mut entities_removed = 0;
        for entry in self.schedule.drain_sorted() {
            if Self::is_valid_turn_actor(store, entry.entity) {
                kept.push(entry);
            } else {
                entities_removed += 1;
                debug!(
                    target: "game_core::turn",
                    entity = %entry.entity,
                    name = %store.display_name(entry.entity),
                    "dropped invalid entry from schedule"
                );
            }
        }
        self.schedule = kept.into_iter().collect();

        self.operations_since_cleanup = 0;
        self.total_cleanups += 1;
        self.total_entities_removed += entities_removed as u64;

        let metrics = CleanupMetrics {
            entities_removed,
            queue_size_before,
            queue_size_after: self.schedule.len(),
            processing_time: started.elapsed(),
        };

        if entities_removed > NOISY_CLEANUP {
            info!(target: "game_core::turn", %metrics, "schedule cleanup");
        } else {
            debug!(target: "game_core::turn", %metrics, "schedule cleanup");
        }
        metrics
    }

    /// Pending entries in processing order, each with its offset from the clock.
    pub fn queue_deltas(&self) -> Vec<(TurnEntry, i64)> {
        self.schedule
            .sorted()
            .into_iter()
            .map(|entry| (entry, entry.time.get() as i64 - self.clock.get() as i64))
            .collect()
    }

    /// Dumps the schedule in processing order at debug level.
    pub fn log_queue(&self, store: &ComponentStore) {
        if !enabled!(target: "game_core::turn", Level::DEBUG) {
            return;
        }
        debug!(
            target: "game_core::turn",
            clock = %self.clock,
            len = self.schedule.len(),
            "schedule dump"
        );
        for (index, (entry, delta)) in self.queue_deltas().into_iter().enumerate() {
            debug!(
                target: "game_core::turn",
                index,
                entity = %entry.entity,
                name = %store.display_name(entry.entity),
                time = %entry.time,
                delta,
                "schedule entry"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Position;
    use crate::store::AiTag;

    fn spawn_actor(store: &ComponentStore, hp: i32) -> EntityId {
        let id = store.create_entity();
        store.add(id, TurnActor::new(Tick(100)));
        store.add(id, Health::new(hp));
        id
    }

    #[test]
    fn single_entry_pops_and_empties() {
        let mut scheduler = TurnScheduler::default();
        scheduler.add(EntityId(1), Tick(0));

        assert_eq!(scheduler.next(), Some(TurnEntry::new(Tick(0), EntityId(1))));
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.next(), None);
    }

    #[test]
    fn clock_is_monotonic() {
        let mut scheduler = TurnScheduler::default();
        scheduler.add(EntityId(1), Tick(300));
        scheduler.add(EntityId(2), Tick(100));
        scheduler.add(EntityId(3), Tick(100));

        let mut last = scheduler.clock();
        scheduler.next();
        assert!(scheduler.clock() >= last);
        last = scheduler.clock();

        // A late entry in the past must not rewind the clock.
        scheduler.add(EntityId(4), Tick(50));
        while scheduler.next().is_some() {
            assert!(scheduler.clock() >= last);
            last = scheduler.clock();
        }
        assert_eq!(scheduler.clock(), Tick(300));
    }

    #[test]
    fn validity_predicate_covers_every_disqualifier() {
        let store = ComponentStore::new();
        let valid = spawn_actor(&store, 3);

        let corpse = spawn_actor(&store, 3);
        store.add(corpse, CorpseTag);

        let dead = spawn_actor(&store, 0);

        let no_actor = store.create_entity();
        store.add(no_actor, Health::new(3));

        let no_health = store.create_entity();
        store.add(no_health, TurnActor::new(Tick(100)));

        assert!(TurnScheduler::is_valid_turn_actor(&store, valid));
        assert!(!TurnScheduler::is_valid_turn_actor(&store, corpse));
        assert!(!TurnScheduler::is_valid_turn_actor(&store, dead));
        assert!(!TurnScheduler::is_valid_turn_actor(&store, no_actor));
        assert!(!TurnScheduler::is_valid_turn_actor(&store, no_health));
        assert!(!TurnScheduler::is_valid_turn_actor(&store, EntityId(999)));
    }

    #[test]
    fn threshold_adapts_to_population() {
        let store = ComponentStore::new();
        let mut scheduler = TurnScheduler::default();
        assert_eq!(scheduler.cleanup_threshold(&store), 200);

        for i in 0..100 {
            scheduler.add(EntityId(i), Tick(0));
        }
        assert_eq!(scheduler.cleanup_threshold(&store), 100);

        for i in 0..501 {
            scheduler.add(EntityId(i), Tick(0));
        }
        assert_eq!(scheduler.cleanup_threshold(&store), 50);
    }

    #[test]
    fn cleanup_waits_for_threshold() {
        let store = ComponentStore::new();
        let dead = spawn_actor(&store, 0);
        let config = GameConfig::default().with_cleanup_base_threshold(5);
        let mut scheduler = TurnScheduler::new(&config);
        scheduler.add(dead, Tick(10));

        // Small world, so the base doubles.
        let threshold = scheduler.cleanup_threshold(&store);
        assert_eq!(threshold, 10);
        for _ in 0..threshold {
            assert_eq!(scheduler.cleanup_dead_entities(&store), None);
        }
        assert_eq!(scheduler.len(), 1);

        let metrics = scheduler.cleanup_dead_entities(&store).unwrap();
        assert_eq!(metrics.entities_removed, 1);
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.operations_since_cleanup(), 0);
        assert_eq!(scheduler.total_cleanups(), 1);
    }

    #[test]
    fn rebuild_keeps_exactly_the_valid_entries() {
        let store = ComponentStore::new();
        let alive = spawn_actor(&store, 2);
        let other = spawn_actor(&store, 2);
        let corpse = spawn_actor(&store, 2);
        store.add(corpse, CorpseTag);
        let gone = spawn_actor(&store, 2);
        store.destroy_entity(gone);

        let mut scheduler = TurnScheduler::default();
        scheduler.add(other, Tick(5));
        scheduler.add(corpse, Tick(1));
        scheduler.add(alive, Tick(5));
        scheduler.add(gone, Tick(3));
        scheduler.add(alive, Tick(7));

        let metrics = scheduler.rebuild(&store);

        assert_eq!(metrics.entities_removed, 2);
        assert_eq!(metrics.queue_size_before, 5);
        assert_eq!(metrics.queue_size_after, 3);
        assert_eq!(
            scheduler.entries(),
            vec![
                TurnEntry::new(Tick(5), alive),
                TurnEntry::new(Tick(5), other),
                TurnEntry::new(Tick(7), alive),
            ]
        );
        assert_eq!(scheduler.next(), Some(TurnEntry::new(Tick(5), alive)));
    }

    #[test]
    fn large_population_cleanup_removes_the_dead_half() {
        let store = ComponentStore::new();
        let mut scheduler = TurnScheduler::default();

        let ids: Vec<_> = (0..1000)
            .map(|i| {
                let id = spawn_actor(&store, 1);
                store.add(id, AiTag);
                store.add(id, Position::new(i % 40, i / 40));
                scheduler.add(id, Tick(i as u64));
                id
            })
            .collect();
        for id in ids.iter().step_by(2) {
            store.update::<Health, _>(*id, |health| health.current = 0);
        }

        assert_eq!(scheduler.cleanup_threshold(&store), 50);
        let metrics = std::iter::repeat_with(|| scheduler.cleanup_dead_entities(&store))
            .take(100)
            .flatten()
            .next()
            .unwrap();

        assert_eq!(metrics.entities_removed, 500);
        assert_eq!(metrics.queue_size_before, 1000);
        assert_eq!(metrics.queue_size_after, 500);
        assert_eq!(scheduler.len(), 500);
        assert!(
            scheduler
                .entries()
                .iter()
                .all(|entry| TurnScheduler::is_valid_turn_actor(&store, entry.entity))
        );
        assert_eq!(scheduler.total_entities_removed(), 500);
    }

    #[test]
    fn queue_deltas_are_relative_to_the_clock() {
        let store = ComponentStore::new();
        let mut scheduler = TurnScheduler::default();
        scheduler.add(EntityId(1), Tick(100));
        scheduler.add(EntityId(2), Tick(250));
        scheduler.add(EntityId(3), Tick(40));
        scheduler.next();
        scheduler.log_queue(&store);

        assert_eq!(
            scheduler.queue_deltas(),
            vec![
                (TurnEntry::new(Tick(100), EntityId(1)), 60),
                (TurnEntry::new(Tick(250), EntityId(2)), 210),
            ]
        );
    }

    #[test]
    fn remove_returns_count() {
        let mut scheduler = TurnScheduler::default();
        scheduler.add(EntityId(1), Tick(1));
        scheduler.add(EntityId(1), Tick(2));
        scheduler.add(EntityId(2), Tick(2));

        assert_eq!(scheduler.remove(EntityId(1)), 2);
        assert!(!scheduler.contains(EntityId(1)));
        assert_eq!(scheduler.len(), 1);
    }
}
