use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::state::{EntityId, Tick};

/// One scheduled turn: `entity` may act once the clock reaches `time`.
///
/// Field order matters: the derived ordering compares `time` first and breaks
/// ties on `entity`, which is what makes turn order reproducible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnEntry {
    pub time: Tick,
    pub entity: EntityId,
}

impl TurnEntry {
    pub const fn new(time: Tick, entity: EntityId) -> Self {
        Self { time, entity }
    }
}

/// Min-heap of [`TurnEntry`] values.
#[derive(Clone, Debug, Default)]
pub struct TurnSchedule {
    heap: BinaryHeap<Reverse<TurnEntry>>,
}

impl TurnSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: TurnEntry) {
        self.heap.push(Reverse(entry));
    }

    pub fn pop(&mut self) -> Option<TurnEntry> {
        self.heap.pop().map(|Reverse(entry)| entry)
    }

    pub fn peek(&self) -> Option<TurnEntry> {
        self.heap.peek().map(|Reverse(entry)| *entry)
    }

    /// Removes every entry belonging to `entity` and returns how many were dropped.
    pub fn remove(&mut self, entity: EntityId) -> usize {
        let before = self.heap.len();
        self.heap.retain(|Reverse(entry)| entry.entity != entity);
        before - self.heap.len()
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.heap.iter().any(|Reverse(entry)| entry.entity == entity)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Entries in the order they would be popped. Does not modify the heap.
    pub fn sorted(&self) -> Vec<TurnEntry> {
        let mut entries: Vec<TurnEntry> = self.heap.iter().map(|Reverse(entry)| *entry).collect();
        entries.sort_unstable();
        entries
    }

    /// Empties the schedule, yielding entries in pop order.
    pub fn drain_sorted(&mut self) -> std::vec::IntoIter<TurnEntry> {
        let mut entries: Vec<TurnEntry> = self.heap.drain().map(|Reverse(entry)| entry).collect();
        entries.sort_unstable();
        entries.into_iter()
    }
}

impl FromIterator<TurnEntry> for TurnSchedule {
    fn from_iter<I: IntoIterator<Item = TurnEntry>>(iter: I) -> Self {
        Self {
            heap: iter.into_iter().map(Reverse).collect(),
        }
    }
}
