//! Turn ordering.
//!
//! [`TurnSchedule`] is the bare min-heap of `(time, entity)` entries.
//! [`TurnScheduler`] wraps it with the simulation clock and the amortized
//! garbage collection that drops entries of entities which can no longer act.
mod schedule;
mod scheduler;

pub use schedule::{TurnEntry, TurnSchedule};
pub use scheduler::{CleanupMetrics, TurnScheduler};
