//! # Cycle Counter
//!
//! Counts completed cycles. The count only moves in the completion hook;
//! `advance()` merely asks the host for another cycle.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::scheduler::{CycleScheduler, WakeReason};

/// Index of a cycle: the number of cycles completed before it began.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cycle(u64);

impl Cycle {
    /// The first cycle.
    pub const ZERO: Self = Self(0);

    /// Creates a cycle index.
    #[inline]
    #[must_use]
    pub const fn new(index: u64) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns the cycle after this one.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Shared handle to the host's cycle counter.
///
/// Cheap to clone. All clones observe the same count.
///
/// ## Usage
///
/// ```rust,ignore
/// let counter = host.counter();
/// assert_eq!(counter.current(), Cycle::ZERO);
///
/// host.run_cycle(|_| ());
/// assert_eq!(counter.current().get(), 1);
///
/// // Ask for another cycle even though no state changed.
/// counter.advance();
/// assert!(host.has_pending_wake());
/// ```
#[derive(Clone, Debug)]
pub struct CycleCounter {
    completed: Arc<AtomicU64>,
    scheduler: CycleScheduler,
}

impl CycleCounter {
    pub(crate) fn new(scheduler: CycleScheduler) -> Self {
        Self {
            completed: Arc::new(AtomicU64::new(0)),
            scheduler,
        }
    }

    /// Number of cycles completed so far.
    #[inline]
    #[must_use]
    pub fn current(&self) -> Cycle {
        Cycle(self.completed.load(Ordering::Acquire))
    }

    /// Requests a new cycle.
    ///
    /// Does not touch the count. Repeated calls before the next cycle
    /// begins coalesce into a single wake.
    pub fn advance(&self) {
        self.scheduler.wake(WakeReason::Forced);
    }

    /// Completion hook. Returns the new count.
    pub(crate) fn complete(&self) -> Cycle {
        Cycle(self.completed.fetch_add(1, Ordering::AcqRel)).next()
    }
}
