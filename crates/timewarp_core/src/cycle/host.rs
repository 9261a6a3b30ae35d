//! # Cycle Host
//!
//! The collaborator that owns the counter, the wake queue and every cell
//! registered against it, and that actually runs cycles.
//!
//! ## Design
//!
//! A cycle:
//! - Consumes the outstanding wake
//! - Commits every staged cell update, in submission order
//! - Runs the component body against that snapshot
//! - Advances the counter, then lets fresh readers mirror the result

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::trace;

use super::counter::{Cycle, CycleCounter};
use super::scheduler::{CycleScheduler, WakeReason};
use super::CycleParticipant;
use crate::cell::{FreshStateCell, ScopedCell};
use crate::config::HostConfig;
use crate::error::{CoreError, CoreResult};

/// View of the running cycle handed to the component body.
#[derive(Debug)]
pub struct CycleFrame {
    cycle: Cycle,
    counter: CycleCounter,
}

impl CycleFrame {
    /// Index of the running cycle (cycles completed before it).
    #[inline]
    #[must_use]
    pub fn cycle(&self) -> Cycle {
        self.cycle
    }

    /// Returns whether this is the very first cycle.
    #[inline]
    #[must_use]
    pub fn is_first(&self) -> bool {
        self.cycle == Cycle::ZERO
    }

    /// Requests one more cycle after this one.
    pub fn advance(&self) {
        self.counter.advance();
    }

    /// The host's counter, for capture into async continuations.
    #[must_use]
    pub fn counter(&self) -> CycleCounter {
        self.counter.clone()
    }
}

/// Drives cycles for one component.
///
/// ## Usage
///
/// ```rust,ignore
/// let host = CycleHost::new();
/// let score = host.fresh_cell(0u32);
///
/// score.set(10);
/// host.run_until_idle(|frame| {
///     // component logic, sees a consistent snapshot
/// })?;
///
/// assert_eq!(score.get_fresh(), 10);
/// ```
pub struct CycleHost {
    counter: CycleCounter,
    scheduler: CycleScheduler,
    participants: Mutex<Vec<Weak<dyn CycleParticipant>>>,
    config: HostConfig,
}

impl Default for CycleHost {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleHost {
    /// Creates a host with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(HostConfig::default())
    }

    /// Creates a host with the given configuration.
    #[must_use]
    pub fn with_config(config: HostConfig) -> Self {
        let scheduler = CycleScheduler::new();
        Self {
            counter: CycleCounter::new(scheduler.clone()),
            scheduler,
            participants: Mutex::new(Vec::new()),
            config,
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Returns a handle to the cycle counter.
    #[must_use]
    pub fn counter(&self) -> CycleCounter {
        self.counter.clone()
    }

    /// Returns a handle to the wake queue.
    #[must_use]
    pub fn scheduler(&self) -> CycleScheduler {
        self.scheduler.clone()
    }

    /// Returns the number of cycles completed so far.
    #[inline]
    #[must_use]
    pub fn current_cycle(&self) -> Cycle {
        self.counter.current()
    }

    /// Returns whether someone asked for another cycle.
    #[inline]
    #[must_use]
    pub fn has_pending_wake(&self) -> bool {
        self.scheduler.is_wake_pending()
    }

    /// Consumes the outstanding wake without running a cycle.
    pub fn next_wake(&self) -> Option<WakeReason> {
        self.scheduler.take_wake()
    }

    /// Creates a cycle-scoped cell bound to this host.
    pub fn cell<T>(&self, initial: T) -> ScopedCell<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let cell = ScopedCell::new(initial, self.scheduler.clone());
        self.register(cell.participant());
        cell
    }

    /// Creates a fresh state cell bound to this host.
    pub fn fresh_cell<S>(&self, initial: S) -> FreshStateCell<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let fresh = FreshStateCell::new(self.cell(initial));
        self.register(fresh.participant());
        fresh
    }

    fn register(&self, participant: Arc<dyn CycleParticipant>) {
        self.participants.lock().push(Arc::downgrade(&participant));
    }

    /// Upgrades live participants and forgets dropped ones.
    fn live_participants(&self) -> Vec<Arc<dyn CycleParticipant>> {
        let mut registry = self.participants.lock();
        let mut live = Vec::with_capacity(registry.len());
        registry.retain(|weak| match weak.upgrade() {
            Some(participant) => {
                live.push(participant);
                true
            }
            None => false,
        });
        live
    }

    /// Runs exactly one cycle and returns what the body returned.
    pub fn run_cycle<R>(&self, body: impl FnOnce(&CycleFrame) -> R) -> R {
        let participants = self.live_participants();

        self.scheduler.begin_cycle();
        for participant in &participants {
            participant.begin_cycle();
        }

        let frame = CycleFrame {
            cycle: self.counter.current(),
            counter: self.counter.clone(),
        };
        if self.config.trace_cycles {
            trace!(cycle = %frame.cycle, cells = participants.len(), "cycle begin");
        }

        let output = body(&frame);

        // Participants stay alive through the hook even if the body dropped
        // their last public handle.
        let completed = self.counter.complete();
        for participant in &participants {
            participant.complete_cycle(completed);
        }
        if self.config.trace_cycles {
            trace!(completed = %completed, "cycle complete");
        }

        output
    }

    /// Runs cycles while wakes are pending. Returns how many ran.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CycleLimitExceeded`] if the component is still
    /// waking itself after `max_cycles_per_drain` consecutive cycles.
    pub fn run_until_idle<F>(&self, mut body: F) -> CoreResult<u64>
    where
        F: FnMut(&CycleFrame),
    {
        let limit = self.config().max_cycles_per_drain;
        let mut ran = 0;
        while self.scheduler.is_wake_pending() {
            if ran >= limit {
                return Err(CoreError::CycleLimitExceeded { limit });
            }
            self.run_cycle(|frame| body(frame));
            ran += 1;
        }
        Ok(ran)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_counts_completed_cycles() {
        let host = CycleHost::new();
        let counter = host.counter();

        for n in 0..10u64 {
            let seen = host.run_cycle(|frame| frame.cycle());
            assert_eq!(seen, Cycle::new(n));
        }
        assert_eq!(counter.current(), Cycle::new(10));
    }

    #[test]
    fn test_first_cycle_flag() {
        let host = CycleHost::new();
        assert!(host.run_cycle(|frame| frame.is_first()));
        assert!(!host.run_cycle(|frame| frame.is_first()));
    }

    #[test]
    fn test_staged_update_visible_next_cycle() {
        let host = CycleHost::new();
        let cell = host.cell(1u32);

        let seen = host.run_cycle(|_| {
            cell.set(2);
            cell.get()
        });
        assert_eq!(seen, 1);
        assert!(host.has_pending_wake());

        assert_eq!(host.run_cycle(|_| cell.get()), 2);
    }

    #[test]
    fn test_many_advances_schedule_one_cycle() {
        let host = CycleHost::new();
        host.run_cycle(|frame| {
            frame.advance();
            frame.advance();
            frame.advance();
        });

        let ran = host.run_until_idle(|_| {}).unwrap();
        assert_eq!(ran, 1);
        assert_eq!(host.current_cycle(), Cycle::new(2));
    }

    #[test]
    fn test_run_until_idle_without_wakes_runs_nothing() {
        let host = CycleHost::new();
        assert_eq!(host.run_until_idle(|_| {}).unwrap(), 0);
        assert_eq!(host.current_cycle(), Cycle::ZERO);
    }

    #[test]
    fn test_self_waking_body_hits_limit() {
        let host = CycleHost::with_config(HostConfig::strict());
        host.counter().advance();

        let err = host.run_until_idle(CycleFrame::advance).unwrap_err();
        assert_eq!(host.config().max_cycles_per_drain, 64);
        assert_eq!(err, CoreError::CycleLimitExceeded { limit: 64 });
        assert_eq!(host.current_cycle(), Cycle::new(64));
    }

    #[test]
    fn test_dropped_cells_are_pruned() {
        let host = CycleHost::new();
        let kept = host.cell(0u8);
        drop(host.cell(0u8));

        host.run_cycle(|_| ());
        assert_eq!(host.participants.lock().len(), 1);
        drop(kept);
    }
}
