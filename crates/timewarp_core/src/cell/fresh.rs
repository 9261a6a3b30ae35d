//! # Fresh State Cell
//!
//! A scoped cell plus a reader that always answers with the value of the
//! most recently completed cycle.
//!
//! ## The Problem
//!
//! ```text
//! Cycle 3:  captured = cell.get()      ── 3
//!           spawn(async { ... captured ... })
//! Cycle 4:  set(4)
//! Cycle 9:  the async block finally runs, still sees 3
//! ```
//!
//! A [`FreshReader`] moved into the async block instead reads the mirror the
//! host refreshes at the end of every cycle, so it sees the latest value no
//! matter which cycle spawned it.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::scoped::{ScopedCell, StateUpdate};
use crate::cycle::{Cycle, CycleParticipant};

struct FreshMirror<S> {
    source: ScopedCell<S>,
    latest: RwLock<S>,
}

impl<S> CycleParticipant for FreshMirror<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn begin_cycle(&self) {}

    fn complete_cycle(&self, _completed: Cycle) {
        let value = self.source.get();
        *self.latest.write() = value;
    }
}

/// Side-channel read access to a [`FreshStateCell`].
///
/// `Clone + Send + Sync`, meant to be moved into long-lived async code.
pub struct FreshReader<S> {
    mirror: Arc<FreshMirror<S>>,
}

impl<S> Clone for FreshReader<S> {
    fn clone(&self) -> Self {
        Self {
            mirror: Arc::clone(&self.mirror),
        }
    }
}

impl<S: Clone> FreshReader<S> {
    /// Returns the value as of the most recently completed cycle.
    #[must_use]
    pub fn get(&self) -> S {
        self.mirror.latest.read().clone()
    }
}

impl<S: fmt::Debug> fmt::Debug for FreshReader<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FreshReader")
            .field(&*self.mirror.latest.read())
            .finish()
    }
}

/// Everything one cycle sees of a [`FreshStateCell`]: the value it captured,
/// a setter, and a fresh reader.
///
/// Keeping a capture across cycles is allowed; `value` then goes stale while
/// [`CapturedState::get_fresh`] keeps tracking the cell.
#[derive(Debug)]
pub struct CapturedState<S> {
    /// The value as of the capturing cycle.
    pub value: S,
    cell: ScopedCell<S>,
    fresh: FreshReader<S>,
}

impl<S> CapturedState<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Stages a replacement for the next cycle.
    pub fn set(&self, value: S) {
        self.cell.set(value);
    }

    /// Stages a derivation for the next cycle.
    pub fn update(&self, f: impl FnOnce(&S) -> S + Send + 'static) {
        self.cell.update(f);
    }

    /// Returns the value as of the most recently completed cycle.
    #[must_use]
    pub fn get_fresh(&self) -> S {
        self.fresh.get()
    }

    /// Returns a reader that can outlive this capture.
    #[must_use]
    pub fn fresh_reader(&self) -> FreshReader<S> {
        self.fresh.clone()
    }
}

/// Cycle-scoped value with an always-current side-channel reader.
///
/// Create one with [`CycleHost::fresh_cell`](crate::CycleHost::fresh_cell).
pub struct FreshStateCell<S> {
    cell: ScopedCell<S>,
    mirror: Arc<FreshMirror<S>>,
}

impl<S> Clone for FreshStateCell<S> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            mirror: Arc::clone(&self.mirror),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for FreshStateCell<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FreshStateCell")
            .field("cell", &self.cell)
            .field("fresh", &*self.mirror.latest.read())
            .finish()
    }
}

impl<S> FreshStateCell<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(cell: ScopedCell<S>) -> Self {
        let latest = RwLock::new(cell.get());
        Self {
            mirror: Arc::new(FreshMirror {
                source: cell.clone(),
                latest,
            }),
            cell,
        }
    }

    pub(crate) fn participant(&self) -> Arc<dyn CycleParticipant> {
        self.mirror.clone()
    }

    /// Captures `(value, setter, fresh reader)` for the running cycle.
    #[must_use]
    pub fn capture(&self) -> CapturedState<S> {
        CapturedState {
            value: self.cell.get(),
            cell: self.cell.clone(),
            fresh: self.reader(),
        }
    }

    /// The value committed for the running cycle.
    #[must_use]
    pub fn value(&self) -> S {
        self.cell.get()
    }

    /// Stages a replacement for the next cycle.
    pub fn set(&self, value: S) {
        self.cell.set(value);
    }

    /// Stages a derivation for the next cycle.
    pub fn update(&self, f: impl FnOnce(&S) -> S + Send + 'static) {
        self.cell.update(f);
    }

    /// Stages any update for the next cycle.
    pub fn dispatch(&self, update: StateUpdate<S>) {
        self.cell.dispatch(update);
    }

    /// Returns the value as of the most recently completed cycle.
    #[must_use]
    pub fn get_fresh(&self) -> S {
        self.mirror.latest.read().clone()
    }

    /// Returns a reader that can be moved into async code.
    #[must_use]
    pub fn reader(&self) -> FreshReader<S> {
        FreshReader {
            mirror: Arc::clone(&self.mirror),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::CycleHost;

    #[test]
    fn test_fresh_follows_completed_cycles() {
        let host = CycleHost::new();
        let cell = host.fresh_cell(0u32);

        cell.set(7);
        assert_eq!(cell.get_fresh(), 0);

        host.run_cycle(|_| ());
        assert_eq!(cell.get_fresh(), 7);
    }

    #[test]
    fn test_stale_capture_reads_fresh() {
        let host = CycleHost::new();
        let cell = host.fresh_cell(String::from("first"));

        let captured = host.run_cycle(|_| cell.capture());
        captured.set(String::from("second"));
        host.run_cycle(|_| ());
        cell.update(|s| format!("{s}+third"));
        host.run_cycle(|_| ());

        assert_eq!(captured.value, "first");
        assert_eq!(captured.get_fresh(), "second+third");
        assert_eq!(captured.fresh_reader().get(), "second+third");
    }

    #[test]
    fn test_fresh_lags_value_during_commit_cycle() {
        let host = CycleHost::new();
        let cell = host.fresh_cell(1i64);
        cell.set(2);

        let (value, fresh) = host.run_cycle(|_| (cell.value(), cell.get_fresh()));
        assert_eq!(value, 2);
        assert_eq!(fresh, 1);
        assert_eq!(cell.get_fresh(), 2);
    }

    #[test]
    fn test_reader_outlives_cell_handle() {
        let host = CycleHost::new();
        let cell = host.fresh_cell(0u8);
        let reader = cell.reader();
        let setter = cell.capture();
        drop(cell);

        setter.set(9);
        host.run_cycle(|_| ());
        assert_eq!(reader.get(), 9);
    }

    #[test]
    fn test_reader_moves_across_threads() {
        let host = CycleHost::new();
        let cell = host.fresh_cell(vec![1, 2]);
        cell.update(|v| {
            let mut next = v.clone();
            next.push(3);
            next
        });
        host.run_cycle(|_| ());

        let reader = cell.reader();
        let seen = std::thread::spawn(move || reader.get()).join().unwrap();
        assert_eq!(seen, vec![1, 2, 3]);
    }
}
