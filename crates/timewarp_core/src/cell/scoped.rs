//! # Scoped Cell
//!
//! A value that only changes at cycle boundaries.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::cycle::{Cycle, CycleParticipant, CycleScheduler, WakeReason};

/// A staged write: replace the value, or derive it from the value at commit.
pub enum StateUpdate<T> {
    /// Replace the value outright.
    Replace(T),
    /// Compute the new value from the one committed just before.
    Derive(Box<dyn FnOnce(&T) -> T + Send>),
}

impl<T> StateUpdate<T> {
    /// Builds a derive update.
    pub fn derive(f: impl FnOnce(&T) -> T + Send + 'static) -> Self {
        Self::Derive(Box::new(f))
    }

    /// Applies the update on top of `current`.
    #[must_use]
    pub fn apply(self, current: &T) -> T {
        match self {
            Self::Replace(value) => value,
            Self::Derive(f) => f(current),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for StateUpdate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace(value) => f.debug_tuple("Replace").field(value).finish(),
            Self::Derive(_) => f.write_str("Derive(..)"),
        }
    }
}

struct ScopedInner<T> {
    committed: RwLock<T>,
    staged: Mutex<Vec<StateUpdate<T>>>,
    scheduler: CycleScheduler,
}

impl<T> CycleParticipant for ScopedInner<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn begin_cycle(&self) {
        let staged = std::mem::take(&mut *self.staged.lock());
        if staged.is_empty() {
            return;
        }
        // Derive closures run without any cell lock held, so they may read
        // other cells (or this one) freely.
        let mut value = self.committed.read().clone();
        for update in staged {
            value = update.apply(&value);
        }
        *self.committed.write() = value;
    }

    fn complete_cycle(&self, _completed: Cycle) {}
}

/// A cycle-scoped cell. Cheap to clone; clones share the value.
///
/// Reads return the value committed at the start of the current cycle.
/// Writes are staged and committed at the start of the next one, and every
/// write posts a [`WakeReason::StateChanged`] wake.
///
/// Create one with [`CycleHost::cell`](crate::CycleHost::cell).
pub struct ScopedCell<T> {
    inner: Arc<ScopedInner<T>>,
}

impl<T> Clone for ScopedCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ScopedCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedCell")
            .field("committed", &*self.inner.committed.read())
            .field("staged", &self.inner.staged.lock().len())
            .finish()
    }
}

impl<T> ScopedCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(initial: T, scheduler: CycleScheduler) -> Self {
        Self {
            inner: Arc::new(ScopedInner {
                committed: RwLock::new(initial),
                staged: Mutex::new(Vec::new()),
                scheduler,
            }),
        }
    }

    pub(crate) fn participant(&self) -> Arc<dyn CycleParticipant> {
        self.inner.clone()
    }

    /// Returns the committed value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.committed.read().clone()
    }

    /// Borrows the committed value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let committed = self.inner.committed.read();
        f(&committed)
    }

    /// Stages a replacement for the next cycle.
    pub fn set(&self, value: T) {
        self.dispatch(StateUpdate::Replace(value));
    }

    /// Stages a derivation for the next cycle.
    pub fn update(&self, f: impl FnOnce(&T) -> T + Send + 'static) {
        self.dispatch(StateUpdate::derive(f));
    }

    /// Stages any update and requests a cycle.
    pub fn dispatch(&self, update: StateUpdate<T>) {
        self.inner.staged.lock().push(update);
        self.inner.scheduler.wake(WakeReason::StateChanged);
    }

    /// Returns whether updates are waiting for the next cycle.
    #[must_use]
    pub fn has_staged(&self) -> bool {
        !self.inner.staged.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(initial: i32) -> (ScopedCell<i32>, CycleScheduler) {
        let scheduler = CycleScheduler::new();
        (ScopedCell::new(initial, scheduler.clone()), scheduler)
    }

    #[test]
    fn test_set_is_staged() {
        let (cell, scheduler) = cell(1);
        cell.set(5);

        assert_eq!(cell.get(), 1);
        assert!(cell.has_staged());
        assert_eq!(scheduler.take_wake(), Some(WakeReason::StateChanged));

        cell.participant().begin_cycle();
        assert_eq!(cell.get(), 5);
        assert!(!cell.has_staged());
    }

    #[test]
    fn test_updates_apply_in_order() {
        let (cell, _scheduler) = cell(1);
        cell.update(|v| v + 1);
        cell.set(10);
        cell.update(|v| v * 3);

        cell.participant().begin_cycle();
        assert_eq!(cell.get(), 30);
    }

    #[test]
    fn test_derive_may_read_the_cell() {
        let (cell, _scheduler) = cell(7);
        let reader = cell.clone();
        cell.update(move |v| v + reader.get());

        cell.participant().begin_cycle();
        assert_eq!(cell.get(), 14);
    }

    #[test]
    fn test_with_borrows() {
        let (cell, _scheduler) = cell(3);
        assert_eq!(cell.with(|v| v * 2), 6);
    }

    #[test]
    fn test_state_update_apply() {
        assert_eq!(StateUpdate::Replace(4).apply(&1), 4);
        assert_eq!(StateUpdate::derive(|v: &i32| v - 1).apply(&1), 0);
    }
}
