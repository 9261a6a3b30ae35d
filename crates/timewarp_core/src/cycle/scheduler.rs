//! # Wake Scheduler
//!
//! Explicit wake-up requests, posted as messages into a work queue.
//!
//! Changing a value and asking for a new cycle are separate acts: a cell
//! stages its update, then posts a wake. The host owner drains the queue and
//! decides when to run the cycle.
//!
//! Wakes coalesce. While one wake is outstanding, further requests only bump
//! the request counter, so any number of `advance()` calls within one cycle
//! schedule exactly one more cycle.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};

/// Why a cycle was requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WakeReason {
    /// Requested through [`CycleCounter::advance`](super::CycleCounter::advance).
    Forced,
    /// A scoped cell staged an update.
    StateChanged,
}

#[derive(Debug)]
struct SchedulerInner {
    sender: Sender<WakeReason>,
    receiver: Receiver<WakeReason>,
    /// True while a wake message sits in the queue.
    outstanding: AtomicBool,
    /// Every request ever made, coalesced or not.
    requests: AtomicU64,
}

/// Handle to the host's wake queue. Cheap to clone.
#[derive(Clone, Debug)]
pub struct CycleScheduler {
    inner: Arc<SchedulerInner>,
}

impl Default for CycleScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleScheduler {
    /// Creates an empty wake queue.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            inner: Arc::new(SchedulerInner {
                sender,
                receiver,
                outstanding: AtomicBool::new(false),
                requests: AtomicU64::new(0),
            }),
        }
    }

    /// Requests a new cycle.
    pub fn wake(&self, reason: WakeReason) {
        self.inner.requests.fetch_add(1, Ordering::Relaxed);
        if self.inner.outstanding.swap(true, Ordering::AcqRel) {
            return;
        }
        // The receiver lives as long as the sender, so this cannot fail.
        let _ = self.inner.sender.send(reason);
    }

    /// Returns whether a wake is waiting to be consumed.
    #[inline]
    #[must_use]
    pub fn is_wake_pending(&self) -> bool {
        !self.inner.receiver.is_empty()
    }

    /// Consumes the outstanding wake, if any.
    ///
    /// After this returns `Some`, the next `wake()` enqueues a fresh message.
    pub fn take_wake(&self) -> Option<WakeReason> {
        let reason = self.inner.receiver.try_recv().ok()?;
        self.inner.outstanding.store(false, Ordering::Release);
        Some(reason)
    }

    /// Total wake requests, including coalesced ones.
    #[inline]
    #[must_use]
    pub fn wake_requests(&self) -> u64 {
        self.inner.requests.load(Ordering::Relaxed)
    }

    /// Cycle begin: whatever was requested so far is being served now.
    pub(crate) fn begin_cycle(&self) {
        while self.take_wake().is_some() {}
    }
}
