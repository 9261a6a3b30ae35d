//! # Single-Slot Rendezvous
//!
//! One request at a time, answered by whichever later cycle picks up the
//! installer from the slot.
//!
//! ```text
//! Cycle N:    rv.message(a)           ── Pending<B>, installer staged
//! Cycle N+1:  rv.slot() == Some(inst) ── "a request is waiting"
//!             inst.respond(f)         ── slot cleared, Pending resolves to f(a)
//! ```
//!
//! A second `message()` before the first is answered takes the slot over.
//! The first request is abandoned: its `Pending` never settles.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use timewarp_core::{CycleHost, ScopedCell};
use tracing::{debug, trace, warn};

use crate::error::{RendezvousError, RendezvousResult};
use crate::pending::{pending, Pending};
use crate::request::PendingRequest;
use crate::stats::{RendezvousStats, StatCounters};

type RequestSlot<A, B> = Arc<Mutex<Option<PendingRequest<A, B>>>>;

struct SlotShared<A, B> {
    slot: ScopedCell<Option<SlotInstaller<A, B>>>,
    /// The most recent request, answered or not.
    latest: Mutex<Option<RequestSlot<A, B>>>,
    stats: StatCounters,
}

/// Answers the one request it was published for.
///
/// Holds the rendezvous weakly: the slot cell stores installers, so a strong
/// reference back would keep the whole rendezvous alive forever.
pub struct SlotInstaller<A, B> {
    request: RequestSlot<A, B>,
    shared: Weak<SlotShared<A, B>>,
}

impl<A, B> Clone for SlotInstaller<A, B> {
    fn clone(&self) -> Self {
        Self {
            request: Arc::clone(&self.request),
            shared: Weak::clone(&self.shared),
        }
    }
}

impl<A, B> fmt::Debug for SlotInstaller<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotInstaller")
            .field("waiting", &self.request.lock().is_some())
            .finish()
    }
}

impl<A, B> SlotInstaller<A, B>
where
    A: Send + 'static,
    B: Send + 'static,
{
    /// Returns whether the request is still unanswered.
    #[must_use]
    pub fn is_waiting(&self) -> bool {
        self.request.lock().is_some()
    }

    /// Inspects the waiting payload without answering.
    pub fn with_payload<R>(&self, f: impl FnOnce(&A) -> R) -> Option<R> {
        self.request.lock().as_ref().map(|request| f(request.payload()))
    }

    /// Clears the slot, then resolves the request with `responder(payload)`.
    ///
    /// # Errors
    ///
    /// Returns [`RendezvousError::NothingPending`] if this installer's
    /// request was already answered or abandoned. `responder` is not called.
    pub fn respond(&self, responder: impl FnOnce(A) -> B) -> RendezvousResult<()> {
        let taken = match self.shared.upgrade() {
            Some(shared) => {
                // Same lock as `message()`: a newer request published in
                // between must not have its installer cleared by us.
                let latest = shared.latest.lock();
                let taken = self.request.lock().take();
                if taken.is_some() {
                    if latest
                        .as_ref()
                        .is_some_and(|current| Arc::ptr_eq(current, &self.request))
                    {
                        shared.slot.set(None);
                    }
                    shared.stats.record_answer();
                }
                taken
            }
            None => self.request.lock().take(),
        };
        let Some(request) = taken else {
            warn!("stale single-slot installer invoked");
            return Err(RendezvousError::NothingPending);
        };
        debug!("single-slot request answered");
        request.answer(responder);
        Ok(())
    }
}

/// Pairs at most one pending request with one later-cycle responder.
pub struct SingleSlotRendezvous<A, B> {
    shared: Arc<SlotShared<A, B>>,
}

impl<A, B> SingleSlotRendezvous<A, B>
where
    A: Send + 'static,
    B: Send + 'static,
{
    /// Creates a rendezvous whose slot lives in a cell of `host`.
    #[must_use]
    pub fn new(host: &CycleHost) -> Self {
        Self {
            shared: Arc::new(SlotShared {
                slot: host.cell(None),
                latest: Mutex::new(None),
                stats: StatCounters::default(),
            }),
        }
    }

    /// The installer visible to the running cycle, if a request is waiting.
    #[must_use]
    pub fn slot(&self) -> Option<SlotInstaller<A, B>> {
        self.shared.slot.get()
    }

    /// Publishes a request for a later cycle to answer.
    ///
    /// Abandons the previous request if it is still unanswered.
    pub fn message(&self, payload: A) -> Pending<B> {
        let (resolver, pending) = pending();
        let request: RequestSlot<A, B> =
            Arc::new(Mutex::new(Some(PendingRequest::new(payload, resolver))));

        // Held until the installer is staged, so a concurrent `respond()`
        // stages its clear strictly before or strictly after this publish.
        let mut latest = self.shared.latest.lock();
        if let Some(previous) = latest.replace(Arc::clone(&request)) {
            let abandoned = previous.lock().take();
            if abandoned.is_some() {
                self.shared.stats.record_abandon();
                warn!("single-slot request overwritten before it was answered");
            }
        }

        self.shared.stats.record_request();
        self.shared.slot.set(Some(SlotInstaller {
            request,
            shared: Arc::downgrade(&self.shared),
        }));
        drop(latest);
        trace!("single-slot request published");
        pending
    }

    /// Counters since creation.
    #[must_use]
    pub fn stats(&self) -> RendezvousStats {
        self.shared.stats.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Barrier;
    use std::thread;

    use super::*;

    #[test]
    fn test_message_then_respond() {
        let host = CycleHost::new();
        let rv = SingleSlotRendezvous::<u32, u32>::new(&host);

        let mut reply = rv.message(20);
        assert!(rv.slot().is_none(), "installer is staged, not yet visible");

        host.run_cycle(|_| {
            let installer = rv.slot().unwrap();
            assert_eq!(installer.with_payload(|a| *a), Some(20));
            installer.respond(|a| a + 1).unwrap();
        });

        assert_eq!(reply.try_take(), Some(21));
        host.run_cycle(|_| assert!(rv.slot().is_none()));
    }

    #[test]
    fn test_second_message_abandons_first() {
        let host = CycleHost::new();
        let rv = SingleSlotRendezvous::<&str, usize>::new(&host);

        let mut first = rv.message("a1");
        let mut second = rv.message("a22");

        host.run_cycle(|_| rv.slot().unwrap().respond(str::len).unwrap());

        assert_eq!(second.try_take(), Some(3));
        assert!(first.is_abandoned());
        assert_eq!(first.try_take(), None);

        let stats = rv.stats();
        assert_eq!(stats.requested, 2);
        assert_eq!(stats.answered, 1);
        assert_eq!(stats.abandoned, 1);
        assert_eq!(stats.pending(), 0);
    }

    #[test]
    fn test_overwrite_after_slot_visible() {
        let host = CycleHost::new();
        let rv = SingleSlotRendezvous::<u8, u8>::new(&host);

        let mut first = rv.message(1);
        let stale = host.run_cycle(|_| rv.slot().unwrap());
        let mut second = rv.message(2);

        assert_eq!(stale.respond(|a| a), Err(RendezvousError::NothingPending));
        assert!(first.is_abandoned());

        host.run_cycle(|_| rv.slot().unwrap().respond(|a| a * 10).unwrap());
        assert_eq!(second.try_take(), Some(20));
    }

    #[test]
    fn test_installer_answers_once() {
        let host = CycleHost::new();
        let rv = SingleSlotRendezvous::<u8, u8>::new(&host);
        let _reply = rv.message(1);

        let installer = host.run_cycle(|_| rv.slot().unwrap());
        let again = installer.clone();

        assert!(installer.respond(|a| a).is_ok());
        assert!(!again.is_waiting());
        assert_eq!(again.respond(|a| a), Err(RendezvousError::NothingPending));
        assert_eq!(rv.stats().answered, 1);
    }

    #[test]
    fn test_concurrent_respond_and_message_never_strand() {
        for _ in 0..2_000 {
            let host = CycleHost::new();
            let rv = SingleSlotRendezvous::<u32, u32>::new(&host);
            let _first = rv.message(1);
            let installer = host.run_cycle(|_| rv.slot().unwrap());
            let barrier = Barrier::new(2);

            let mut second = thread::scope(|s| {
                s.spawn(|| {
                    barrier.wait();
                    let _ = installer.respond(|a| a);
                });
                let sender = s.spawn(|| {
                    barrier.wait();
                    rv.message(2)
                });
                sender.join().unwrap()
            });

            host.run_until_idle(|_| {
                if let Some(installer) = rv.slot() {
                    let _ = installer.respond(|a| a * 10);
                }
            })
            .unwrap();

            assert_eq!(second.try_take(), Some(20), "second request stranded");
            assert_eq!(rv.stats().pending(), 0);
        }
    }

    #[test]
    fn test_installer_outlives_rendezvous() {
        let host = CycleHost::new();
        let rv = SingleSlotRendezvous::<u8, u8>::new(&host);
        let mut reply = rv.message(4);
        let installer = host.run_cycle(|_| rv.slot().unwrap());
        drop(rv);

        installer.respond(|a| a + 1).unwrap();
        assert_eq!(reply.try_take(), Some(5));
    }
}
