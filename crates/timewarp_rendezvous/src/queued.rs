//! # Queued Rendezvous
//!
//! Every request is kept. A single installer in the slot stands for "at
//! least one request is waiting"; each invocation answers exactly one of
//! them and republishes the slot for the rest.
//!
//! ```text
//! message(a1)  queue: [a1]          slot: installer
//! message(a2)  queue: [a2, a1]      slot: installer
//! respond(f1)  queue: [a1]          a2 -> f1(a2)    (LIFO)
//! respond(f2)  queue: []            a1 -> f2(a1)    slot: cleared
//! ```
//!
//! With [`PairingOrder::Fifo`](crate::PairingOrder::Fifo) the oldest
//! request is answered first instead.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use timewarp_core::{CycleHost, ScopedCell};
use tracing::{debug, trace};

use crate::config::{PairingOrder, RendezvousConfig};
use crate::error::{RendezvousError, RendezvousResult};
use crate::pending::{pending, Pending};
use crate::queue::PairingQueue;
use crate::request::PendingRequest;
use crate::stats::{RendezvousStats, StatCounters};

struct QueueShared<A, B> {
    queue: Mutex<PairingQueue<PendingRequest<A, B>>>,
    slot: ScopedCell<Option<QueueInstaller<A, B>>>,
    stats: StatCounters,
}

impl<A, B> QueueShared<A, B>
where
    A: Send + 'static,
    B: Send + 'static,
{
    /// Stages the slot for the next cycle. Called with the queue locked so
    /// concurrent republishes stage in the same order the queue changed.
    fn republish(self: &Arc<Self>, waiting: usize) {
        let installer = (waiting > 0).then(|| QueueInstaller {
            shared: Arc::downgrade(self),
        });
        self.slot.set(installer);
    }
}

/// Answers whichever queued request is next in line.
pub struct QueueInstaller<A, B> {
    shared: Weak<QueueShared<A, B>>,
}

impl<A, B> Clone for QueueInstaller<A, B> {
    fn clone(&self) -> Self {
        Self {
            shared: Weak::clone(&self.shared),
        }
    }
}

impl<A, B> fmt::Debug for QueueInstaller<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let waiting = self
            .shared
            .upgrade()
            .map_or(0, |shared| shared.queue.lock().len());
        f.debug_struct("QueueInstaller")
            .field("waiting", &waiting)
            .finish()
    }
}

impl<A, B> QueueInstaller<A, B>
where
    A: Send + 'static,
    B: Send + 'static,
{
    /// Inspects the payload the next invocation would answer.
    pub fn with_next<R>(&self, f: impl FnOnce(&A) -> R) -> Option<R> {
        let shared = self.shared.upgrade()?;
        let queue = shared.queue.lock();
        queue.peek().map(|request| f(request.payload()))
    }

    /// Pops the next request, republishes the slot, and resolves the popped
    /// request with `responder(payload)`.
    ///
    /// # Errors
    ///
    /// Returns [`RendezvousError::NothingPending`] if the queue is empty or
    /// the rendezvous is gone. `responder` is not called.
    pub fn respond(&self, responder: impl FnOnce(A) -> B) -> RendezvousResult<()> {
        let shared = self
            .shared
            .upgrade()
            .ok_or(RendezvousError::NothingPending)?;

        let (request, remaining) = {
            let mut queue = shared.queue.lock();
            if queue.is_empty() {
                return Err(RendezvousError::NothingPending);
            }
            let request = queue.pop()?;
            shared.republish(queue.len());
            (request, queue.len())
        };

        shared.stats.record_answer();
        debug!(remaining, "queued request answered");
        request.answer(responder);
        Ok(())
    }
}

/// Pairs an unbounded sequence of requests with later-cycle responders, one
/// responder per request.
pub struct QueuedRendezvous<A, B> {
    shared: Arc<QueueShared<A, B>>,
}

impl<A, B> QueuedRendezvous<A, B>
where
    A: Send + 'static,
    B: Send + 'static,
{
    /// Creates a LIFO rendezvous whose slot lives in a cell of `host`.
    #[must_use]
    pub fn new(host: &CycleHost) -> Self {
        Self::with_config(host, &RendezvousConfig::default())
    }

    /// Creates a rendezvous with the given pairing order.
    #[must_use]
    pub fn with_config(host: &CycleHost, config: &RendezvousConfig) -> Self {
        Self {
            shared: Arc::new(QueueShared {
                queue: Mutex::new(PairingQueue::new(config.order)),
                slot: host.cell(None),
                stats: StatCounters::default(),
            }),
        }
    }

    /// The pairing order of the request queue.
    #[must_use]
    pub fn order(&self) -> PairingOrder {
        self.shared.queue.lock().order()
    }

    /// The installer visible to the running cycle, if requests are waiting.
    #[must_use]
    pub fn slot(&self) -> Option<QueueInstaller<A, B>> {
        self.shared.slot.get()
    }

    /// Queues a request for a later cycle to answer.
    pub fn message(&self, payload: A) -> Pending<B> {
        let (resolver, pending) = pending();
        {
            let mut queue = self.shared.queue.lock();
            queue.push(PendingRequest::new(payload, resolver));
            self.shared.republish(queue.len());
            trace!(depth = queue.len(), "request queued");
        }
        self.shared.stats.record_request();
        pending
    }

    /// Requests currently waiting.
    #[must_use]
    pub fn pending_requests(&self) -> usize {
        self.shared.queue.lock().len()
    }

    /// Counters since creation.
    #[must_use]
    pub fn stats(&self) -> RendezvousStats {
        self.shared.stats.snapshot()
    }
}
