//! # Mutual Rendezvous
//!
//! Both sides wait. Requesters queue payloads, responders queue functions,
//! and every arrival tries to pair the head of each queue.
//!
//! ```text
//! message(a)    messages: [a]      responders: []     ── no pair, waits
//! respond(f)    messages: [a]      responders: [f]    ── pair: a -> f(a)
//!               both pending results resolve
//! ```
//!
//! Unlike the slot-based variants this one needs no cycle host: nothing is
//! published into a cell, any cycle (or any task) may call either side.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, trace};

use crate::config::{PairingOrder, RendezvousConfig};
use crate::error::RendezvousResult;
use crate::pending::{pending, Pending};
use crate::queue::PairingQueue;
use crate::request::{PendingRequest, Responder};
use crate::stats::{RendezvousStats, StatCounters};

struct MutualQueues<A, B> {
    messages: PairingQueue<PendingRequest<A, B>>,
    responders: PairingQueue<Responder<A, B>>,
}

impl<A, B> MutualQueues<A, B> {
    /// Pops one entry from each side, or nothing if either side is empty.
    fn take_pair(&mut self) -> RendezvousResult<Option<(PendingRequest<A, B>, Responder<A, B>)>> {
        if self.messages.is_empty() || self.responders.is_empty() {
            return Ok(None);
        }
        let request = self.messages.pop()?;
        let responder = self.responders.pop()?;
        Ok(Some((request, responder)))
    }
}

/// Symmetric rendezvous. Cheap to clone; clones share both queues.
///
/// ## Usage
///
/// ```rust,ignore
/// let rv = MutualRendezvous::<u32, u32>::new();
///
/// let reply = rv.message(20);           // nobody to answer yet
/// let served = rv.respond(|a| a + 1);   // pairs immediately
///
/// assert_eq!(reply.await, 21);
/// served.await;
/// ```
pub struct MutualRendezvous<A, B> {
    queues: Arc<Mutex<MutualQueues<A, B>>>,
    stats: Arc<StatCounters>,
}

impl<A, B> Clone for MutualRendezvous<A, B> {
    fn clone(&self) -> Self {
        Self {
            queues: Arc::clone(&self.queues),
            stats: Arc::clone(&self.stats),
        }
    }
}

impl<A, B> Default for MutualRendezvous<A, B>
where
    A: Send + 'static,
    B: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<A, B> MutualRendezvous<A, B>
where
    A: Send + 'static,
    B: Send + 'static,
{
    /// Creates a LIFO rendezvous.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&RendezvousConfig::default())
    }

    /// Creates a rendezvous with the given pairing order on both queues.
    #[must_use]
    pub fn with_config(config: &RendezvousConfig) -> Self {
        Self {
            queues: Arc::new(Mutex::new(MutualQueues {
                messages: PairingQueue::new(config.order),
                responders: PairingQueue::new(config.order),
            })),
            stats: Arc::new(StatCounters::default()),
        }
    }

    /// The pairing order of both queues.
    #[must_use]
    pub fn order(&self) -> PairingOrder {
        self.queues.lock().messages.order()
    }

    /// Queues a request and tries to pair it.
    pub fn message(&self, payload: A) -> Pending<B> {
        let (resolver, pending) = pending();
        {
            let mut queues = self.queues.lock();
            queues.messages.push(PendingRequest::new(payload, resolver));
            trace!(depth = queues.messages.len(), "message queued");
        }
        self.stats.record_request();
        self.try_pair();
        pending
    }

    /// Queues a responder and tries to pair it.
    ///
    /// The returned result settles the moment the responder is invoked.
    pub fn respond(&self, responder: impl FnOnce(A) -> B + Send + 'static) -> Pending<()> {
        let (served, pending) = pending();
        let wrapped: Responder<A, B> = Box::new(move |payload| {
            served.resolve(());
            responder(payload)
        });
        {
            let mut queues = self.queues.lock();
            queues.responders.push(wrapped);
            trace!(depth = queues.responders.len(), "responder queued");
        }
        self.stats.record_offer();
        self.try_pair();
        pending
    }

    /// Requests waiting for a responder.
    #[must_use]
    pub fn pending_messages(&self) -> usize {
        self.queues.lock().messages.len()
    }

    /// Responders waiting for a request.
    #[must_use]
    pub fn pending_responders(&self) -> usize {
        self.queues.lock().responders.len()
    }

    /// Counters since creation.
    #[must_use]
    pub fn stats(&self) -> RendezvousStats {
        self.stats.snapshot()
    }

    fn try_pair(&self) {
        let pair = self.queues.lock().take_pair();
        match pair {
            Ok(Some((request, responder))) => {
                self.stats.record_answer();
                debug!("mutual pair formed");
                // Outside the lock: the responder may call back into us.
                request.answer(responder);
            }
            Ok(None) => {}
            Err(err) => error!(%err, "mutual pairing aborted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_message_then_respond() {
        let rv = MutualRendezvous::<u32, u32>::new();

        let mut reply = rv.message(6);
        assert!(reply.try_take().is_none());
        assert_eq!(rv.pending_messages(), 1);

        let mut served = rv.respond(|a| a * 7);
        assert_eq!(reply.try_take(), Some(42));
        assert_eq!(served.try_take(), Some(()));
        assert_eq!(rv.pending_messages(), 0);
        assert_eq!(rv.pending_responders(), 0);
    }

    #[test]
    fn test_respond_then_message() {
        let rv = MutualRendezvous::<&str, usize>::new();

        let mut served = rv.respond(str::len);
        assert!(!served.is_settled());

        let mut reply = rv.message("four");
        assert_eq!(reply.try_take(), Some(4));
        assert!(served.is_settled());
    }

    #[test]
    fn test_lifo_responders() {
        let rv = MutualRendezvous::<u32, &'static str>::new();

        let mut served1 = rv.respond(|_| "f1");
        let mut served2 = rv.respond(|_| "f2");
        let mut reply = rv.message(0);

        assert_eq!(reply.try_take(), Some("f2"));
        assert!(served2.is_settled());
        assert!(!served1.is_settled());
        assert_eq!(rv.pending_responders(), 1);
    }

    #[test]
    fn test_fifo_responders() {
        let rv = MutualRendezvous::<u32, &'static str>::with_config(&RendezvousConfig::fifo());

        let mut served1 = rv.respond(|_| "f1");
        let _served2 = rv.respond(|_| "f2");
        let mut reply = rv.message(0);

        assert_eq!(reply.try_take(), Some("f1"));
        assert!(served1.is_settled());
    }

    #[test]
    fn test_each_responder_runs_once() {
        const N: usize = 64;
        let rv = MutualRendezvous::<usize, usize>::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut replies: Vec<_> = (0..N).map(|n| rv.message(n)).collect();
        let mut served: Vec<_> = (0..N)
            .map(|_| {
                let calls = Arc::clone(&calls);
                rv.respond(move |a| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    a
                })
            })
            .collect();

        let mut seen: Vec<usize> = replies.iter_mut().filter_map(Pending::try_take).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..N).collect::<Vec<_>>());
        assert!(served.iter_mut().all(Pending::is_settled));
        assert_eq!(calls.load(Ordering::SeqCst), N);

        let stats = rv.stats();
        assert_eq!(stats.requested, N as u64);
        assert_eq!(stats.responders_offered, N as u64);
        assert_eq!(stats.answered, N as u64);
    }

    #[test]
    fn test_responder_reenters() {
        let rv = MutualRendezvous::<u32, u32>::new();
        let inner = rv.clone();

        let _served = rv.respond(move |a| {
            let _ = inner.respond(|b| b + 100);
            a
        });
        let mut first = rv.message(1);
        let mut second = rv.message(2);

        assert_eq!(first.try_take(), Some(1));
        assert_eq!(second.try_take(), Some(102));
    }
}
