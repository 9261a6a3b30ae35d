//! # Rendezvous Statistics

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one rendezvous.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RendezvousStats {
    /// `message()` calls.
    pub requested: u64,
    /// Requests that received a reply.
    pub answered: u64,
    /// Requests dropped without a reply (single-slot overwrite).
    pub abandoned: u64,
    /// `respond()` calls (mutual rendezvous only).
    pub responders_offered: u64,
}

impl RendezvousStats {
    /// Requests still waiting for a reply.
    #[must_use]
    pub const fn pending(&self) -> u64 {
        self.requested
            .saturating_sub(self.answered)
            .saturating_sub(self.abandoned)
    }
}

#[derive(Debug, Default)]
pub(crate) struct StatCounters {
    requested: AtomicU64,
    answered: AtomicU64,
    abandoned: AtomicU64,
    responders_offered: AtomicU64,
}

impl StatCounters {
    pub(crate) fn record_request(&self) {
        self.requested.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_answer(&self) {
        self.answered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_abandon(&self) {
        self.abandoned.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_offer(&self) {
        self.responders_offered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> RendezvousStats {
        RendezvousStats {
            requested: self.requested.load(Ordering::Relaxed),
            answered: self.answered.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
            responders_offered: self.responders_offered.load(Ordering::Relaxed),
        }
    }
}
