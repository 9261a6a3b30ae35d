//! # Pairing Queue
//!
//! Entries are prepended on arrival; the configured [`PairingOrder`] decides
//! which end a pop takes from. Popping an empty queue is an invariant
//! violation, never a silent `None`.

use std::collections::VecDeque;

use crate::config::PairingOrder;
use crate::error::{RendezvousError, RendezvousResult};

/// Ordered waiting line for one side of a rendezvous.
#[derive(Debug)]
pub struct PairingQueue<T> {
    entries: VecDeque<T>,
    order: PairingOrder,
}

impl<T> PairingQueue<T> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new(order: PairingOrder) -> Self {
        Self {
            entries: VecDeque::new(),
            order,
        }
    }

    /// The discipline this queue pops with.
    #[inline]
    #[must_use]
    pub fn order(&self) -> PairingOrder {
        self.order
    }

    /// Number of waiting entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether nothing is waiting.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds an entry at the front.
    pub fn push(&mut self, entry: T) {
        self.entries.push_front(entry);
    }

    /// The entry the next [`pop`](Self::pop) would return.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        match self.order {
            PairingOrder::Lifo => self.entries.front(),
            PairingOrder::Fifo => self.entries.back(),
        }
    }

    /// Removes the next entry to pair.
    ///
    /// # Errors
    ///
    /// Returns [`RendezvousError::InternalInvariantViolation`] if the queue
    /// is empty. Callers check the length first.
    pub fn pop(&mut self) -> RendezvousResult<T> {
        let entry = match self.order {
            PairingOrder::Lifo => self.entries.pop_front(),
            PairingOrder::Fifo => self.entries.pop_back(),
        };
        entry.ok_or(RendezvousError::InternalInvariantViolation(
            "pop from an empty pairing queue",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(order: PairingOrder) -> PairingQueue<u32> {
        let mut queue = PairingQueue::new(order);
        for n in 1..=3 {
            queue.push(n);
        }
        queue
    }

    #[test]
    fn test_lifo_pops_newest() {
        let mut queue = filled(PairingOrder::Lifo);
        assert_eq!(queue.peek(), Some(&3));
        assert_eq!(queue.pop(), Ok(3));
        assert_eq!(queue.pop(), Ok(2));
        assert_eq!(queue.pop(), Ok(1));
    }

    #[test]
    fn test_fifo_pops_oldest() {
        let mut queue = filled(PairingOrder::Fifo);
        assert_eq!(queue.peek(), Some(&1));
        assert_eq!(queue.pop(), Ok(1));
        assert_eq!(queue.pop(), Ok(2));
        assert_eq!(queue.pop(), Ok(3));
    }

    #[test]
    fn test_empty_pop_is_invariant_violation() {
        let mut queue = PairingQueue::<u32>::new(PairingOrder::Lifo);
        assert!(matches!(
            queue.pop(),
            Err(RendezvousError::InternalInvariantViolation(_))
        ));
        assert!(queue.is_empty());
    }
}
