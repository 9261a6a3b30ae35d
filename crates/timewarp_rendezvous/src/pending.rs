//! # Pending Results
//!
//! The caller side of every rendezvous gets a [`Pending`], the answering
//! side holds the matching [`Resolver`]. Both wrap a tokio one-shot channel.
//!
//! A `Pending` whose `Resolver` is dropped unanswered is *abandoned*: it
//! never settles. Awaiting it parks forever, which is the documented outcome
//! of an overwritten single-slot request or an unmatched queue entry.
//! [`Pending::is_abandoned`] makes that state visible to diagnostics.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot::{self, error::TryRecvError};

/// Creates a connected resolver / pending pair.
#[must_use]
pub fn pending<B>() -> (Resolver<B>, Pending<B>) {
    let (sender, receiver) = oneshot::channel();
    (
        Resolver { sender },
        Pending {
            receiver,
            ready: None,
            state: PendingState::Waiting,
        },
    )
}

/// One-shot completion handle. Consumed by [`Resolver::resolve`].
pub struct Resolver<B> {
    sender: oneshot::Sender<B>,
}

impl<B> Resolver<B> {
    /// Delivers the reply. Returns `false` if the caller already dropped its
    /// [`Pending`].
    pub fn resolve(self, value: B) -> bool {
        self.sender.send(value).is_ok()
    }

    /// Returns whether the caller still holds its [`Pending`].
    #[must_use]
    pub fn is_waiting(&self) -> bool {
        !self.sender.is_closed()
    }
}

impl<B> fmt::Debug for Resolver<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("waiting", &self.is_waiting())
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PendingState {
    Waiting,
    Settled,
    Abandoned,
}

/// A reply that some later cycle will deliver.
///
/// Implements `Future<Output = B>`. Synchronous code can poll it with
/// [`Pending::try_take`] instead.
pub struct Pending<B> {
    receiver: oneshot::Receiver<B>,
    /// Value pulled out by a non-blocking check but not yet handed out.
    ready: Option<B>,
    state: PendingState,
}

// `B` is only ever moved in and out by value, never pinned.
impl<B> Unpin for Pending<B> {}

impl<B> Pending<B> {
    fn refresh(&mut self) {
        if self.state != PendingState::Waiting {
            return;
        }
        match self.receiver.try_recv() {
            Ok(value) => {
                self.ready = Some(value);
                self.state = PendingState::Settled;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Closed) => self.state = PendingState::Abandoned,
        }
    }

    /// Takes the reply if it has arrived. Never blocks.
    ///
    /// The value is handed out once: after this returns `Some`, awaiting
    /// the same `Pending` stays `Poll::Pending` forever. Pick one of the two.
    pub fn try_take(&mut self) -> Option<B> {
        self.refresh();
        self.ready.take()
    }

    /// Returns whether a reply has been delivered (taken or not).
    pub fn is_settled(&mut self) -> bool {
        self.refresh();
        self.state == PendingState::Settled
    }

    /// Returns whether the resolver was dropped without replying.
    ///
    /// An abandoned result never settles.
    pub fn is_abandoned(&mut self) -> bool {
        self.refresh();
        self.state == PendingState::Abandoned
    }
}

impl<B> Future for Pending<B> {
    type Output = B;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<B> {
        let this = self.get_mut();
        if let Some(value) = this.ready.take() {
            return Poll::Ready(value);
        }
        if this.state != PendingState::Waiting {
            // Abandoned, or already handed out: nothing will ever arrive.
            return Poll::Pending;
        }
        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Ready(Ok(value)) => {
                this.state = PendingState::Settled;
                Poll::Ready(value)
            }
            Poll::Ready(Err(_)) => {
                this.state = PendingState::Abandoned;
                Poll::Pending
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<B> fmt::Debug for Pending<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pending")
            .field("state", &self.state)
            .field("ready", &self.ready.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::task::{Wake, Waker};

    use super::*;

    struct NoopWake;

    impl Wake for NoopWake {
        fn wake(self: Arc<Self>) {}
    }

    #[test]
    fn test_resolve_then_take() {
        let (resolver, mut pending) = pending::<u32>();
        assert!(pending.try_take().is_none());
        assert!(!pending.is_settled());

        assert!(resolver.resolve(42));
        assert!(pending.is_settled());
        assert_eq!(pending.try_take(), Some(42));
        assert_eq!(pending.try_take(), None);
        assert!(pending.is_settled());
    }

    #[test]
    fn test_poll_after_try_take_stays_pending() {
        let (resolver, mut pending) = pending::<u32>();
        assert!(resolver.resolve(7));
        assert_eq!(pending.try_take(), Some(7));

        let waker = Waker::from(Arc::new(NoopWake));
        let mut cx = Context::from_waker(&waker);
        assert!(Pin::new(&mut pending).poll(&mut cx).is_pending());
    }

    #[test]
    fn test_dropped_resolver_abandons() {
        let (resolver, mut pending) = pending::<u32>();
        drop(resolver);

        assert!(pending.is_abandoned());
        assert!(!pending.is_settled());
        assert_eq!(pending.try_take(), None);
    }

    #[test]
    fn test_resolver_sees_dropped_pending() {
        let (resolver, pending) = pending::<&str>();
        assert!(resolver.is_waiting());
        drop(pending);
        assert!(!resolver.is_waiting());
        assert!(!resolver.resolve("late"));
    }
}
