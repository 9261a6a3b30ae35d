//! # Requests and Responders

use std::fmt;

use crate::pending::Resolver;

/// The logic that turns a request into a reply. Runs at most once.
pub type Responder<A, B> = Box<dyn FnOnce(A) -> B + Send>;

/// A caller waiting for a reply: the payload plus its completion handle.
pub struct PendingRequest<A, B> {
    payload: A,
    resolver: Resolver<B>,
}

impl<A, B> PendingRequest<A, B> {
    /// Bundles a payload with the resolver of the caller's pending result.
    #[must_use]
    pub fn new(payload: A, resolver: Resolver<B>) -> Self {
        Self { payload, resolver }
    }

    /// The request payload.
    #[must_use]
    pub fn payload(&self) -> &A {
        &self.payload
    }

    /// Runs `responder` on the payload and delivers its output.
    ///
    /// Returns `false` if the caller had already dropped its pending result.
    pub fn answer(self, responder: impl FnOnce(A) -> B) -> bool {
        let reply = responder(self.payload);
        self.resolver.resolve(reply)
    }
}

impl<A: fmt::Debug, B> fmt::Debug for PendingRequest<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRequest")
            .field("payload", &self.payload)
            .field("resolver", &self.resolver)
            .finish()
    }
}
