//! # TIMEWARP Rendezvous
//!
//! Hand a request to code that will only exist in a later cycle, and get a
//! future for the reply without blocking the cycle that asked.
//!
//! ## Variants
//!
//! | Type | Requests | Responders | Order |
//! |------|----------|------------|-------|
//! | [`SingleSlotRendezvous`] | one, last wins | installer in a cell | - |
//! | [`QueuedRendezvous`] | unbounded queue | installer in a cell | LIFO (configurable) |
//! | [`MutualRendezvous`] | unbounded queue | unbounded queue | LIFO (configurable) |
//!
//! ## Guarantees
//!
//! 1. **Exactly once** - a responder answers at most one request, a request
//!    receives at most one reply
//! 2. **Atomic pairing** - both entries leave their queues under one lock
//! 3. **Re-entrant** - responders run after every lock is released
//!
//! Nothing is cancelled. A request nobody answers stays pending forever.
//!
//! ## Example
//!
//! ```rust,ignore
//! use timewarp_core::CycleHost;
//! use timewarp_rendezvous::QueuedRendezvous;
//!
//! let host = CycleHost::new();
//! let questions = QueuedRendezvous::<String, usize>::new(&host);
//!
//! let answer = questions.message("how long is this?".into());
//!
//! host.run_until_idle(|_| {
//!     if let Some(installer) = questions.slot() {
//!         installer.respond(|q| q.len()).ok();
//!     }
//! })?;
//!
//! assert_eq!(answer.await, 17);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod mutual;
pub mod pending;
pub mod queue;
pub mod queued;
pub mod request;
pub mod single_slot;
pub mod stats;

pub use config::{PairingOrder, RendezvousConfig};
pub use error::{RendezvousError, RendezvousResult};
pub use mutual::MutualRendezvous;
pub use pending::{pending, Pending, Resolver};
pub use queue::PairingQueue;
pub use queued::{QueueInstaller, QueuedRendezvous};
pub use request::{PendingRequest, Responder};
pub use single_slot::{SingleSlotRendezvous, SlotInstaller};
pub use stats::RendezvousStats;
