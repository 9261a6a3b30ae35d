//! # TIMEWARP
//!
//! Cross-cycle coordination for components whose logic re-runs every cycle.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          CycleHost                           │
//! │   wake queue ──> begin (commit) ──> body ──> complete (+1)   │
//! └───────┬──────────────────┬───────────────────────┬───────────┘
//!         │                  │                       │
//!   ┌─────┴──────┐    ┌──────┴───────┐        ┌──────┴──────┐
//!   │CycleCounter│    │ ScopedCell   │        │FreshStateCell│
//!   └────────────┘    └──────┬───────┘        └─────────────┘
//!                            │ slot
//!           ┌────────────────┼──────────────────┐
//!   ┌───────┴────────┐ ┌─────┴──────────┐ ┌─────┴───────────┐
//!   │  SingleSlot    │ │    Queued      │ │     Mutual      │
//!   │  Rendezvous    │ │  Rendezvous    │ │   Rendezvous    │
//!   └────────────────┘ └────────────────┘ └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `core`: cycles, cells, the host
//! - `rendezvous`: the three request/responder pairings

// Re-export the crates
pub use timewarp_core as core;
pub use timewarp_rendezvous as rendezvous;

/// The types most components need.
pub mod prelude {
    pub use timewarp_core::{
        CapturedState, Cycle, CycleCounter, CycleFrame, CycleHost, FreshReader, FreshStateCell,
        HostConfig, ScopedCell,
    };
    pub use timewarp_rendezvous::{
        MutualRendezvous, PairingOrder, Pending, QueuedRendezvous, RendezvousConfig,
        SingleSlotRendezvous,
    };
}
