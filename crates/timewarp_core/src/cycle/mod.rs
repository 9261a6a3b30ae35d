//! # Cycle Model
//!
//! A component's logic is re-executed once per cycle. Between cycles, work
//! staged by earlier cycles (or by async code running outside any cycle) is
//! committed, so every cycle body sees a consistent snapshot.
//!
//! ```text
//! Cycle N:
//!   BEGIN     ── drain wake queue, commit staged cell updates
//!   BODY      ── component logic runs, may stage updates / request wakes
//!   COMPLETE  ── counter += 1, fresh readers mirror the result
//! ```
//!
//! Nothing here blocks. A cycle is only ever started by the host owner,
//! usually in response to a pending wake.

mod counter;
mod host;
mod scheduler;

pub use counter::{Cycle, CycleCounter};
pub use host::{CycleFrame, CycleHost};
pub use scheduler::{CycleScheduler, WakeReason};

/// Something that must observe cycle boundaries.
///
/// Registered with the host as a weak reference; dropped participants are
/// pruned on the next cycle.
pub(crate) trait CycleParticipant: Send + Sync {
    /// Runs at cycle begin, before the body.
    fn begin_cycle(&self);

    /// Runs after the counter has advanced to `completed`.
    fn complete_cycle(&self, completed: Cycle);
}
