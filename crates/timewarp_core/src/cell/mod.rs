//! # Cycle-Scoped State
//!
//! ```text
//! Cycle N body:     cell.set(x)      ── staged, wake posted
//! Cycle N+1 begin:  commit staged    ── cell.get() == x from here on
//! Cycle N+1 end:    fresh mirror     ── reader.get() == x from here on
//! ```
//!
//! [`ScopedCell`] is the plain get/set cell. [`FreshStateCell`] adds a
//! side-channel reader for async code that outlives the cycle it was
//! spawned in.

mod fresh;
mod scoped;

pub use fresh::{CapturedState, FreshReader, FreshStateCell};
pub use scoped::{ScopedCell, StateUpdate};
