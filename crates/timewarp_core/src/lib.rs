//! # TIMEWARP Core
//!
//! The cycle model every TIMEWARP primitive is built on:
//! - A component body re-executed once per cycle
//! - Cells whose writes land in the *next* cycle
//! - Readers for async code that must not see stale captures
//!
//! ## Architecture Rules
//!
//! 1. **Cycles never block** - waiting is expressed as pending futures elsewhere
//! 2. **Writes are staged** - a cell changes only at a cycle boundary
//! 3. **Wakes are explicit** - staging a write posts a wake, the host decides when to run
//!
//! ## Example
//!
//! ```rust,ignore
//! use timewarp_core::CycleHost;
//!
//! let host = CycleHost::new();
//! let counter = host.counter();
//! let state = host.fresh_cell(0u32);
//!
//! host.run_cycle(|frame| {
//!     let captured = state.capture();
//!     captured.set(captured.value + 1);
//! });
//! host.run_until_idle(|_| {})?;
//!
//! assert_eq!(counter.current().get(), 2);
//! assert_eq!(state.get_fresh(), 1);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod cell;
pub mod config;
pub mod cycle;
pub mod error;

pub use cell::{CapturedState, FreshReader, FreshStateCell, ScopedCell, StateUpdate};
pub use config::HostConfig;
pub use cycle::{Cycle, CycleCounter, CycleFrame, CycleHost, CycleScheduler, WakeReason};
pub use error::{CoreError, CoreResult};
