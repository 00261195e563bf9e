#![deny(unsafe_op_in_unsafe_fn)]
#![forbid(unreachable_pub)]

//! Cooperative multi-threading emulation for single-threaded hosts.
//!
//! This library emulates multi-threading on one logical thread of control.
//! Callers describe units of work as step-at-a-time computations; the
//! manager schedules every registered unit round-robin, advancing each by
//! one step per sweep pass and yielding control back to the host event loop
//! roughly every 70ms so the host never stalls on scheduling work.
//!
//! # Quick Start
//!
//! ```
//! use cooperative_threads::{Host, Manager, StepIter, Thread, ThreadState};
//!
//! let host = Host::new();
//! let manager = Manager::new(&host);
//!
//! let worker = Thread::create(&manager, StepIter::new(0..3), |finished| {
//!     println!("{} is done", finished.id());
//! });
//! worker.run();
//!
//! host.run_until_idle();
//! assert_eq!(worker.state(), ThreadState::Terminated);
//! ```
//!
//! # Architecture
//!
//! The library is organized around a few abstractions:
//! - Step-at-a-time work units supplied by the caller ([`Steppable`])
//! - A single run queue and time-sliced round-robin driver ([`Manager`])
//! - A five-state lifecycle per handle ([`ThreadState`])
//! - A deferred-callback pump standing in for the host environment ([`Host`])

// Core modules
pub mod host;
pub mod sched;
pub mod thread;
pub mod time;

#[cfg(test)]
mod tests;

// ============================================================================
// Public API
// ============================================================================

// Host event loop
pub use host::Host;

// Scheduler
pub use sched::{Manager, StepIter, StepResult, Steppable};

// Threads
pub use thread::{Thread, ThreadBuilder, ThreadId, ThreadState};

// Time
pub use time::{RESCHEDULE_DELAY, SLICE_BUDGET};
