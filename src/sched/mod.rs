//! Thread scheduling.
//!
//! Provides the run queue and the time-sliced round-robin driver loop.

pub mod manager;
pub mod step;

pub use manager::Manager;
pub use step::{StepIter, StepResult, Steppable};
