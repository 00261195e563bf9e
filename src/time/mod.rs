//! Time slice budgeting for the driver loop.

use std::time::{Duration, Instant};

/// Wall-clock budget tracker for one blocking chunk of scheduling work.
///
/// The driver starts a fresh budget each time it wakes and checks it after
/// every advanced step; once the budget is spent the sweep suspends and
/// control returns to the host.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SliceBudget {
    begun: Instant,
}

impl SliceBudget {
    pub(crate) fn start() -> Self {
        Self {
            begun: Instant::now(),
        }
    }

    /// Whether this chunk has consumed its wall-clock allowance.
    pub(crate) fn spent(&self) -> bool {
        self.begun.elapsed() >= SLICE_BUDGET
    }
}

/// Measures the wall-clock cost of a single work step.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Stopwatch {
    begun: Instant,
}

impl Stopwatch {
    pub(crate) fn start() -> Self {
        Self {
            begun: Instant::now(),
        }
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.begun.elapsed()
    }
}

/// Longest stretch of scheduling work before the driver yields to the host.
pub const SLICE_BUDGET: Duration = Duration::from_millis(70);

/// Delay before a suspended sweep is rearmed on the host.
pub const RESCHEDULE_DELAY: Duration = Duration::from_millis(30);
