//! Deferred-callback pump standing in for the host environment.
//!
//! The scheduler asks exactly one thing of its surroundings: "invoke this
//! closure after roughly N milliseconds, without blocking me". A browser or
//! UI event loop supplies that capability ambiently; a plain Rust process
//! does not, so the crate carries a small timer pump. The caller owns the
//! pump and decides when callbacks fire. Nothing here spawns a background
//! OS thread.

use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use portable_atomic::{AtomicU64, Ordering};

/// Cheaply clonable handle over a monotonic timer queue.
///
/// Clones share the queue; a callback deferred on one clone is visible to
/// every pump method on the others.
#[derive(Clone)]
pub struct Host {
    inner: Arc<HostInner>,
}

struct HostInner {
    /// Pending callbacks, earliest deadline first.
    timers: spin::Mutex<BinaryHeap<TimerEntry>>,
    /// Submission counter. Breaks deadline ties so callbacks deferred to
    /// the same instant run in submission order.
    seq: AtomicU64,
}

struct TimerEntry {
    due: Instant,
    seq: u64,
    callback: Box<dyn FnOnce()>,
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for TimerEntry {}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEntry {
    // BinaryHeap is a max-heap; reverse so the earliest deadline surfaces.
    fn cmp(&self, other: &Self) -> CmpOrdering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl Host {
    /// Create an empty host with no pending callbacks.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(HostInner {
                timers: spin::Mutex::new(BinaryHeap::new()),
                seq: AtomicU64::new(0),
            }),
        }
    }

    /// Schedule `callback` to run approximately `delay` from now.
    ///
    /// The callback fires during a later pump call, never inside `defer`
    /// itself.
    pub fn defer<F>(&self, delay: Duration, callback: F)
    where
        F: FnOnce() + 'static,
    {
        let entry = TimerEntry {
            due: Instant::now() + delay,
            seq: self.inner.seq.fetch_add(1, Ordering::AcqRel),
            callback: Box::new(callback),
        };
        self.inner.timers.lock().push(entry);
    }

    /// Number of callbacks waiting for their deadline.
    pub fn pending(&self) -> usize {
        self.inner.timers.lock().len()
    }

    /// Run the callbacks that were due and pending when the turn began.
    ///
    /// Callbacks deferred while the turn is in progress wait for a later
    /// pump call, even at zero delay. Returns the number of callbacks run.
    pub fn turn(&self) -> usize {
        let now = Instant::now();
        let horizon = self.inner.seq.load(Ordering::Acquire);
        let mut ran = 0;
        loop {
            let entry = {
                let mut timers = self.inner.timers.lock();
                match timers.peek() {
                    Some(next) if next.due <= now && next.seq < horizon => timers.pop(),
                    _ => None,
                }
            };
            let Some(entry) = entry else { break };
            (entry.callback)();
            ran += 1;
        }
        ran
    }

    /// Pump callbacks as they come due for at most `budget` of wall-clock
    /// time, sleeping between deadlines.
    ///
    /// Returns early once the queue drains or the next deadline lies beyond
    /// the budget. Returns the number of callbacks run.
    pub fn run_for(&self, budget: Duration) -> usize {
        let deadline = Instant::now() + budget;
        let mut ran = 0;
        loop {
            let Some(due) = self.next_due() else { return ran };
            let now = Instant::now();
            if now >= deadline || due > deadline {
                return ran;
            }
            if due > now {
                thread::sleep(due - now);
            }
            ran += self.turn();
        }
    }

    /// Pump callbacks, sleeping between deadlines, until none remain.
    ///
    /// A driver advancing work that never completes rearms itself forever;
    /// pump such a system with [`run_for`](Host::run_for) instead. Returns
    /// the number of callbacks run.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            let Some(due) = self.next_due() else { return ran };
            let now = Instant::now();
            if due > now {
                thread::sleep(due - now);
            }
            ran += self.turn();
        }
    }

    fn next_due(&self) -> Option<Instant> {
        self.inner.timers.lock().peek().map(|next| next.due)
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}
