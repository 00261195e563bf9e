//! Run queue management and the time-sliced driver loop.

use std::sync::Arc;
use std::time::Duration;

use portable_atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, trace};

use super::step::StepResult;
use crate::host::Host;
use crate::thread::{ThreadId, ThreadRecord, ThreadState};
use crate::time::{SliceBudget, Stopwatch, RESCHEDULE_DELAY};

/// Scheduler for cooperative thread records.
///
/// The manager owns the single run queue and the driver loop that advances
/// every queued record by one step per sweep pass. It is the only component
/// that mutates the queue; handles reach it through the crate-private
/// `insert`/`detach`/`remove` operations, so a record is in the queue
/// exactly when its state is [`ThreadState::Running`].
///
/// The driver coexists with the host event loop: each blocking chunk of
/// sweeping is capped at [`SLICE_BUDGET`](crate::time::SLICE_BUDGET), after
/// which the sweep suspends and a continuation is rearmed on the host.
///
/// Cloning yields another handle to the same scheduler.
#[derive(Clone)]
pub struct Manager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    host: Host,
    /// Run queue in insertion order. Removal compacts in place.
    queue: spin::Mutex<Vec<Arc<ThreadRecord>>>,
    /// Whether a sweep is active or armed on the host. Flipped only while
    /// the queue lock is held.
    driving: AtomicBool,
    next_thread_id: AtomicU64,
}

impl Manager {
    /// Create an idle manager driven by `host`.
    pub fn new(host: &Host) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                host: host.clone(),
                queue: spin::Mutex::new(Vec::new()),
                driving: AtomicBool::new(false),
                next_thread_id: AtomicU64::new(1),
            }),
        }
    }

    /// Number of records currently in the run queue.
    pub fn count(&self) -> usize {
        self.inner.queue.lock().len()
    }

    /// Generate the next thread ID. IDs are never reused within a manager.
    pub(crate) fn next_thread_id(&self) -> ThreadId {
        ThreadId::new(self.inner.next_thread_id.fetch_add(1, Ordering::AcqRel))
    }

    /// Add `record` to the run queue and mark it Running.
    ///
    /// Membership is tested by identity; inserting an already queued record
    /// is a no-op. Wakes the driver if it is parked.
    pub(crate) fn insert(&self, record: &Arc<ThreadRecord>) {
        let mut queue = self.inner.queue.lock();
        if queue.iter().any(|queued| Arc::ptr_eq(queued, record)) {
            return;
        }
        record.set_state(ThreadState::Running);
        queue.push(Arc::clone(record));
        debug!(thread = %record.id(), queued = queue.len(), "inserted");

        if !self.inner.driving.swap(true, Ordering::AcqRel) {
            drop(queue);
            trace!("driver woken");
            let manager = self.clone();
            self.inner.host.defer(Duration::ZERO, move || manager.sweep(0));
        }
    }

    /// Remove `record` from the run queue and mark it Killed.
    ///
    /// A paused record is not queued but is killed all the same. Any other
    /// unqueued record is left untouched.
    pub(crate) fn remove(&self, record: &Arc<ThreadRecord>) {
        let mut queue = self.inner.queue.lock();
        if let Some(slot) = queue.iter().position(|queued| Arc::ptr_eq(queued, record)) {
            queue.remove(slot);
            record.set_state(ThreadState::Killed);
            debug!(thread = %record.id(), "killed");
        } else if record.state() == ThreadState::Paused {
            record.set_state(ThreadState::Killed);
            debug!(thread = %record.id(), "killed while paused");
        }
    }

    /// Remove `record` from the run queue and mark it Paused.
    ///
    /// The Running to Paused transition applies atomically under the queue
    /// lock; an unqueued record is left untouched.
    pub(crate) fn detach(&self, record: &Arc<ThreadRecord>) {
        let mut queue = self.inner.queue.lock();
        if let Some(slot) = queue.iter().position(|queued| Arc::ptr_eq(queued, record)) {
            queue.remove(slot);
            record.set_state(ThreadState::Paused);
            debug!(thread = %record.id(), "paused");
        }
    }

    /// Whether `record` is currently queued.
    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn exist(&self, record: &Arc<ThreadRecord>) -> bool {
        self.inner
            .queue
            .lock()
            .iter()
            .any(|queued| Arc::ptr_eq(queued, record))
    }

    /// Run one blocking chunk of the driver loop, starting at `cursor`.
    ///
    /// Sweeps the queue front to back, advancing each record's work by one
    /// step per pass and wrapping at the end. The chunk ends when either
    /// the queue empties (the driver parks until the next insert) or the
    /// slice budget is spent (a continuation is rearmed on the host
    /// [`RESCHEDULE_DELAY`](crate::time::RESCHEDULE_DELAY) out, resuming at
    /// the preserved cursor).
    ///
    /// A panicking work step propagates out of the sweep uncaught.
    fn sweep(&self, mut cursor: usize) {
        let budget = SliceBudget::start();
        loop {
            let record = {
                let queue = self.inner.queue.lock();
                if queue.is_empty() {
                    self.inner.driving.store(false, Ordering::Release);
                    trace!("driver parked");
                    return;
                }
                if cursor >= queue.len() {
                    cursor = 0;
                }
                Arc::clone(&queue[cursor])
            };

            // Step outside the queue lock; the work may call back into
            // insert/detach/remove on any handle, including its own.
            let watch = Stopwatch::start();
            match record.step() {
                StepResult::Continue => {
                    record.charge(watch.elapsed());
                    let queue = self.inner.queue.lock();
                    // Relocate by identity; the step may have reshuffled
                    // the queue under us.
                    if let Some(slot) =
                        queue.iter().position(|queued| Arc::ptr_eq(queued, &record))
                    {
                        cursor = slot + 1;
                    }
                }
                StepResult::Done => {
                    let mut queue = self.inner.queue.lock();
                    if let Some(slot) =
                        queue.iter().position(|queued| Arc::ptr_eq(queued, &record))
                    {
                        queue.remove(slot);
                        record.set_state(ThreadState::Terminated);
                        cursor = slot;
                        drop(queue);
                        debug!(thread = %record.id(), "terminated");
                        self.schedule_finish(record);
                    }
                    // A record that vanished mid-step was killed or paused
                    // by its own work; cancellation is silent.
                }
            }

            if budget.spent() {
                trace!(resume_at = cursor, "slice budget spent, yielding to host");
                let manager = self.clone();
                self.inner
                    .host
                    .defer(RESCHEDULE_DELAY, move || manager.sweep(cursor));
                return;
            }
        }
    }

    /// Deliver `record`'s finish callback on the host, never inline.
    fn schedule_finish(&self, record: Arc<ThreadRecord>) {
        self.inner
            .host
            .defer(Duration::ZERO, move || record.deliver_finish());
    }
}
