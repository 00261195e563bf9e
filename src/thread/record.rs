//! Internal bookkeeping entry tracked by the manager.

use std::sync::Arc;
use std::time::Duration;

use portable_atomic::{AtomicI32, AtomicU64, AtomicU8, Ordering};
use tracing::debug;

use super::{Thread, ThreadId, ThreadState};
use crate::sched::{Manager, StepResult, Steppable};

/// One record per handle. The handle owns it; the run queue holds a
/// membership reference only while the record is Running.
pub(crate) struct ThreadRecord {
    id: ThreadId,
    manager: Manager,
    state: AtomicU8,
    priority: AtomicI32,
    /// Wall-clock nanoseconds consumed by this record's steps since the
    /// last run.
    elapsed: AtomicU64,
    work: spin::Mutex<Option<Box<dyn Steppable>>>,
    on_finish: spin::Mutex<Option<Box<dyn FnMut(Thread)>>>,
    name: spin::Mutex<Option<String>>,
}

impl ThreadRecord {
    pub(crate) fn new(
        id: ThreadId,
        manager: Manager,
        work: Box<dyn Steppable>,
        on_finish: Option<Box<dyn FnMut(Thread)>>,
        priority: i32,
        name: Option<String>,
    ) -> Self {
        Self {
            id,
            manager,
            state: AtomicU8::new(ThreadState::New as u8),
            priority: AtomicI32::new(priority),
            elapsed: AtomicU64::new(0),
            work: spin::Mutex::new(Some(work)),
            on_finish: spin::Mutex::new(on_finish),
            name: spin::Mutex::new(name),
        }
    }

    pub(crate) fn id(&self) -> ThreadId {
        self.id
    }

    pub(crate) fn manager(&self) -> &Manager {
        &self.manager
    }

    pub(crate) fn state(&self) -> ThreadState {
        ThreadState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn set_state(&self, state: ThreadState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub(crate) fn priority(&self) -> i32 {
        self.priority.load(Ordering::Acquire)
    }

    pub(crate) fn set_priority(&self, priority: i32) {
        self.priority.store(priority, Ordering::Release);
    }

    pub(crate) fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed.load(Ordering::Acquire))
    }

    pub(crate) fn reset_elapsed(&self) {
        self.elapsed.store(0, Ordering::Release);
    }

    pub(crate) fn charge(&self, cost: Duration) {
        self.elapsed
            .fetch_add(cost.as_nanos() as u64, Ordering::AcqRel);
    }

    pub(crate) fn name(&self) -> Option<String> {
        self.name.lock().clone()
    }

    /// Advance the work by one step. The work cell is emptied for the
    /// duration of the step so no lock spans caller code.
    pub(crate) fn step(&self) -> StepResult {
        let mut work = self.work.lock().take();
        let result = match work.as_mut() {
            Some(work) => work.advance(),
            None => StepResult::Done,
        };
        if let Some(work) = work {
            *self.work.lock() = Some(work);
        }
        result
    }

    /// Run the finish callback with a fresh handle as payload.
    ///
    /// The callback is taken out of its cell for the call and put back
    /// afterwards, so it survives into the next episode.
    pub(crate) fn deliver_finish(self: Arc<Self>) {
        let callback = self.on_finish.lock().take();
        if let Some(mut callback) = callback {
            debug!(thread = %self.id, "delivering finish callback");
            callback(Thread::from_record(Arc::clone(&self)));
            *self.on_finish.lock() = Some(callback);
        }
    }
}
