//! Thread handles and lifecycle states.

use std::fmt;
use std::num::NonZeroU64;
use std::sync::Arc;
use std::time::Duration;

use crate::sched::{Manager, Steppable};

pub mod builder;
pub(crate) mod record;

pub use builder::ThreadBuilder;
pub(crate) use record::ThreadRecord;

/// Identifier unique within one manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThreadId(NonZeroU64);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ThreadId {
    pub(crate) fn new(id: u64) -> Self {
        match NonZeroU64::new(id) {
            Some(id) => Self(id),
            None => Self(NonZeroU64::MIN),
        }
    }

    /// Get the raw ID value.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

/// Lifecycle state of a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ThreadState {
    /// The thread has been created but not started.
    New = 0,
    /// The thread has been started and sits in the run queue.
    Running = 1,
    /// The thread's work signalled completion.
    Terminated = 2,
    /// The thread has been paused.
    Paused = 3,
    /// The thread has been killed.
    Killed = 4,
}

impl ThreadState {
    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::New,
            1 => Self::Running,
            2 => Self::Terminated,
            3 => Self::Paused,
            4 => Self::Killed,
            _ => Self::New, // only crate-written discriminants occur
        }
    }
}

impl fmt::Display for ThreadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::New => "New",
            Self::Running => "Running",
            Self::Terminated => "Terminated",
            Self::Paused => "Paused",
            Self::Killed => "Killed",
        };
        f.write_str(name)
    }
}

/// Handle controlling one unit of cooperative work.
///
/// Cloning a handle clones the reference, not the work; all clones control
/// the same underlying record. Lifecycle operations return nothing and
/// never fail: an operation invalid for the current state is a silent
/// no-op, so handles may be driven speculatively.
pub struct Thread {
    record: Arc<ThreadRecord>,
}

impl Thread {
    /// Create a thread in state [`ThreadState::New`] with priority 0.
    ///
    /// No execution starts until [`run`](Thread::run) is called. The finish
    /// callback fires once per completed episode, asynchronously on the
    /// host, with this handle as payload. A killed thread never fires it.
    pub fn create<W, F>(manager: &Manager, work: W, on_finish: F) -> Self
    where
        W: Steppable + 'static,
        F: FnMut(Thread) + 'static,
    {
        ThreadBuilder::new().on_finish(on_finish).create(manager, work)
    }

    pub(crate) fn from_record(record: Arc<ThreadRecord>) -> Self {
        Self { record }
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn record(&self) -> &Arc<ThreadRecord> {
        &self.record
    }

    /// Get the thread's unique identifier.
    pub fn id(&self) -> ThreadId {
        self.record.id()
    }

    /// Get the thread's current lifecycle state.
    pub fn state(&self) -> ThreadState {
        self.record.state()
    }

    /// Milliseconds of wall-clock time this thread's steps have consumed
    /// since the last [`run`](Thread::run).
    pub fn time(&self) -> u64 {
        self.record.elapsed().as_millis() as u64
    }

    /// Fine-grained variant of [`time`](Thread::time).
    pub fn elapsed(&self) -> Duration {
        self.record.elapsed()
    }

    /// Get the thread's priority.
    ///
    /// The documented range is 0 to 100. The scheduler does not currently
    /// consult the value; it is carried as metadata.
    pub fn priority(&self) -> i32 {
        self.record.priority()
    }

    /// Set the thread's priority. The value is stored verbatim; no range
    /// check is performed.
    pub fn set_priority(&self, priority: i32) {
        self.record.set_priority(priority);
    }

    /// Get the thread's name, if one was set at build time.
    pub fn name(&self) -> Option<String> {
        self.record.name()
    }

    /// Start or restart execution.
    ///
    /// Resets the accumulated run time, then registers the record with the
    /// manager. Registration is idempotent for an already running thread;
    /// the time reset happens either way. A terminated or killed handle may
    /// be run again, beginning a fresh episode.
    pub fn run(&self) {
        self.record.reset_elapsed();
        self.record.manager().insert(&self.record);
    }

    /// Suspend execution.
    ///
    /// Effective only while the thread is Running; otherwise a no-op.
    pub fn pause(&self) {
        self.record.manager().detach(&self.record);
    }

    /// Resume a thread suspended by [`pause`](Thread::pause).
    ///
    /// Effective only while the thread is Paused; otherwise a no-op.
    pub fn resume(&self) {
        if self.record.state() == ThreadState::Paused {
            self.record.manager().insert(&self.record);
        }
    }

    /// Terminate the thread immediately.
    ///
    /// Removes it from the run queue; no further steps are advanced and the
    /// finish callback does not fire. Safe to call in any state.
    pub fn kill(&self) {
        self.record.manager().remove(&self.record);
    }
}

impl Clone for Thread {
    fn clone(&self) -> Self {
        Self {
            record: Arc::clone(&self.record),
        }
    }
}
