//! Shared fixtures for the test suites.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use portable_atomic::{AtomicUsize, Ordering};
use spin::Once;

use crate::host::Host;
use crate::sched::{Manager, StepResult};
use crate::thread::{Thread, ThreadId};

static TRACING: Once = Once::new();

/// Install the test subscriber once per process. `RUST_LOG` controls what
/// the suites print.
pub(crate) fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Fresh host and manager pair with tracing installed.
pub(crate) fn rig() -> (Host, Manager) {
    init_tracing();
    let host = Host::new();
    let manager = Manager::new(&host);
    (host, manager)
}

/// Work that makes `steps` units of progress and then completes.
pub(crate) fn finite_work(steps: usize) -> impl FnMut() -> StepResult {
    let mut remaining = steps;
    move || {
        if remaining == 0 {
            StepResult::Done
        } else {
            remaining -= 1;
            StepResult::Continue
        }
    }
}

/// Work that never completes. Each step bumps `steps` and naps briefly so
/// pumped chunks stay cheap to run.
pub(crate) fn endless_work(steps: &Arc<AtomicUsize>) -> impl FnMut() -> StepResult {
    let steps = Arc::clone(steps);
    move || {
        steps.fetch_add(1, Ordering::AcqRel);
        thread::sleep(Duration::from_millis(1));
        StepResult::Continue
    }
}

/// Records finish-callback deliveries in arrival order.
#[derive(Clone, Default)]
pub(crate) struct FinishLog {
    entries: Arc<spin::Mutex<Vec<ThreadId>>>,
}

impl FinishLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A finish callback that appends the finished handle's ID.
    pub(crate) fn callback(&self) -> impl FnMut(Thread) + 'static {
        let entries = Arc::clone(&self.entries);
        move |finished| entries.lock().push(finished.id())
    }

    pub(crate) fn entries(&self) -> Vec<ThreadId> {
        self.entries.lock().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub(crate) fn count_for(&self, id: ThreadId) -> usize {
        self.entries.lock().iter().filter(|entry| **entry == id).count()
    }
}
