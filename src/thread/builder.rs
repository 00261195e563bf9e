use std::sync::Arc;

use super::{Thread, ThreadRecord};
use crate::sched::{Manager, Steppable};

/// Configures a thread before creation.
pub struct ThreadBuilder {
    priority: i32,
    name: Option<String>,
    on_finish: Option<Box<dyn FnMut(Thread)>>,
}

impl ThreadBuilder {
    pub fn new() -> Self {
        Self {
            priority: 0,
            name: None,
            on_finish: None,
        }
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn name<T: Into<String>>(mut self, name: T) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn on_finish<F>(mut self, on_finish: F) -> Self
    where
        F: FnMut(Thread) + 'static,
    {
        self.on_finish = Some(Box::new(on_finish));
        self
    }

    /// Build the handle in state New. No execution starts.
    pub fn create<W>(self, manager: &Manager, work: W) -> Thread
    where
        W: Steppable + 'static,
    {
        let record = ThreadRecord::new(
            manager.next_thread_id(),
            manager.clone(),
            Box::new(work),
            self.on_finish,
            self.priority,
            self.name,
        );
        Thread::from_record(Arc::new(record))
    }
}

impl Default for ThreadBuilder {
    fn default() -> Self {
        Self::new()
    }
}
