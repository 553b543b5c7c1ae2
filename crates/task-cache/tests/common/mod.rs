//! Shared fixtures for task cache integration tests.

#![allow(dead_code)]

use parking_lot::Mutex;
use runq_task_cache::{BoxError, ExecutionQueue};
use std::sync::Arc;
use std::sync::Once;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install a test-writer subscriber honouring `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Task handle used across the tests; identity is `Arc` pointer identity.
pub type Task = Arc<TaskNode>;

#[derive(Debug, PartialEq, Eq)]
pub struct TaskNode {
    pub name: String,
}

pub fn task(name: &str) -> Task {
    Arc::new(TaskNode {
        name: name.to_string(),
    })
}

/// One `register` call as seen by the queue.
#[derive(Debug, Clone)]
pub struct Registration {
    pub task: Task,
    pub dependencies: Vec<Task>,
    pub dispatch: bool,
}

impl Registration {
    pub fn dependency_names(&self) -> Vec<&str> {
        self.dependencies.iter().map(|d| d.name.as_str()).collect()
    }
}

/// Queue that records every registration and can be told to reject some.
#[derive(Default)]
pub struct RecordingQueue {
    registrations: Mutex<Vec<Registration>>,
    failures_left: AtomicUsize,
}

impl RecordingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the next `count` registrations.
    pub fn failing(count: usize) -> Self {
        let queue = Self::default();
        queue.failures_left.store(count, Ordering::SeqCst);
        queue
    }

    pub fn registrations(&self) -> Vec<Registration> {
        self.registrations.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.registrations.lock().len()
    }

    pub fn count_for(&self, name: &str) -> usize {
        self.registrations
            .lock()
            .iter()
            .filter(|r| r.task.name == name)
            .count()
    }
}

impl ExecutionQueue<Task> for RecordingQueue {
    fn register(&self, task: &Task, dependencies: &[Task], dispatch: bool) -> Result<(), BoxError> {
        let rejected = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if rejected {
            return Err(format!("queue refused {}", task.name).into());
        }
        self.registrations.lock().push(Registration {
            task: Arc::clone(task),
            dependencies: dependencies.to_vec(),
            dispatch,
        });
        Ok(())
    }
}
