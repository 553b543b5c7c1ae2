//! Execution queue contract consumed by the task cache.

use crate::error::BoxError;
use std::sync::Arc;

/// Scheduler that owns registered tasks and runs them in dependency order.
///
/// The task cache calls [`ExecutionQueue::register`] exactly once per
/// distinct key, right after the task was created. Everything else
/// (ordering, parallelism, execution) belongs to the implementor.
pub trait ExecutionQueue<T> {
    /// Register `task`, which must not run before `dependencies`.
    ///
    /// When `dispatch` is `false` the task is held until the queue is told
    /// to release it.
    ///
    /// # Errors
    ///
    /// Any error is reported to the resolver as [`crate::Error::Registration`].
    fn register(&self, task: &T, dependencies: &[T], dispatch: bool) -> Result<(), BoxError>;
}

impl<T, Q> ExecutionQueue<T> for &Q
where
    Q: ExecutionQueue<T> + ?Sized,
{
    fn register(&self, task: &T, dependencies: &[T], dispatch: bool) -> Result<(), BoxError> {
        (**self).register(task, dependencies, dispatch)
    }
}

impl<T, Q> ExecutionQueue<T> for Arc<Q>
where
    Q: ExecutionQueue<T> + ?Sized,
{
    fn register(&self, task: &T, dependencies: &[T], dispatch: bool) -> Result<(), BoxError> {
        (**self).register(task, dependencies, dispatch)
    }
}

impl<T, Q> ExecutionQueue<T> for Box<Q>
where
    Q: ExecutionQueue<T> + ?Sized,
{
    fn register(&self, task: &T, dependencies: &[T], dispatch: bool) -> Result<(), BoxError> {
        (**self).register(task, dependencies, dispatch)
    }
}
