//! Task factory contract and closure adapters.

use crate::error::BoxError;
use std::marker::PhantomData;

/// Creates a task for a key that the cache has not seen yet.
///
/// A factory runs while the cache holds the lock for its key, so it must not
/// block indefinitely and must not resolve its own key. Resolving *other*
/// keys from inside a factory is fine and is how dependency subgraphs are
/// built on demand.
pub trait TaskFactory<K, T> {
    /// Create the task for `key`.
    ///
    /// # Errors
    ///
    /// Any error is reported to the resolver as [`crate::Error::Factory`] and
    /// nothing is cached for `key`.
    fn create(&self, key: &K) -> Result<T, BoxError>;
}

impl<K, T, F> TaskFactory<K, T> for &F
where
    F: TaskFactory<K, T> + ?Sized,
{
    fn create(&self, key: &K) -> Result<T, BoxError> {
        (**self).create(key)
    }
}

impl<K, T, F> TaskFactory<K, T> for std::sync::Arc<F>
where
    F: TaskFactory<K, T> + ?Sized,
{
    fn create(&self, key: &K) -> Result<T, BoxError> {
        (**self).create(key)
    }
}

impl<K, T, F> TaskFactory<K, T> for Box<F>
where
    F: TaskFactory<K, T> + ?Sized,
{
    fn create(&self, key: &K) -> Result<T, BoxError> {
        (**self).create(key)
    }
}

/// Adapter for closures that always produce a task. See [`factory_fn`].
#[derive(Clone, Copy)]
pub struct FnFactory<F>(F);

impl<K, T, F> TaskFactory<K, T> for FnFactory<F>
where
    F: Fn(&K) -> T,
{
    fn create(&self, key: &K) -> Result<T, BoxError> {
        Ok((self.0)(key))
    }
}

/// Adapter for closures that may fail. See [`try_factory_fn`].
pub struct TryFnFactory<F, E> {
    f: F,
    _error: PhantomData<fn() -> E>,
}

impl<K, T, F, E> TaskFactory<K, T> for TryFnFactory<F, E>
where
    F: Fn(&K) -> Result<T, E>,
    E: Into<BoxError>,
{
    fn create(&self, key: &K) -> Result<T, BoxError> {
        (self.f)(key).map_err(Into::into)
    }
}

/// Wrap an infallible closure as a [`TaskFactory`].
///
/// ```
/// use runq_task_cache::{TaskFactory, factory_fn};
///
/// let factory = factory_fn(|key: &String| format!("task:{key}"));
/// assert_eq!(factory.create(&"compile".to_string()).ok().as_deref(), Some("task:compile"));
/// ```
pub fn factory_fn<F>(f: F) -> FnFactory<F> {
    FnFactory(f)
}

/// Wrap a fallible closure as a [`TaskFactory`].
pub fn try_factory_fn<F, E>(f: F) -> TryFnFactory<F, E> {
    TryFnFactory {
        f,
        _error: PhantomData,
    }
}
