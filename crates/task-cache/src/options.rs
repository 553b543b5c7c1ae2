//! Per-call arguments for [`crate::TaskCache::resolve_with`].

use crate::factory::TaskFactory;

/// Arguments that only matter to the call that ends up creating the task.
///
/// On a cache hit all of them are ignored.
pub struct ResolveOptions<'a, K, T> {
    pub(crate) factory: Option<&'a dyn TaskFactory<K, T>>,
    pub(crate) dependencies: Vec<T>,
    pub(crate) dispatch: bool,
}

impl<K, T> Default for ResolveOptions<'_, K, T> {
    fn default() -> Self {
        Self {
            factory: None,
            dependencies: Vec::new(),
            dispatch: true,
        }
    }
}

impl<'a, K, T> ResolveOptions<'a, K, T> {
    /// Options with no factory override, no dependencies and `dispatch = true`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `factory` instead of the cache's default factory.
    #[must_use]
    pub fn factory(mut self, factory: &'a dyn TaskFactory<K, T>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Replace the dependency set.
    #[must_use]
    pub fn dependencies(mut self, dependencies: impl IntoIterator<Item = T>) -> Self {
        self.dependencies = dependencies.into_iter().collect();
        self
    }

    /// Add one dependency.
    #[must_use]
    pub fn dependency(mut self, dependency: T) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Whether the queue may schedule the task right away.
    #[must_use]
    pub fn dispatch(mut self, dispatch: bool) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Shorthand for `dispatch(false)`.
    #[must_use]
    pub fn held(self) -> Self {
        self.dispatch(false)
    }

    /// Dependencies collected so far.
    #[must_use]
    pub fn dependency_list(&self) -> &[T] {
        &self.dependencies
    }

    /// Current dispatch flag.
    #[must_use]
    pub fn is_dispatch(&self) -> bool {
        self.dispatch
    }
}
