//! Builder pattern for configuring a task cache

use crate::cache::{SharedFactory, TaskCache};
use crate::config::{CommitPolicy, LockPolicy, TaskCacheConfig};
use crate::factory::TaskFactory;
use crate::queue::ExecutionQueue;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

/// Configuration builder for [`TaskCache`]
pub struct TaskCacheBuilder<K, T, Q> {
    queue: Q,
    config: TaskCacheConfig,
    default_factory: Option<SharedFactory<K, T>>,
}

impl<K, T, Q> TaskCacheBuilder<K, T, Q>
where
    K: Eq + Hash + Clone + Debug,
    T: Clone,
    Q: ExecutionQueue<T>,
{
    /// Creates a builder with default configuration
    #[must_use]
    pub fn new(queue: Q) -> Self {
        Self {
            queue,
            config: TaskCacheConfig::default(),
            default_factory: None,
        }
    }

    /// Set the label used in errors and log events
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set the factory used when a call does not bring its own
    #[must_use]
    pub fn default_factory<F>(mut self, factory: F) -> Self
    where
        F: TaskFactory<K, T> + Send + Sync + 'static,
    {
        self.default_factory = Some(Arc::new(factory));
        self
    }

    /// Share an already boxed default factory, e.g. between sibling caches
    #[must_use]
    pub fn shared_default_factory(mut self, factory: SharedFactory<K, T>) -> Self {
        self.default_factory = Some(factory);
        self
    }

    /// Set the locking strategy
    #[must_use]
    pub fn lock_policy(mut self, policy: LockPolicy) -> Self {
        self.config.lock_policy = policy;
        self
    }

    /// Set the commit point relative to queue registration
    #[must_use]
    pub fn commit_policy(mut self, policy: CommitPolicy) -> Self {
        self.config.commit_policy = policy;
        self
    }

    /// Replace name and policies with a loaded configuration
    #[must_use]
    pub fn config(mut self, config: TaskCacheConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the cache
    #[must_use]
    pub fn build(self) -> TaskCache<K, T, Q> {
        TaskCache::from_parts(self.queue, self.config, self.default_factory)
    }
}
