//! Deduplicating task cache bound to one execution queue.
//!
//! Every key maps to exactly one task for the lifetime of the cache. The
//! first caller for a key runs the factory and registers the new task with
//! the queue; every other caller, concurrent or later, gets a clone of the
//! same handle. Entries are never replaced or evicted.
//!
//! # Locking
//!
//! Each key owns a slot guarded by a re-entrant lock that is held across the
//! factory call and the queue registration. With [`LockPolicy::Global`] an
//! additional re-entrant lock serializes whole `resolve` calls, so no two
//! first creations overlap. With [`LockPolicy::PerKey`] only callers for the
//! same key wait on each other.
//!
//! Re-entrancy lets a factory resolve other keys on its own thread. A
//! factory that resolves its own key gets [`Error::RecursiveResolve`]
//! instead of a deadlock.

use crate::config::{CommitPolicy, LockPolicy, TaskCacheConfig};
use crate::error::{Error, Result};
use crate::factory::TaskFactory;
use crate::options::ResolveOptions;
use crate::queue::ExecutionQueue;
use crate::stats::{CacheStats, Counters};
use parking_lot::{Mutex, ReentrantMutex, ReentrantMutexGuard};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, trace};

/// Shared default factory stored by a cache.
pub type SharedFactory<K, T> = Arc<dyn TaskFactory<K, T> + Send + Sync>;

enum SlotState<T> {
    Vacant,
    Creating,
    Ready(T),
}

type Slot<T> = ReentrantMutex<RefCell<SlotState<T>>>;

/// Puts a slot back to vacant unless the creation reached its commit point.
///
/// Covers factory errors, rejected registrations under
/// [`CommitPolicy::AfterRegistration`] and panics unwinding out of either.
struct VacateOnDrop<'a, T> {
    state: &'a RefCell<SlotState<T>>,
    armed: bool,
}

impl<T> VacateOnDrop<'_, T> {
    fn commit(&mut self, task: T) {
        *self.state.borrow_mut() = SlotState::Ready(task);
        self.armed = false;
    }
}

impl<T> Drop for VacateOnDrop<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            *self.state.borrow_mut() = SlotState::Vacant;
        }
    }
}

/// Memoizing front door to an [`ExecutionQueue`].
pub struct TaskCache<K, T, Q> {
    name: String,
    queue: Q,
    default_factory: Option<SharedFactory<K, T>>,
    lock_policy: LockPolicy,
    commit_policy: CommitPolicy,
    serial: ReentrantMutex<()>,
    slots: Mutex<HashMap<K, Arc<Slot<T>>>>,
    committed: AtomicUsize,
    counters: Counters,
}

impl<K, T, Q> TaskCache<K, T, Q>
where
    K: Eq + Hash + Clone + Debug,
    T: Clone,
    Q: ExecutionQueue<T>,
{
    /// Create a cache with default configuration and no default factory.
    ///
    /// Every miss must then supply a factory through [`ResolveOptions`].
    #[must_use]
    pub fn new(queue: Q) -> Self {
        Self::from_parts(queue, TaskCacheConfig::default(), None)
    }

    /// Create a cache whose misses fall back to `factory`.
    #[must_use]
    pub fn with_default_factory<F>(queue: Q, factory: F) -> Self
    where
        F: TaskFactory<K, T> + Send + Sync + 'static,
    {
        Self::from_parts(queue, TaskCacheConfig::default(), Some(Arc::new(factory)))
    }

    /// Create a cache from a deserialized configuration.
    #[must_use]
    pub fn from_config(queue: Q, config: TaskCacheConfig) -> Self {
        Self::from_parts(queue, config, None)
    }

    /// Start building a cache bound to `queue`.
    #[must_use]
    pub fn builder(queue: Q) -> crate::TaskCacheBuilder<K, T, Q> {
        crate::TaskCacheBuilder::new(queue)
    }

    pub(crate) fn from_parts(
        queue: Q,
        config: TaskCacheConfig,
        default_factory: Option<SharedFactory<K, T>>,
    ) -> Self {
        Self {
            name: config.name,
            queue,
            default_factory,
            lock_policy: config.lock_policy,
            commit_policy: config.commit_policy,
            serial: ReentrantMutex::new(()),
            slots: Mutex::new(HashMap::new()),
            committed: AtomicUsize::new(0),
            counters: Counters::default(),
        }
    }

    /// Return the task for `key`, creating it with the default factory.
    ///
    /// # Errors
    ///
    /// See [`TaskCache::resolve_with`].
    pub fn resolve(&self, key: K) -> Result<T> {
        self.resolve_with(key, ResolveOptions::new())
    }

    /// Return the task for `key`, creating and registering it on first use.
    ///
    /// On a hit the options are ignored. On a miss the factory from
    /// `options` wins over the default factory, the new task is stored
    /// according to the commit policy and registered with the queue together
    /// with `options`' dependencies and dispatch flag.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingFactory`] if the key is unknown and no factory is available
    /// - [`Error::Factory`] if the factory fails; nothing is cached
    /// - [`Error::Registration`] if the queue rejects the task
    /// - [`Error::RecursiveResolve`] if called for a key this thread is creating
    pub fn resolve_with(&self, key: K, options: ResolveOptions<'_, K, T>) -> Result<T> {
        let _serial = self.serialize();
        let factory: Option<&dyn TaskFactory<K, T>> =
            match (options.factory, self.default_factory.as_deref()) {
                (Some(factory), _) => Some(factory),
                (None, Some(factory)) => Some(factory as &dyn TaskFactory<K, T>),
                (None, None) => None,
            };

        // Without a factory only a hit can succeed, so no slot is created
        let slot = if factory.is_some() {
            self.slot(&key)
        } else {
            let existing = self.slots.lock().get(&key).cloned();
            match existing {
                Some(slot) => slot,
                None => return Err(self.missing_factory(&key)),
            }
        };
        let guard = slot.lock();

        match &*guard.borrow() {
            SlotState::Ready(task) => {
                self.counters.hit();
                trace!(cache = %self.name, key = ?key, "Task cache hit");
                return Ok(task.clone());
            }
            SlotState::Creating => {
                debug!(cache = %self.name, key = ?key, "Recursive resolve of a key under creation");
                return Err(Error::recursive_resolve(&self.name, &key));
            }
            SlotState::Vacant => {}
        }

        let Some(factory) = factory else {
            self.discard_vacant(&key, &slot);
            return Err(self.missing_factory(&key));
        };

        let result = self.create(&key, &guard, factory, &options);
        if result.is_err() && matches!(*guard.borrow(), SlotState::Vacant) {
            self.discard_vacant(&key, &slot);
        }
        result
    }

    fn create(
        &self,
        key: &K,
        state: &RefCell<SlotState<T>>,
        factory: &dyn TaskFactory<K, T>,
        options: &ResolveOptions<'_, K, T>,
    ) -> Result<T> {
        *state.borrow_mut() = SlotState::Creating;
        let mut pending = VacateOnDrop { state, armed: true };

        let task = factory.create(key).map_err(|source| {
            self.counters.factory_failed();
            debug!(cache = %self.name, key = ?key, error = %source, "Task factory failed");
            Error::factory(&self.name, key, source)
        })?;

        match self.commit_policy {
            CommitPolicy::BeforeRegistration => {
                self.commit(&mut pending, key, task.clone());
                self.register(key, &task, options)?;
            }
            CommitPolicy::AfterRegistration => {
                self.register(key, &task, options)?;
                self.commit(&mut pending, key, task.clone());
            }
        }

        Ok(task)
    }

    fn missing_factory(&self, key: &K) -> Error {
        debug!(cache = %self.name, key = ?key, "No factory for unknown key");
        Error::missing_factory(&self.name, key)
    }

    /// Committed task for `key`, without creating anything.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<T> {
        let _serial = self.serialize();
        let slot = self.slots.lock().get(key).cloned()?;
        let guard = slot.lock();
        let state = guard.borrow();
        match &*state {
            SlotState::Ready(task) => Some(task.clone()),
            SlotState::Vacant | SlotState::Creating => None,
        }
    }

    /// Whether `key` has a committed task.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    fn commit(&self, pending: &mut VacateOnDrop<'_, T>, key: &K, task: T) {
        pending.commit(task);
        self.committed.fetch_add(1, Ordering::Relaxed);
        self.counters.created();
        debug!(cache = %self.name, key = ?key, "Committed new task");
    }

    fn register(&self, key: &K, task: &T, options: &ResolveOptions<'_, K, T>) -> Result<()> {
        let dependencies = options.dependency_list();
        let dispatch = options.is_dispatch();

        self.queue
            .register(task, dependencies, dispatch)
            .map_err(|source| {
                self.counters.registration_failed();
                debug!(
                    cache = %self.name,
                    key = ?key,
                    error = %source,
                    "Execution queue rejected task"
                );
                Error::registration(&self.name, key, source)
            })?;

        debug!(
            cache = %self.name,
            key = ?key,
            dependencies = dependencies.len(),
            dispatch,
            "Registered task with execution queue"
        );
        Ok(())
    }
}

impl<K, T, Q> TaskCache<K, T, Q>
where
    K: Eq + Hash + Clone,
{
    fn serialize(&self) -> Option<ReentrantMutexGuard<'_, ()>> {
        match self.lock_policy {
            LockPolicy::Global => Some(self.serial.lock()),
            LockPolicy::PerKey => None,
        }
    }

    // A slot someone else still holds must stay in the table: a second slot
    // for the same key would allow a second creation.
    fn slot(&self, key: &K) -> Arc<Slot<T>> {
        let mut slots = self.slots.lock();
        if let Some(slot) = slots.get(key) {
            return Arc::clone(slot);
        }
        let slot = Arc::new(ReentrantMutex::new(RefCell::new(SlotState::Vacant)));
        slots.insert(key.clone(), Arc::clone(&slot));
        slot
    }

    /// Drop a vacant slot from the table when only the table and the caller hold it.
    fn discard_vacant(&self, key: &K, slot: &Arc<Slot<T>>) {
        let mut slots = self.slots.lock();
        let unshared = Arc::strong_count(slot) == 2
            && slots.get(key).is_some_and(|held| Arc::ptr_eq(held, slot));
        if unshared {
            slots.remove(key);
        }
    }
}

impl<K, T, Q> TaskCache<K, T, Q> {
    /// Label used in errors and log events.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The queue new tasks are registered with.
    #[must_use]
    pub fn queue(&self) -> &Q {
        &self.queue
    }

    /// Number of committed entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.committed.load(Ordering::Relaxed)
    }

    /// Whether no task has been committed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a default factory is configured.
    #[must_use]
    pub fn has_default_factory(&self) -> bool {
        self.default_factory.is_some()
    }

    /// Locking strategy for first resolutions.
    #[must_use]
    pub fn lock_policy(&self) -> LockPolicy {
        self.lock_policy
    }

    /// Commit point relative to queue registration.
    #[must_use]
    pub fn commit_policy(&self) -> CommitPolicy {
        self.commit_policy
    }

    /// Snapshot of the resolution counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }
}

impl<K, T, Q> Debug for TaskCache<K, T, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskCache")
            .field("name", &self.name)
            .field("len", &self.len())
            .field("lock_policy", &self.lock_policy)
            .field("commit_policy", &self.commit_policy)
            .field("has_default_factory", &self.default_factory.is_some())
            .finish_non_exhaustive()
    }
}
