//! Deduplicating task cache for the runq execution engine.
//!
//! This crate turns a stream of requests for work items, each identified by
//! a stable key, into tasks registered with an execution queue:
//! - Each distinct key is materialized into exactly one task, even when many
//!   threads ask for it at once
//! - The new task is registered with the queue together with its
//!   dependencies, exactly once per key
//! - Failed factories are never cached, so a later request retries
//!
//! # Key Types
//!
//! - [`TaskCache`]: the memoization table bound to one queue
//! - [`TaskFactory`]: creates a task for an unseen key
//! - [`ExecutionQueue`]: receives each new task with its dependencies
//! - [`ResolveOptions`]: per-call factory override, dependencies and dispatch flag
//! - [`TaskCacheConfig`]: serde-loadable name, [`LockPolicy`] and [`CommitPolicy`]
//!
//! # Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use runq_task_cache::{BoxError, ExecutionQueue, ResolveOptions, TaskCache, factory_fn};
//!
//! #[derive(Default)]
//! struct Recorder(Mutex<Vec<(String, usize)>>);
//!
//! impl ExecutionQueue<Arc<String>> for Recorder {
//!     fn register(
//!         &self,
//!         task: &Arc<String>,
//!         dependencies: &[Arc<String>],
//!         _dispatch: bool,
//!     ) -> Result<(), BoxError> {
//!         let mut calls = self.0.lock().map_err(|e| e.to_string())?;
//!         calls.push((task.to_string(), dependencies.len()));
//!         Ok(())
//!     }
//! }
//!
//! let queue = Recorder::default();
//! let cache = TaskCache::with_default_factory(
//!     &queue,
//!     factory_fn(|key: &&str| Arc::new(key.to_string())),
//! );
//!
//! let compile = cache.resolve("compile")?;
//! let link = cache.resolve_with("link", ResolveOptions::new().dependency(Arc::clone(&compile)))?;
//! assert_eq!(link.as_str(), "link");
//! assert!(Arc::ptr_eq(&compile, &cache.resolve("compile")?));
//! assert_eq!(cache.len(), 2);
//! # Ok::<(), runq_task_cache::Error>(())
//! ```

mod builder;
mod cache;
mod config;
mod error;
mod factory;
mod options;
mod queue;
mod stats;

pub use builder::TaskCacheBuilder;
pub use cache::{SharedFactory, TaskCache};
pub use config::{CommitPolicy, DEFAULT_CACHE_NAME, LockPolicy, TaskCacheConfig};
pub use error::{BoxError, Error, Result};
pub use factory::{FnFactory, TaskFactory, TryFnFactory, factory_fn, try_factory_fn};
pub use options::ResolveOptions;
pub use queue::ExecutionQueue;
pub use stats::CacheStats;
