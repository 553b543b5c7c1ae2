//! Configuration types for the task cache

use serde::{Deserialize, Serialize};

/// Name used when a cache is built without one.
pub const DEFAULT_CACHE_NAME: &str = "tasks";

/// How concurrent first resolutions are serialized.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum LockPolicy {
    /// One re-entrant lock held for every `resolve` call, factory and
    /// registration included. First creations never overlap.
    #[default]
    Global,
    /// One re-entrant lock per key. First creations of different keys may
    /// run in parallel; a single key is still created at most once.
    ///
    /// Recursion is only detected on one thread. Factories on two threads
    /// that resolve each other's keys deadlock.
    PerKey,
}

/// When a freshly created task becomes visible to other callers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum CommitPolicy {
    /// Store the task before registering it with the queue. A failed
    /// registration leaves the task cached, and later callers get it back.
    #[default]
    BeforeRegistration,
    /// Store the task only once the queue accepted it. A failed registration
    /// leaves the key unmapped, and the next call runs the factory again.
    AfterRegistration,
}

/// Task cache configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskCacheConfig {
    /// Label used in errors and log events
    pub name: String,

    /// Locking strategy for first resolutions
    pub lock_policy: LockPolicy,

    /// Commit point relative to queue registration
    pub commit_policy: CommitPolicy,
}

impl Default for TaskCacheConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_CACHE_NAME.to_string(),
            lock_policy: LockPolicy::default(),
            commit_policy: CommitPolicy::default(),
        }
    }
}
