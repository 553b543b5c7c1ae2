//! Error types for task cache operations

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::fmt::Debug;
use thiserror::Error;

/// Boxed error returned by task factories and execution queues.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for task cache operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// No factory was supplied for a key that has no task yet
    #[error("No task factory available for key {key} in cache '{cache}'")]
    #[diagnostic(
        code(runq::task_cache::missing_factory),
        help("Pass a factory through ResolveOptions or build the cache with a default factory")
    )]
    MissingFactory {
        /// Name of the cache that was queried
        cache: String,
        /// Debug rendering of the key
        key: String,
    },

    /// The task factory failed to create a task
    #[error("Task factory failed for key {key} in cache '{cache}'")]
    #[diagnostic(
        code(runq::task_cache::factory),
        help("Nothing was cached for this key; resolving it again retries creation")
    )]
    Factory {
        /// Name of the cache that was queried
        cache: String,
        /// Debug rendering of the key
        key: String,
        /// Error reported by the factory
        #[source]
        source: BoxError,
    },

    /// The execution queue rejected the new task
    #[error("Execution queue rejected task for key {key} in cache '{cache}'")]
    #[diagnostic(code(runq::task_cache::registration))]
    Registration {
        /// Name of the cache that was queried
        cache: String,
        /// Debug rendering of the key
        key: String,
        /// Error reported by the execution queue
        #[source]
        source: BoxError,
    },

    /// A factory resolved the key it is currently creating
    #[error("Recursive resolution of key {key} in cache '{cache}'")]
    #[diagnostic(
        code(runq::task_cache::recursive_resolve),
        help("A task factory must not resolve its own key on the same thread, directly or through other factories")
    )]
    RecursiveResolve {
        /// Name of the cache that was queried
        cache: String,
        /// Debug rendering of the key
        key: String,
    },
}

impl Error {
    /// Create a missing factory error
    #[must_use]
    pub fn missing_factory(cache: &str, key: &impl Debug) -> Self {
        Self::MissingFactory {
            cache: cache.to_string(),
            key: format!("{key:?}"),
        }
    }

    /// Create a factory error
    #[must_use]
    pub fn factory(cache: &str, key: &impl Debug, source: BoxError) -> Self {
        Self::Factory {
            cache: cache.to_string(),
            key: format!("{key:?}"),
            source,
        }
    }

    /// Create a registration error
    #[must_use]
    pub fn registration(cache: &str, key: &impl Debug, source: BoxError) -> Self {
        Self::Registration {
            cache: cache.to_string(),
            key: format!("{key:?}"),
            source,
        }
    }

    /// Create a recursive resolve error
    #[must_use]
    pub fn recursive_resolve(cache: &str, key: &impl Debug) -> Self {
        Self::RecursiveResolve {
            cache: cache.to_string(),
            key: format!("{key:?}"),
        }
    }

    /// Debug rendering of the key the failed call was resolving
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::MissingFactory { key, .. }
            | Self::Factory { key, .. }
            | Self::Registration { key, .. }
            | Self::RecursiveResolve { key, .. } => key,
        }
    }
}

/// Result type for task cache operations
pub type Result<T> = std::result::Result<T, Error>;
