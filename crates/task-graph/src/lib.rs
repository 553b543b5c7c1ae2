//! Task DAG and in-process execution queue for runq.
//!
//! This crate provides a directed acyclic graph (DAG) implementation for
//! task dependency tracking and execution ordering using petgraph, plus
//! [`GraphQueue`], an [`ExecutionQueue`](runq_task_cache::ExecutionQueue)
//! that records every registration a task cache makes.
//!
//! # Key Types
//!
//! - [`TaskGraph`]: The main graph structure for building and querying task dependencies
//! - [`GraphQueue`]: Thread-safe queue that grows a [`TaskGraph`] one registration at a time
//! - [`TaskNodeData`]: Trait that task types must implement to be stored in the queue
//! - [`GraphNode`]: A node in the graph containing the task name and data
//!
//! # Example
//!
//! ```
//! use runq_task_cache::{ResolveOptions, TaskCache, factory_fn};
//! use runq_task_graph::GraphQueue;
//! use std::sync::Arc;
//!
//! let queue = Arc::new(GraphQueue::new());
//! let objects = TaskCache::builder(Arc::clone(&queue))
//!     .name("objects")
//!     .default_factory(factory_fn(|path: &&str| Arc::new(format!("{path}.o"))))
//!     .build();
//! let binaries = TaskCache::builder(Arc::clone(&queue))
//!     .name("binaries")
//!     .default_factory(factory_fn(|name: &&str| Arc::new((*name).to_string())))
//!     .build();
//!
//! let main_o = objects.resolve("main.c").unwrap();
//! let app = binaries
//!     .resolve_with("app", ResolveOptions::new().dependency(main_o))
//!     .unwrap();
//!
//! let order: Vec<String> = queue
//!     .execution_order()
//!     .unwrap()
//!     .into_iter()
//!     .map(|node| node.name)
//!     .collect();
//! assert_eq!(order, ["main.c.o", app.as_str()]);
//! ```

mod error;
mod graph;
mod queue;
mod traversal;
mod validation;

pub use error::{Error, Result};
pub use graph::{GraphNode, TaskGraph};
pub use queue::{GraphQueue, Registration};
pub use traversal::{ParallelGroups, TopologicalOrder};
pub use validation::ValidationResult;

use std::sync::Arc;

/// Trait for task data that can be stored in a [`GraphQueue`].
///
/// The node name identifies the task inside the queue, so two tasks that
/// should be scheduled separately must report different names.
pub trait TaskNodeData {
    /// Returns the unique name of this task.
    fn node_name(&self) -> &str;
}

impl TaskNodeData for String {
    fn node_name(&self) -> &str {
        self
    }
}

impl<T: TaskNodeData + ?Sized> TaskNodeData for Arc<T> {
    fn node_name(&self) -> &str {
        (**self).node_name()
    }
}
