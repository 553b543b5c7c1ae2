//! Errors raised while growing or ordering a task graph.

use thiserror::Error;

/// Result type for task graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by [`TaskGraph`](crate::TaskGraph) and [`GraphQueue`](crate::GraphQueue).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The graph has a dependency cycle.
    #[error("Cycle detected in task graph: {message}")]
    CycleDetected {
        /// Which tasks form the cycle.
        message: String,
    },

    /// An edge names a dependency that is not in the graph.
    #[error("Task '{task}' depends on unregistered task '{dependency}'")]
    MissingDependency {
        /// Task the edge leads to.
        task: String,
        /// Name that could not be found.
        dependency: String,
    },

    /// A registration named one or more unregistered dependencies.
    #[error("Unregistered dependencies: {}", format_missing(.missing))]
    MissingDependencies {
        /// `(task, dependency)` for every unknown dependency name.
        missing: Vec<(String, String)>,
    },

    /// The name is already taken by a registered task.
    #[error("Task '{task}' is already registered")]
    DuplicateTask {
        /// Name of the task.
        task: String,
    },

    /// The named task was never registered.
    #[error("Task '{task}' is not registered")]
    UnknownTask {
        /// Name of the task.
        task: String,
    },

    /// petgraph could not order the graph.
    #[error("Failed to sort tasks topologically: {reason}")]
    TopologicalSortFailed {
        /// Reason for the failure.
        reason: String,
    },
}

fn format_missing(missing: &[(String, String)]) -> String {
    missing
        .iter()
        .map(|(task, dependency)| format!("'{task}' needs '{dependency}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
